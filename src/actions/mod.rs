//! Player field actions: planting, bulk care, harvesting, clearing dead
//! plants. Each handler is a thin system over a value-level helper so the
//! rules are testable without an App.

use bevy::prelude::*;
use crate::shared::*;

pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_plant_seed, handle_bulk_care, handle_harvest, handle_clear_dead),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantError {
    Occupied,
    UnknownSpecies,
    InsufficientCoins,
    BadCell,
}

/// Plant one seed. The debit happens before placement and only if every
/// check passes, so a rejection leaves both wallet and grid untouched.
pub fn plant_seed(
    grid: &mut FieldGrid,
    registry: &CropRegistry,
    wallet: &mut Wallet,
    cell: usize,
    species: &str,
    field_biome: Biome,
    tick: u64,
) -> Result<(), PlantError> {
    if cell >= GRID_CELLS {
        return Err(PlantError::BadCell);
    }
    if grid.cells[cell].is_some() {
        return Err(PlantError::Occupied);
    }
    let def = registry.get(species).ok_or(PlantError::UnknownSpecies)?;
    if !wallet.try_spend(SEED_COST) {
        return Err(PlantError::InsufficientCoins);
    }
    grid.cells[cell] = Some(Plant::new(def, field_biome, tick));
    Ok(())
}

fn handle_plant_seed(
    mut events: EventReader<PlantSeedEvent>,
    mut grid: ResMut<FieldGrid>,
    registry: Res<CropRegistry>,
    mut wallet: ResMut<Wallet>,
    mut totals: ResMut<EconomyTotals>,
    env: Res<Environment>,
    mut clock: ResMut<SimClock>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        let tick = clock.global_tick();
        match plant_seed(
            &mut grid,
            &registry,
            &mut wallet,
            event.cell,
            &event.species,
            env.biome,
            tick,
        ) {
            Ok(()) => {
                totals.spent += SEED_COST as u64;
                // A fresh seed means the field is no longer all-mature.
                clock.mature_notified = false;
                let emoji = registry
                    .get(&event.species)
                    .map(|d| d.emoji.clone())
                    .unwrap_or_default();
                toasts.send(ToastEvent::new(format!(
                    "Planted {} {} (-{} coins)",
                    event.species, emoji, SEED_COST
                )));
                info!("[Actions] Planted {} in cell {}", event.species, event.cell);
            }
            Err(PlantError::Occupied) => {
                toasts.send(ToastEvent::new("That cell is already planted."));
            }
            Err(PlantError::UnknownSpecies) => {
                warn!("[Actions] Unknown species {:?}", event.species);
            }
            Err(PlantError::InsufficientCoins) => {
                toasts.send(ToastEvent::new(format!(
                    "Not enough coins - seeds cost {}.",
                    SEED_COST
                )));
            }
            Err(PlantError::BadCell) => {
                warn!("[Actions] Plant request for out-of-range cell {}", event.cell);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bulk care
// ─────────────────────────────────────────────────────────────────────────────

/// What a bulk care pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkCareReport {
    /// Live plants treated.
    pub treated: usize,
    /// Total coins charged (0 when the action is free).
    pub charged: u32,
    /// The active ticket asked for this action on a treated cell and was
    /// satisfied by the sweep.
    pub resolved_ticket: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCareError {
    /// Non-zero per-cell cost and the total exceeds the balance; nothing
    /// was applied.
    InsufficientCoins { needed: u32 },
}

/// Apply one care action to every live plant in scope.
///
/// Stamps the care log at the current tick, clears a matching
/// `required_action`, and gives watered plants a small health bump. Cost,
/// when configured, is charged for the whole sweep up front; a short
/// balance rejects the entire operation.
pub fn apply_bulk_care(
    grid: &mut FieldGrid,
    active: &mut ActiveCare,
    wallet: &mut Wallet,
    action: CareAction,
    scope: &ActionScope,
    tick: u64,
    cost_per_cell: u32,
) -> Result<BulkCareReport, BulkCareError> {
    let targets: Vec<usize> = grid
        .cells
        .iter()
        .enumerate()
        .filter(|(i, cell)| {
            scope.contains(*i) && cell.as_ref().map(|p| !p.is_dead).unwrap_or(false)
        })
        .map(|(i, _)| i)
        .collect();

    let charged = cost_per_cell * targets.len() as u32;
    if charged > 0 && !wallet.try_spend(charged) {
        return Err(BulkCareError::InsufficientCoins { needed: charged });
    }

    let mut report = BulkCareReport { treated: targets.len(), charged, ..Default::default() };

    for index in &targets {
        if let Some(plant) = grid.cells[*index].as_mut() {
            plant.last_care.stamp(action, tick);
            if plant.required_action == Some(action) {
                plant.required_action = None;
            }
            if action == CareAction::Water {
                plant.health = (plant.health + 10.0).clamp(0.0, 100.0);
            }
        }
    }

    if let Some(ticket) = active.0.as_ref() {
        if ticket.action == action && scope.contains(ticket.plant_index) {
            active.0 = None;
            report.resolved_ticket = true;
        }
    }

    Ok(report)
}

fn handle_bulk_care(
    mut events: EventReader<BulkCareEvent>,
    mut grid: ResMut<FieldGrid>,
    mut active: ResMut<ActiveCare>,
    mut wallet: ResMut<Wallet>,
    mut totals: ResMut<EconomyTotals>,
    mut env: ResMut<Environment>,
    mut slider: ResMut<CareSlider>,
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut next_state: ResMut<NextState<SimState>>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        let resume = active
            .0
            .as_ref()
            .map(|t| config.pause_during_care && t.resume_running)
            .unwrap_or(false);

        match apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            event.action,
            &event.scope,
            clock.global_tick(),
            config.care_cost_per_cell,
        ) {
            Ok(report) => {
                if report.treated == 0 {
                    toasts.send(ToastEvent::new("No live plants to treat."));
                    continue;
                }
                totals.spent += report.charged as u64;

                // A field-wide watering also damps the ground: rain rises
                // and stays player-pinned until the next location change.
                if event.action == CareAction::Water && event.scope == ActionScope::All {
                    env.rain = (env.rain + 20.0).min(100.0);
                    env.manual.rain = true;
                }

                let verb = match event.action {
                    CareAction::Water => "💧 Watered",
                    CareAction::Insecticide => "🧴 Treated",
                    CareAction::Pesticide => "🛡️ Sprayed",
                };
                let cost_note = if report.charged > 0 {
                    format!(" (-{} coins)", report.charged)
                } else {
                    String::new()
                };
                toasts.send(ToastEvent::new(format!(
                    "{} {} plants{}.",
                    verb, report.treated, cost_note
                )));

                if report.resolved_ticket {
                    slider.0 = None;
                    if resume {
                        next_state.set(SimState::Running);
                    }
                }
            }
            Err(BulkCareError::InsufficientCoins { needed }) => {
                toasts.send(ToastEvent::new(format!(
                    "Not enough coins - that care sweep costs {}.",
                    needed
                )));
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvest & clearing
// ─────────────────────────────────────────────────────────────────────────────

/// Remove and return every mature, living plant in scope.
pub fn harvest_mature(grid: &mut FieldGrid, scope: &ActionScope) -> Vec<Plant> {
    let mut reaped = Vec::new();
    for (index, cell) in grid.cells.iter_mut().enumerate() {
        if !scope.contains(index) {
            continue;
        }
        let ready = cell
            .as_ref()
            .map(|p| p.is_mature() && !p.is_dead)
            .unwrap_or(false);
        if ready {
            if let Some(plant) = cell.take() {
                reaped.push(plant);
            }
        }
    }
    reaped
}

/// Remove and return every dead plant. No refund, no penalty.
pub fn clear_dead(grid: &mut FieldGrid) -> Vec<Plant> {
    let mut removed = Vec::new();
    for cell in grid.cells.iter_mut() {
        if cell.as_ref().map(|p| p.is_dead).unwrap_or(false) {
            if let Some(plant) = cell.take() {
                removed.push(plant);
            }
        }
    }
    removed
}

fn handle_harvest(
    mut events: EventReader<HarvestEvent>,
    mut grid: ResMut<FieldGrid>,
    mut wallet: ResMut<Wallet>,
    mut totals: ResMut<EconomyTotals>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        let reaped = harvest_mature(&mut grid, &event.scope);
        if reaped.is_empty() {
            toasts.send(ToastEvent::new("Nothing ready to harvest."));
            continue;
        }

        let reward = HARVEST_REWARD * reaped.len() as u32;
        wallet.credit(reward);
        totals.earned += reward as u64;
        totals.harvested += reaped.len() as u32;

        // Per-species tally, in first-seen order.
        let mut summary: Vec<(String, String, usize)> = Vec::new();
        for plant in &reaped {
            match summary.iter_mut().find(|(s, _, _)| *s == plant.species) {
                Some((_, _, n)) => *n += 1,
                None => summary.push((plant.species.clone(), plant.emoji.clone(), 1)),
            }
        }
        let listing = summary
            .iter()
            .map(|(species, emoji, n)| format!("{n}x {species} {emoji}"))
            .collect::<Vec<_>>()
            .join(", ");
        toasts.send(ToastEvent::new(format!(
            "🧺 Harvested {} (+{} coins)",
            listing, reward
        )));
        info!("[Actions] Harvested {} crops for {} coins", reaped.len(), reward);
    }
}

fn handle_clear_dead(
    mut events: EventReader<ClearDeadEvent>,
    mut grid: ResMut<FieldGrid>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        let removed = clear_dead(&mut grid);
        if removed.is_empty() {
            toasts.send(ToastEvent::new("No dead plants to clear."));
        } else {
            toasts.send(ToastEvent::new(format!(
                "🧹 Cleared {} dead plant(s).",
                removed.len()
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (FieldGrid, CropRegistry, Wallet) {
        (FieldGrid::default(), CropRegistry::default(), Wallet::default())
    }

    #[test]
    fn planting_debits_then_places() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 0, "Rice", Biome::Terai, 0).unwrap();
        assert_eq!(wallet.coins, 998);
        let p = grid.cells[0].as_ref().unwrap();
        assert_eq!(p.species, "Rice");
        assert_eq!(p.health, 82.0, "biome match starts healthier");
        assert_eq!(p.growth_stage, GrowthStage::Seed);
    }

    #[test]
    fn planting_rejections_leave_state_untouched() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 0, "Rice", Biome::Hilly, 0).unwrap();

        let err = plant_seed(&mut grid, &registry, &mut wallet, 0, "Maize", Biome::Hilly, 0);
        assert_eq!(err, Err(PlantError::Occupied));
        assert_eq!(wallet.coins, 998);
        assert_eq!(grid.cells[0].as_ref().unwrap().species, "Rice");

        let err = plant_seed(&mut grid, &registry, &mut wallet, 1, "Kudzu", Biome::Hilly, 0);
        assert_eq!(err, Err(PlantError::UnknownSpecies));
        assert_eq!(wallet.coins, 998);

        wallet.coins = 1;
        let err = plant_seed(&mut grid, &registry, &mut wallet, 1, "Maize", Biome::Hilly, 0);
        assert_eq!(err, Err(PlantError::InsufficientCoins));
        assert_eq!(wallet.coins, 1);
        assert!(grid.cells[1].is_none());

        let err = plant_seed(&mut grid, &registry, &mut wallet, 99, "Maize", Biome::Hilly, 0);
        assert_eq!(err, Err(PlantError::BadCell));
    }

    #[test]
    fn bulk_water_heals_stamps_and_clears_matching_demand() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 0, "Rice", Biome::Terai, 0).unwrap();
        plant_seed(&mut grid, &registry, &mut wallet, 5, "Maize", Biome::Terai, 0).unwrap();
        if let Some(p) = grid.cells[0].as_mut() {
            p.required_action = Some(CareAction::Water);
            p.health = 50.0;
        }
        if let Some(p) = grid.cells[5].as_mut() {
            p.required_action = Some(CareAction::Pesticide);
        }

        let mut active = ActiveCare::default();
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::All,
            300,
            0,
        )
        .unwrap();
        assert_eq!(report.treated, 2);
        assert_eq!(report.charged, 0);

        let p0 = grid.cells[0].as_ref().unwrap();
        assert_eq!(p0.required_action, None, "matching demand cleared");
        assert_eq!(p0.health, 60.0);
        assert_eq!(p0.last_care.water, 300);

        let p5 = grid.cells[5].as_ref().unwrap();
        assert_eq!(
            p5.required_action,
            Some(CareAction::Pesticide),
            "watering must not clear a pesticide demand"
        );
        assert_eq!(p5.last_care.water, 300);
    }

    #[test]
    fn bulk_care_resolves_a_matching_ticket_only() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 3, "Rice", Biome::Terai, 0).unwrap();
        let ticket = CareTicket {
            plant_index: 3,
            action: CareAction::Water,
            remaining_secs: 10.0,
            resume_running: false,
        };

        // Wrong action leaves the ticket alone.
        let mut active = ActiveCare(Some(ticket.clone()));
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Pesticide,
            &ActionScope::All,
            1,
            0,
        )
        .unwrap();
        assert!(!report.resolved_ticket);
        assert!(active.0.is_some());

        // Out-of-scope cell leaves the ticket alone.
        let mut active = ActiveCare(Some(ticket.clone()));
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::Cells(vec![1, 2]),
            1,
            0,
        )
        .unwrap();
        assert!(!report.resolved_ticket);
        assert!(active.0.is_some());

        let mut active = ActiveCare(Some(ticket));
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::All,
            1,
            0,
        )
        .unwrap();
        assert!(report.resolved_ticket);
        assert!(active.0.is_none());
    }

    #[test]
    fn priced_sweep_is_all_or_nothing() {
        let (mut grid, registry, mut wallet) = fixture();
        for cell in 0..4 {
            plant_seed(&mut grid, &registry, &mut wallet, cell, "Maize", Biome::Hilly, 0).unwrap();
        }
        wallet.coins = 7; // 4 cells at 2 coins each needs 8
        let mut active = ActiveCare::default();
        let err = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::All,
            50,
            2,
        );
        assert_eq!(err, Err(BulkCareError::InsufficientCoins { needed: 8 }));
        assert_eq!(wallet.coins, 7);
        assert_eq!(grid.cells[0].as_ref().unwrap().last_care.water, 0, "nothing applied");

        wallet.coins = 8;
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::All,
            50,
            2,
        )
        .unwrap();
        assert_eq!(report.charged, 8);
        assert_eq!(wallet.coins, 0);
    }

    #[test]
    fn dead_plants_are_never_treated() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 0, "Rice", Biome::Terai, 0).unwrap();
        if let Some(p) = grid.cells[0].as_mut() {
            p.is_dead = true;
            p.health = 0.0;
        }
        let mut active = ActiveCare::default();
        let report = apply_bulk_care(
            &mut grid,
            &mut active,
            &mut wallet,
            CareAction::Water,
            &ActionScope::All,
            10,
            0,
        )
        .unwrap();
        assert_eq!(report.treated, 0);
        assert_eq!(grid.cells[0].as_ref().unwrap().health, 0.0);
    }

    #[test]
    fn harvest_takes_only_mature_living_plants_in_scope() {
        let (mut grid, registry, mut wallet) = fixture();
        for cell in 0..3 {
            plant_seed(&mut grid, &registry, &mut wallet, cell, "Rice", Biome::Terai, 0).unwrap();
        }
        for cell in [0, 1] {
            if let Some(p) = grid.cells[cell].as_mut() {
                p.growth_progress = 90.0;
                p.growth_stage = GrowthStage::Mature;
            }
        }
        if let Some(p) = grid.cells[1].as_mut() {
            p.is_dead = true;
        }

        let reaped = harvest_mature(&mut grid, &ActionScope::All);
        assert_eq!(reaped.len(), 1);
        assert!(grid.cells[0].is_none());
        assert!(grid.cells[1].is_some(), "dead mature plant stays");
        assert!(grid.cells[2].is_some(), "immature plant stays");

        // Scoped harvest skips out-of-scope mature cells.
        if let Some(p) = grid.cells[2].as_mut() {
            p.growth_stage = GrowthStage::Mature;
        }
        let reaped = harvest_mature(&mut grid, &ActionScope::Cells(vec![0, 1]));
        assert!(reaped.is_empty());
        assert!(grid.cells[2].is_some());
    }

    #[test]
    fn clear_dead_removes_only_corpses() {
        let (mut grid, registry, mut wallet) = fixture();
        plant_seed(&mut grid, &registry, &mut wallet, 0, "Rice", Biome::Terai, 0).unwrap();
        plant_seed(&mut grid, &registry, &mut wallet, 1, "Maize", Biome::Terai, 0).unwrap();
        if let Some(p) = grid.cells[0].as_mut() {
            p.is_dead = true;
        }
        let removed = clear_dead(&mut grid);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].species, "Rice");
        assert!(grid.cells[0].is_none());
        assert!(grid.cells[1].is_some());
    }
}
