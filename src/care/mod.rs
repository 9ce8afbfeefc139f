//! Care domain — overdue-care detection, the single global care request,
//! its wall-clock countdown, and the intensity-slider response.
//!
//! The scheduler scan is a pure function; the tick driver in `sim` calls it
//! at the top of every tick. Everything else here reacts to events or to
//! real time and communicates with other domains through crate::shared.

use bevy::prelude::*;
use crate::shared::*;

pub struct CarePlugin;

impl Plugin for CarePlugin {
    fn build(&self, app: &mut App) {
        app
            // The countdown is wall-clock based: it keeps running while the
            // simulation clock is Stopped, so no state gate here.
            .add_systems(Update, tick_care_countdown)
            .add_systems(Update, handle_care_response.after(tick_care_countdown));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler scan
// ─────────────────────────────────────────────────────────────────────────────

/// Find the first plant (lowest cell index) whose care cadence has lapsed.
///
/// Priority per plant is fixed: Water, then Insecticide (growth ≥ 35), then
/// Pesticide (growth ≥ 65). Watering is skipped entirely while rain ≥ 70;
/// its interval switches to the drought variant under drought. Humid air
/// (≥ 70%) shortens the insecticide/pesticide cadences to 0.85×.
///
/// First match wins — FIFO by cell index, not severity.
pub fn scan_care_needs(
    grid: &FieldGrid,
    registry: &CropRegistry,
    global_tick: u64,
    drought: bool,
    rain: f32,
    humid: bool,
) -> Option<(usize, CareAction)> {
    let humidity_factor = if humid { 0.85 } else { 1.0 };

    for (index, cell) in grid.cells.iter().enumerate() {
        let Some(plant) = cell else { continue };
        if plant.is_dead || plant.required_action.is_some() {
            continue;
        }

        let profile = registry.profile_for(&plant.species);

        let water_every = if drought {
            profile.water_every_drought_ticks
        } else {
            profile.water_every_ticks
        };
        let last_water = plant.last_care.get(CareAction::Water);
        if rain < 70.0 && global_tick.saturating_sub(last_water) >= water_every {
            return Some((index, CareAction::Water));
        }

        let insect_every =
            (profile.insecticide_every_days as f64 * DAY_TICKS as f64 * humidity_factor).round()
                as u64;
        if plant.growth_progress >= INSECTICIDE_GATE
            && global_tick.saturating_sub(plant.last_care.get(CareAction::Insecticide))
                >= insect_every
        {
            return Some((index, CareAction::Insecticide));
        }

        let pest_every =
            (profile.pesticide_every_days as f64 * DAY_TICKS as f64 * humidity_factor).round()
                as u64;
        if plant.growth_progress >= PESTICIDE_GATE
            && global_tick.saturating_sub(plant.last_care.get(CareAction::Pesticide)) >= pest_every
        {
            return Some((index, CareAction::Pesticide));
        }
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Countdown
// ─────────────────────────────────────────────────────────────────────────────

/// What happened when the countdown ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareExpiry {
    /// Restart the clock (pausing policy, and only if it was running when
    /// the request was raised).
    pub resume: bool,
}

/// Expire the active ticket if its time is up. The plant is left untouched:
/// `required_action` persists so neglect keeps accruing, and
/// `stress_strikes` is NOT incremented — strikes only come from the slider
/// response path.
pub fn expire_active(active: &mut ActiveCare, config: &SimConfig) -> Option<CareExpiry> {
    let ticket = active.0.as_ref()?;
    if ticket.remaining_secs > 0.0 {
        return None;
    }
    let resume = config.pause_during_care && ticket.resume_running;
    active.0 = None;
    Some(CareExpiry { resume })
}

/// Wall-clock countdown driver. Runs every frame regardless of SimState.
fn tick_care_countdown(
    time: Res<Time>,
    mut active: ResMut<ActiveCare>,
    mut slider: ResMut<CareSlider>,
    config: Res<SimConfig>,
    mut next_state: ResMut<NextState<SimState>>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if let Some(ticket) = active.0.as_mut() {
        ticket.remaining_secs -= time.delta_secs();
    }

    if let Some(expiry) = expire_active(&mut active, &config) {
        slider.0 = None;
        if expiry.resume {
            next_state.set(SimState::Running);
            toasts.send(ToastEvent::new(
                "Care time expired - simulation resumed. Plant may suffer!",
            ));
        } else {
            toasts.send(ToastEvent::new(
                "Care time expired. The plant will keep suffering until you act.",
            ));
        }
        info!("[Care] Request expired unanswered");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Intensity response
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of an intensity-slider response to the active request.
#[derive(Debug, Clone, PartialEq)]
pub enum CareOutcome {
    /// No active request, or the target plant is gone/dead.
    Ignored,
    /// Medium band: request resolved, plant recovered.
    Perfect { action: CareAction },
    /// Miscalibrated but survivable; request cleared, strike recorded.
    Strike { strikes: u8, damage: f32 },
    /// Second strike or health floor: the plant died.
    Killed { intensity: f32 },
}

/// Apply the player's intensity response to the active request.
///
/// Only `v ∈ [40, 60]` succeeds. Outside the band damage is 30 (under-care)
/// or 40 (over-care); two strikes or zero health kill immediately with the
/// one-time death charge. A survived strike still clears the request and
/// stamps the care log so the cadence restarts.
pub fn apply_care_response(
    intensity: f32,
    active: &mut ActiveCare,
    grid: &mut FieldGrid,
    global_tick: u64,
) -> CareOutcome {
    let Some(ticket) = active.0.clone() else {
        return CareOutcome::Ignored;
    };

    let Some(slot) = grid.cells.get_mut(ticket.plant_index) else {
        active.0 = None;
        return CareOutcome::Ignored;
    };
    let Some(plant) = slot.as_mut() else {
        active.0 = None;
        return CareOutcome::Ignored;
    };
    if plant.is_dead {
        active.0 = None;
        return CareOutcome::Ignored;
    }

    active.0 = None;

    if (40.0..=60.0).contains(&intensity) {
        plant.health = (plant.health + 15.0).clamp(0.0, 100.0);
        plant.required_action = None;
        plant.last_care.stamp(ticket.action, global_tick);
        plant.stress_strikes = 0;
        return CareOutcome::Perfect { action: ticket.action };
    }

    let strikes = plant.stress_strikes + 1;
    let damage = if intensity < 40.0 { 30.0 } else { 40.0 };
    let next_health = (plant.health - damage).clamp(0.0, 100.0);

    if strikes >= 2 || next_health <= 0.0 {
        plant.is_dead = true;
        plant.health = 0.0;
        plant.death_charged = true;
        plant.stress_strikes = strikes;
        return CareOutcome::Killed { intensity };
    }

    plant.health = next_health;
    plant.required_action = None;
    plant.last_care.stamp(ticket.action, global_tick);
    plant.stress_strikes = strikes;
    CareOutcome::Strike { strikes, damage }
}

/// System wrapper: reads CareResponseEvent, applies the outcome, and
/// handles notices, the death penalty, and clock resumption.
fn handle_care_response(
    mut responses: EventReader<CareResponseEvent>,
    mut active: ResMut<ActiveCare>,
    mut grid: ResMut<FieldGrid>,
    mut slider: ResMut<CareSlider>,
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut next_state: ResMut<NextState<SimState>>,
    mut totals: ResMut<EconomyTotals>,
    mut coins: EventWriter<CoinChangeEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for response in responses.read() {
        let resume = active
            .0
            .as_ref()
            .map(|t| config.pause_during_care && t.resume_running)
            .unwrap_or(false);
        let action_label = active.0.as_ref().map(|t| t.action.label()).unwrap_or("care");

        let outcome =
            apply_care_response(response.intensity, &mut active, &mut grid, clock.global_tick());

        match &outcome {
            CareOutcome::Ignored => continue,
            CareOutcome::Perfect { action } => {
                toasts.send(ToastEvent::new(format!(
                    "✓ Perfect! Medium {} applied. Plant is thriving!",
                    action.label()
                )));
            }
            CareOutcome::Strike { strikes, damage } => {
                let kind = if response.intensity < 40.0 { "Under-care" } else { "Over-care" };
                toasts.send(ToastEvent::new(format!(
                    "⚠️ {} warning! Plant stressed ({:.0}%, -{} health). Strike {}/2.",
                    kind, response.intensity, damage, strikes
                )));
            }
            CareOutcome::Killed { intensity } => {
                totals.deaths += 1;
                coins.send(CoinChangeEvent {
                    amount: -(DEATH_PENALTY as i64),
                    reason: format!("plant killed by miscalibrated {action_label}"),
                });
                toasts.send(ToastEvent::new(format!(
                    "✗ Plant died! Too many care errors. Choice: {:.0}%.",
                    intensity
                )));
            }
        }

        slider.0 = None;
        if resume {
            next_state.set(SimState::Running);
        }
        info!("[Care] Response {:?} -> {:?}", response.intensity, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(species: &str, cell: usize, tick: u64) -> (FieldGrid, CropRegistry) {
        let registry = CropRegistry::default();
        let mut grid = FieldGrid::default();
        let def = registry.get(species).unwrap();
        grid.cells[cell] = Some(Plant::new(def, Biome::Hilly, tick));
        (grid, registry)
    }

    fn ticket_for(grid: &FieldGrid, index: usize, action: CareAction) -> ActiveCare {
        assert!(grid.cells[index].is_some());
        ActiveCare(Some(CareTicket {
            plant_index: index,
            action,
            remaining_secs: CARE_WINDOW_SECS,
            resume_running: true,
        }))
    }

    #[test]
    fn water_lapses_first_at_its_interval() {
        // Rice waters every 50 ticks normally, 35 under drought.
        let (grid, registry) = grid_with("Rice", 3, 1000);
        assert_eq!(scan_care_needs(&grid, &registry, 1049, false, 40.0, false), None);
        assert_eq!(
            scan_care_needs(&grid, &registry, 1050, false, 40.0, false),
            Some((3, CareAction::Water))
        );
        // Drought interval is shorter.
        assert_eq!(
            scan_care_needs(&grid, &registry, 1035, true, 10.0, false),
            Some((3, CareAction::Water))
        );
    }

    #[test]
    fn heavy_rain_suppresses_water_requests() {
        let (grid, registry) = grid_with("Rice", 0, 0);
        assert_eq!(scan_care_needs(&grid, &registry, 5000, false, 70.0, false), None);
        assert!(scan_care_needs(&grid, &registry, 5000, false, 69.9, false).is_some());
    }

    #[test]
    fn insecticide_gated_on_growth_progress() {
        let (mut grid, registry) = grid_with("Potato", 0, 0);
        // Potato: insecticide every 14 days = 1414 ticks; avoid the water
        // check by keeping rain high.
        let tick = 14 * DAY_TICKS;
        assert_eq!(scan_care_needs(&grid, &registry, tick, false, 80.0, false), None);
        if let Some(p) = grid.cells[0].as_mut() {
            p.growth_progress = INSECTICIDE_GATE;
        }
        assert_eq!(
            scan_care_needs(&grid, &registry, tick, false, 80.0, false),
            Some((0, CareAction::Insecticide))
        );
    }

    #[test]
    fn humidity_shortens_pest_cadences() {
        let (mut grid, registry) = grid_with("Potato", 0, 0);
        if let Some(p) = grid.cells[0].as_mut() {
            p.growth_progress = 70.0;
            // Insecticide satisfied recently; heavy rain keeps water quiet.
            p.last_care.insecticide = 14 * DAY_TICKS;
        }
        // Pesticide every 21 days = 2121 ticks dry, 1803 humid.
        let humid_due = (21.0 * DAY_TICKS as f64 * 0.85).round() as u64;
        assert_eq!(scan_care_needs(&grid, &registry, humid_due, false, 80.0, false), None);
        assert_eq!(
            scan_care_needs(&grid, &registry, humid_due, false, 80.0, true),
            Some((0, CareAction::Pesticide))
        );
    }

    #[test]
    fn scan_is_fifo_by_cell_index() {
        let registry = CropRegistry::default();
        let mut grid = FieldGrid::default();
        let rice = registry.get("Rice").unwrap();
        // Both overdue for water; the lower index wins even though the
        // higher index is more overdue.
        grid.cells[9] = Some(Plant::new(rice, Biome::Terai, 0));
        grid.cells[2] = Some(Plant::new(rice, Biome::Terai, 500));
        let found = scan_care_needs(&grid, &registry, 1000, false, 30.0, false);
        assert_eq!(found, Some((2, CareAction::Water)));
    }

    #[test]
    fn plants_with_pending_action_are_skipped() {
        let (mut grid, registry) = grid_with("Rice", 0, 0);
        if let Some(p) = grid.cells[0].as_mut() {
            p.required_action = Some(CareAction::Water);
        }
        assert_eq!(scan_care_needs(&grid, &registry, 9999, false, 30.0, false), None);
    }

    #[test]
    fn expiry_keeps_required_action_and_strikes() {
        let (mut grid, _registry) = grid_with("Rice", 1, 0);
        if let Some(p) = grid.cells[1].as_mut() {
            p.required_action = Some(CareAction::Water);
        }
        let mut active = ticket_for(&grid, 1, CareAction::Water);
        active.0.as_mut().unwrap().remaining_secs = -0.1;

        let config = SimConfig::default();
        let expiry = expire_active(&mut active, &config).unwrap();
        assert!(!expiry.resume, "penalty variant never resumes on expiry");
        assert!(active.0.is_none());

        let plant = grid.cells[1].as_ref().unwrap();
        assert_eq!(plant.required_action, Some(CareAction::Water));
        assert_eq!(plant.stress_strikes, 0, "timeout must not add a strike");
    }

    #[test]
    fn expiry_resumes_clock_under_pausing_policy() {
        let (grid, _registry) = grid_with("Rice", 0, 0);
        let mut active = ticket_for(&grid, 0, CareAction::Water);
        active.0.as_mut().unwrap().remaining_secs = 0.0;
        let config = SimConfig { pause_during_care: true, care_cost_per_cell: 0 };
        let expiry = expire_active(&mut active, &config).unwrap();
        assert!(expiry.resume);
    }

    #[test]
    fn expiry_does_nothing_while_time_remains() {
        let (grid, _registry) = grid_with("Rice", 0, 0);
        let mut active = ticket_for(&grid, 0, CareAction::Water);
        assert_eq!(expire_active(&mut active, &SimConfig::default()), None);
        assert!(active.0.is_some());
    }

    #[test]
    fn medium_response_resolves_and_heals() {
        let (mut grid, _r) = grid_with("Rice", 2, 0);
        if let Some(p) = grid.cells[2].as_mut() {
            p.required_action = Some(CareAction::Water);
            p.health = 60.0;
            p.stress_strikes = 1;
        }
        let mut active = ticket_for(&grid, 2, CareAction::Water);
        let outcome = apply_care_response(50.0, &mut active, &mut grid, 777);
        assert_eq!(outcome, CareOutcome::Perfect { action: CareAction::Water });
        assert!(active.0.is_none());
        let p = grid.cells[2].as_ref().unwrap();
        assert_eq!(p.health, 75.0);
        assert_eq!(p.required_action, None);
        assert_eq!(p.last_care.water, 777);
        assert_eq!(p.stress_strikes, 0);
    }

    #[test]
    fn band_edges_are_inclusive() {
        for v in [40.0, 60.0] {
            let (mut grid, _r) = grid_with("Rice", 0, 0);
            let mut active = ticket_for(&grid, 0, CareAction::Water);
            let outcome = apply_care_response(v, &mut active, &mut grid, 1);
            assert!(matches!(outcome, CareOutcome::Perfect { .. }), "v={v} should succeed");
        }
    }

    #[test]
    fn under_care_strikes_then_survives() {
        let (mut grid, _r) = grid_with("Rice", 0, 0);
        if let Some(p) = grid.cells[0].as_mut() {
            p.health = 80.0;
            p.required_action = Some(CareAction::Water);
        }
        let mut active = ticket_for(&grid, 0, CareAction::Water);
        let outcome = apply_care_response(20.0, &mut active, &mut grid, 10);
        assert_eq!(outcome, CareOutcome::Strike { strikes: 1, damage: 30.0 });
        let p = grid.cells[0].as_ref().unwrap();
        assert_eq!(p.health, 50.0);
        assert_eq!(p.required_action, None, "survived strike still clears the request");
        assert_eq!(p.last_care.water, 10);
        assert_eq!(p.stress_strikes, 1);
    }

    #[test]
    fn second_strike_kills_even_at_full_health() {
        let (mut grid, _r) = grid_with("Rice", 0, 0);
        if let Some(p) = grid.cells[0].as_mut() {
            p.health = 100.0;
            p.stress_strikes = 1;
        }
        let mut active = ticket_for(&grid, 0, CareAction::Water);
        let outcome = apply_care_response(90.0, &mut active, &mut grid, 10);
        assert_eq!(outcome, CareOutcome::Killed { intensity: 90.0 });
        let p = grid.cells[0].as_ref().unwrap();
        assert!(p.is_dead);
        assert!(p.death_charged);
        assert_eq!(p.health, 0.0);
    }

    #[test]
    fn first_strike_kills_when_health_cannot_absorb_it() {
        let (mut grid, _r) = grid_with("Rice", 0, 0);
        if let Some(p) = grid.cells[0].as_mut() {
            p.health = 25.0; // under-care damage 30 floors it
        }
        let mut active = ticket_for(&grid, 0, CareAction::Water);
        let outcome = apply_care_response(10.0, &mut active, &mut grid, 10);
        assert!(matches!(outcome, CareOutcome::Killed { .. }));
    }

    #[test]
    fn response_without_active_request_is_ignored() {
        let (mut grid, _r) = grid_with("Rice", 0, 0);
        let mut active = ActiveCare::default();
        let outcome = apply_care_response(50.0, &mut active, &mut grid, 10);
        assert_eq!(outcome, CareOutcome::Ignored);
        assert_eq!(grid.cells[0].as_ref().unwrap().health, 74.0);
    }
}
