//! Simulation clock and tick driver.
//!
//! Real time accumulates against the active speed preset; each elapsed
//! interval runs exactly one tick through `run_tick`, a pure-ish step over
//! the sim resources. The driver only translates outcomes into events and
//! state changes. The care scheduler scan is the one cross-domain call:
//! the tick owns the scan ordering, so it calls `care::scan_care_needs`
//! directly rather than round-tripping an event.

use bevy::prelude::*;

use crate::care::scan_care_needs;
use crate::shared::*;

pub mod growth;

use growth::{advance_plant, GrowthCtx};

pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            drive_simulation.run_if(in_state(SimState::Running)),
        )
        .add_systems(Update, (handle_toggle, handle_set_speed))
        .add_systems(OnEnter(SimState::Running), on_sim_started)
        .add_systems(OnExit(SimState::Running), on_sim_stopped);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tick step
// ─────────────────────────────────────────────────────────────────────────────

/// Everything one tick produced that the outside world must react to.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickOutcome {
    /// A new day began (the new day number).
    pub rolled_day: Option<u64>,
    /// Plants that died this tick: (cell index, species).
    pub deaths: Vec<(usize, String)>,
    /// A care request was raised this tick.
    pub care_raised: Option<(usize, CareAction)>,
    /// Pausing policy: the raise stopped the clock before the growth pass.
    pub paused_for_care: bool,
    /// Every live plant is mature; stop and tell the player (fires once).
    pub all_mature: bool,
}

/// Advance the simulation by exactly one tick.
///
/// Order within the tick: scheduler scan first, then the growth pass over
/// every cell, then the clock increment with day rollover, then the
/// all-mature check. The growth pass runs against the pre-increment clock;
/// nothing in the growth math reads the time of day, and a change that
/// starts to must revisit this ordering. Under the pausing policy a raised
/// request ends the tick right after the scan.
pub fn run_tick(
    clock: &mut SimClock,
    env: &Environment,
    grid: &mut FieldGrid,
    active: &mut ActiveCare,
    registry: &CropRegistry,
    config: &SimConfig,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if active.0.is_none() {
        if let Some((index, action)) = scan_care_needs(
            grid,
            registry,
            clock.global_tick(),
            env.drought_active(),
            env.rain,
            env.is_humid(),
        ) {
            if let Some(plant) = grid.cells[index].as_mut() {
                plant.required_action = Some(action);
            }
            active.0 = Some(CareTicket {
                plant_index: index,
                action,
                remaining_secs: CARE_WINDOW_SECS,
                resume_running: true,
            });
            outcome.care_raised = Some((index, action));

            if config.pause_during_care {
                outcome.paused_for_care = true;
                return outcome;
            }
        }
    }

    let ctx = GrowthCtx::sample(env, clock.speed);
    for (index, cell) in grid.cells.iter_mut().enumerate() {
        let Some(plant) = cell else { continue };
        let next = advance_plant(plant, &registry.profile_for(&plant.species), &ctx);
        if next.death_charged && !plant.death_charged {
            outcome.deaths.push((index, next.species.clone()));
        }
        *plant = next;
    }

    clock.tod += 1;
    if clock.tod > 100 {
        clock.tod = 0;
        clock.day += 1;
        outcome.rolled_day = Some(clock.day);
    }

    // Auto-stop once when the whole field is ready for harvest. A pending
    // care demand anywhere holds the stop off.
    let alive = grid.alive_count();
    if alive > 0 && !clock.mature_notified {
        let all_mature = grid
            .cells
            .iter()
            .flatten()
            .filter(|p| !p.is_dead)
            .all(|p| p.is_mature() && p.required_action.is_none());
        if all_mature {
            clock.mature_notified = true;
            outcome.all_mature = true;
        }
    }

    outcome
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulate frame time and run the due ticks, relaying outcomes.
#[allow(clippy::too_many_arguments)]
fn drive_simulation(
    time: Res<Time>,
    mut clock: ResMut<SimClock>,
    env: Res<Environment>,
    mut grid: ResMut<FieldGrid>,
    mut active: ResMut<ActiveCare>,
    registry: Res<CropRegistry>,
    config: Res<SimConfig>,
    mut next_state: ResMut<NextState<SimState>>,
    mut totals: ResMut<EconomyTotals>,
    mut rollovers: EventWriter<DayRolloverEvent>,
    mut coins: EventWriter<CoinChangeEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    clock.elapsed += time.delta_secs();

    loop {
        let interval = clock.speed.tick_secs();
        if clock.elapsed < interval {
            break;
        }
        clock.elapsed -= interval;

        let outcome = run_tick(&mut clock, &env, &mut grid, &mut active, &registry, &config);

        if let Some(day) = outcome.rolled_day {
            info!("[Sim] Day {} begins", day);
            rollovers.send(DayRolloverEvent { day });
        }

        for (index, species) in &outcome.deaths {
            totals.deaths += 1;
            coins.send(CoinChangeEvent {
                amount: -(DEATH_PENALTY as i64),
                reason: format!("{species} died in cell {index}"),
            });
            toasts.send(ToastEvent::new(format!("💀 {species} died from poor health.")));
        }

        if let Some((index, action)) = outcome.care_raised {
            let species = grid.cells[index]
                .as_ref()
                .map(|p| p.species.clone())
                .unwrap_or_default();
            info!("[Sim] Care request: {} needs {}", species, action.label());
            toasts.send(ToastEvent::new(format!(
                "⚠️ {} needs {}! Set intensity within {:.0}s.",
                species,
                action.label(),
                CARE_WINDOW_SECS
            )));
        }

        if outcome.all_mature {
            toasts.send(ToastEvent::new("🎉 All crops are mature! Harvest when ready."));
            next_state.set(SimState::Stopped);
            clock.elapsed = 0.0;
            break;
        }

        if outcome.paused_for_care {
            next_state.set(SimState::Stopped);
            clock.elapsed = 0.0;
            break;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Control events
// ─────────────────────────────────────────────────────────────────────────────

/// Start/stop toggle with start gating: the sim only starts with at least
/// one planted cell, a resolved location, and (pausing policy) no pending
/// care request.
fn handle_toggle(
    mut toggles: EventReader<ToggleSimEvent>,
    state: Res<State<SimState>>,
    mut next_state: ResMut<NextState<SimState>>,
    mut clock: ResMut<SimClock>,
    grid: Res<FieldGrid>,
    location: Res<Location>,
    active: Res<ActiveCare>,
    config: Res<SimConfig>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in toggles.read() {
        match state.get() {
            SimState::Running => {
                next_state.set(SimState::Stopped);
            }
            SimState::Stopped => {
                if grid.planted_count() == 0 {
                    toasts.send(ToastEvent::new("Plant at least one seed before starting."));
                    continue;
                }
                if location.resolved_label.is_empty() {
                    toasts.send(ToastEvent::new("Set a farm location before starting."));
                    continue;
                }
                if config.pause_during_care && active.0.is_some() {
                    toasts.send(ToastEvent::new("Answer the pending care request first."));
                    continue;
                }
                clock.elapsed = 0.0;
                next_state.set(SimState::Running);
            }
        }
    }
}

/// Speed changes apply from the next tick; the accumulator carries over.
fn handle_set_speed(mut events: EventReader<SetSpeedEvent>, mut clock: ResMut<SimClock>) {
    for SetSpeedEvent(preset) in events.read() {
        if clock.speed != *preset {
            clock.speed = *preset;
            info!("[Sim] Speed set to {}", preset.label());
        }
    }
}

fn on_sim_started(clock: Res<SimClock>) {
    info!("[Sim] Running (day {}, {})", clock.day, clock.clock_text());
}

fn on_sim_stopped(clock: Res<SimClock>) {
    info!("[Sim] Stopped (day {}, {})", clock.day, clock.clock_text());
}
