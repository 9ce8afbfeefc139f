//! Session snapshots — the full sim state as JSON, for save/restore and
//! for the resume-determinism guarantee: restoring a snapshot and running
//! N ticks produces the same field as never having stopped.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "khetbari.session";

pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SavedSession>()
            .add_systems(Startup, restore_persisted_session)
            .add_systems(Update, (handle_save, handle_load));
    }
}

/// Everything the tick loop reads or writes. The care countdown is
/// wall-clock state and deliberately not part of it; a pending
/// `required_action` survives on the plant itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub clock: SimClock,
    pub environment: Environment,
    pub grid: FieldGrid,
    pub wallet: Wallet,
    pub totals: EconomyTotals,
    pub location_query: String,
}

/// Capture the current session.
pub fn capture(
    clock: &SimClock,
    env: &Environment,
    grid: &FieldGrid,
    wallet: &Wallet,
    totals: &EconomyTotals,
    location: &Location,
) -> SessionSnapshot {
    let mut clock = clock.clone();
    // The accumulator is frame phase, not sim state.
    clock.elapsed = 0.0;
    SessionSnapshot {
        clock,
        environment: env.clone(),
        grid: grid.clone(),
        wallet: *wallet,
        totals: *totals,
        location_query: location.query.clone(),
    }
}

/// Overwrite the live resources from a snapshot.
pub fn restore(
    snapshot: &SessionSnapshot,
    clock: &mut SimClock,
    env: &mut Environment,
    grid: &mut FieldGrid,
    wallet: &mut Wallet,
    totals: &mut EconomyTotals,
    location: &mut Location,
) {
    *clock = snapshot.clock.clone();
    clock.elapsed = 0.0;
    *env = snapshot.environment.clone();
    *grid = snapshot.grid.clone();
    *wallet = snapshot.wallet;
    *totals = snapshot.totals;
    location.query = snapshot.location_query.clone();
}

pub fn to_json(snapshot: &SessionSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

pub fn from_json(json: &str) -> Result<SessionSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

fn handle_save(
    mut events: EventReader<SaveSnapshotEvent>,
    clock: Res<SimClock>,
    env: Res<Environment>,
    grid: Res<FieldGrid>,
    wallet: Res<Wallet>,
    totals: Res<EconomyTotals>,
    location: Res<Location>,
    mut saved: ResMut<SavedSession>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        let snapshot = capture(&clock, &env, &grid, &wallet, &totals, &location);
        match to_json(&snapshot) {
            Ok(json) => {
                persist(&json);
                saved.0 = Some(json);
                toasts.send(ToastEvent::new("Session saved."));
                info!("[Snapshot] Saved (day {}, {} plants)", clock.day, grid.planted_count());
            }
            Err(err) => {
                warn!("[Snapshot] Serialization failed: {err}");
                toasts.send(ToastEvent::new("Save failed."));
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_load(
    mut events: EventReader<LoadSnapshotEvent>,
    saved: Res<SavedSession>,
    mut clock: ResMut<SimClock>,
    mut env: ResMut<Environment>,
    mut grid: ResMut<FieldGrid>,
    mut wallet: ResMut<Wallet>,
    mut totals: ResMut<EconomyTotals>,
    mut location: ResMut<Location>,
    mut active: ResMut<ActiveCare>,
    mut next_state: ResMut<NextState<SimState>>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        let Some(json) = saved.0.as_deref() else {
            toasts.send(ToastEvent::new("No saved session yet."));
            continue;
        };
        match from_json(json) {
            Ok(snapshot) => {
                restore(
                    &snapshot,
                    &mut clock,
                    &mut env,
                    &mut grid,
                    &mut wallet,
                    &mut totals,
                    &mut location,
                );
                // A restored session starts stopped with no live countdown;
                // any pending required_action re-raises on the next tick scan.
                active.0 = None;
                next_state.set(SimState::Stopped);
                toasts.send(ToastEvent::new(format!("Session restored (day {}).", clock.day)));
                info!("[Snapshot] Restored day {}", clock.day);
            }
            Err(err) => {
                warn!("[Snapshot] Corrupt saved session: {err}");
                toasts.send(ToastEvent::new("Saved session is unreadable."));
            }
        }
    }
}

/// Pick up a persisted session from browser storage on startup.
fn restore_persisted_session(mut saved: ResMut<SavedSession>) {
    if saved.0.is_none() {
        if let Some(json) = load_persisted() {
            info!("[Snapshot] Found persisted session");
            saved.0 = Some(json);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn persist(json: &str) {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
    if let Some(storage) = storage {
        if storage.set_item(STORAGE_KEY, json).is_err() {
            warn!("[Snapshot] localStorage write failed");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn persist(_json: &str) {}

#[cfg(target_arch = "wasm32")]
fn load_persisted() -> Option<String> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    storage.get_item(STORAGE_KEY).ok().flatten()
}

#[cfg(not(target_arch = "wasm32"))]
fn load_persisted() -> Option<String> {
    None
}
