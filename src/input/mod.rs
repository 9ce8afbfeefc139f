use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, read_input);
    }
}

/// The single point where hardware input becomes game commands. Everything
/// downstream consumes shared events; no other system reads the keyboard.
///
/// While a care request is active the arrow keys drive the intensity
/// slider instead of the field cursor, and Enter submits the response.
#[allow(clippy::too_many_arguments)]
fn read_input(
    keys: Res<ButtonInput<KeyCode>>,
    active: Res<ActiveCare>,
    mut slider: ResMut<CareSlider>,
    mut cursor: ResMut<SelectedCell>,
    mut picked: ResMut<SelectedCrop>,
    registry: Res<CropRegistry>,
    env: Res<Environment>,
    mut axis: EventWriter<SetEnvAxisEvent>,
    mut plant: EventWriter<PlantSeedEvent>,
    mut care: EventWriter<BulkCareEvent>,
    mut harvest: EventWriter<HarvestEvent>,
    mut clear: EventWriter<ClearDeadEvent>,
    mut respond: EventWriter<CareResponseEvent>,
    mut toggle: EventWriter<ToggleSimEvent>,
    mut speed: EventWriter<SetSpeedEvent>,
    (mut save, mut load): (EventWriter<SaveSnapshotEvent>, EventWriter<LoadSnapshotEvent>),
) {
    if keys.just_pressed(KeyCode::Space) {
        toggle.send(ToggleSimEvent);
    }
    if keys.just_pressed(KeyCode::F5) {
        save.send(SaveSnapshotEvent);
    }
    if keys.just_pressed(KeyCode::F9) {
        load.send(LoadSnapshotEvent);
    }
    if keys.just_pressed(KeyCode::F1) {
        speed.send(SetSpeedEvent(SpeedPreset::Slow));
    }
    if keys.just_pressed(KeyCode::F2) {
        speed.send(SetSpeedEvent(SpeedPreset::Medium));
    }
    if keys.just_pressed(KeyCode::F3) {
        speed.send(SetSpeedEvent(SpeedPreset::Fast));
    }

    // Care mode captures the arrows and Enter until the ticket resolves.
    if active.0.is_some() {
        let step = if keys.pressed(KeyCode::ShiftLeft) { 1.0 } else { 5.0 };
        if keys.just_pressed(KeyCode::ArrowLeft) {
            let v = slider.0.unwrap_or(50.0);
            slider.0 = Some((v - step).clamp(0.0, 100.0));
        }
        if keys.just_pressed(KeyCode::ArrowRight) {
            let v = slider.0.unwrap_or(50.0);
            slider.0 = Some((v + step).clamp(0.0, 100.0));
        }
        if keys.just_pressed(KeyCode::Enter) {
            respond.send(CareResponseEvent { intensity: slider.0.unwrap_or(50.0) });
        }
        return;
    }

    if keys.just_pressed(KeyCode::ArrowLeft) && cursor.0 % GRID_COLS > 0 {
        cursor.0 -= 1;
    }
    if keys.just_pressed(KeyCode::ArrowRight) && cursor.0 % GRID_COLS < GRID_COLS - 1 {
        cursor.0 += 1;
    }
    if keys.just_pressed(KeyCode::ArrowUp) && cursor.0 >= GRID_COLS {
        cursor.0 -= GRID_COLS;
    }
    if keys.just_pressed(KeyCode::ArrowDown) && cursor.0 + GRID_COLS < GRID_CELLS {
        cursor.0 += GRID_COLS;
    }

    for (i, key) in [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
    ]
    .iter()
    .enumerate()
    {
        if keys.just_pressed(*key) {
            if let Some(species) = registry.order.get(i) {
                picked.0 = Some(species.clone());
            }
            break;
        }
    }

    if keys.just_pressed(KeyCode::Enter) {
        if let Some(species) = picked.0.clone() {
            plant.send(PlantSeedEvent { cell: cursor.0, species });
        }
    }

    if keys.just_pressed(KeyCode::KeyW) {
        care.send(BulkCareEvent { action: CareAction::Water, scope: ActionScope::All });
    }
    if keys.just_pressed(KeyCode::KeyI) {
        care.send(BulkCareEvent { action: CareAction::Insecticide, scope: ActionScope::All });
    }
    if keys.just_pressed(KeyCode::KeyO) {
        care.send(BulkCareEvent { action: CareAction::Pesticide, scope: ActionScope::All });
    }
    if keys.just_pressed(KeyCode::KeyH) {
        harvest.send(HarvestEvent { scope: ActionScope::All });
    }
    if keys.just_pressed(KeyCode::KeyC) {
        clear.send(ClearDeadEvent);
    }

    // Environment sliders: R/S/G/T nudge rain, sun, wind (gusts) and
    // temperature up; ShiftLeft reverses. Nudged axes stay pinned until
    // the next location change.
    let axis_step = if keys.pressed(KeyCode::ShiftLeft) { -5.0 } else { 5.0 };
    if keys.just_pressed(KeyCode::KeyR) {
        axis.send(SetEnvAxisEvent { axis: EnvAxis::Rain, value: env.rain + axis_step });
    }
    if keys.just_pressed(KeyCode::KeyS) {
        axis.send(SetEnvAxisEvent { axis: EnvAxis::Sun, value: env.sun + axis_step });
    }
    if keys.just_pressed(KeyCode::KeyG) {
        axis.send(SetEnvAxisEvent { axis: EnvAxis::Wind, value: env.wind + axis_step });
    }
    if keys.just_pressed(KeyCode::KeyT) {
        axis.send(SetEnvAxisEvent {
            axis: EnvAxis::Temperature,
            value: env.temperature + axis_step / 5.0,
        });
    }
}
