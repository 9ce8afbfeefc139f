use bevy::prelude::*;
use crate::shared::*;

/// Marker for the day/clock/coins/speed status line.
#[derive(Component)]
pub struct StatusLine;

/// Marker for the biome/environment/field-stats line.
#[derive(Component)]
pub struct FieldLine;

/// Marker for the care-request countdown line.
#[derive(Component)]
pub struct CareLine;

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(8.0),
                left: Val::Px(8.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            let font = TextFont { font_size: 14.0, ..default() };
            parent.spawn((StatusLine, Text::new(""), font.clone(), TextColor(Color::WHITE)));
            parent.spawn((FieldLine, Text::new(""), font.clone(), TextColor(Color::WHITE)));
            parent.spawn((
                CareLine,
                Text::new(""),
                font,
                TextColor(Color::srgb(1.0, 0.8, 0.3)),
            ));
        });
}

pub fn update_status_line(
    clock: Res<SimClock>,
    wallet: Res<Wallet>,
    state: Res<State<SimState>>,
    mut query: Query<&mut Text, With<StatusLine>>,
) {
    let Ok(mut text) = query.get_single_mut() else { return };
    let running = match state.get() {
        SimState::Running => "Running",
        SimState::Stopped => "Stopped",
    };
    text.0 = format!(
        "Day {} · {} · {}/100 · {} · {} · 🪙 {}",
        clock.day,
        clock.clock_text(),
        clock.tod,
        clock.speed.label(),
        running,
        wallet.coins
    );
}

pub fn update_field_line(
    env: Res<Environment>,
    grid: Res<FieldGrid>,
    location: Res<Location>,
    station: Res<WeatherStation>,
    mut query: Query<&mut Text, With<FieldLine>>,
) {
    let Ok(mut text) = query.get_single_mut() else { return };
    let hazard = if env.drought_active() {
        " · DROUGHT"
    } else if env.flood_active() {
        " · WATERLOGGING"
    } else {
        ""
    };
    let condition = station
        .latest
        .as_ref()
        .map(|wx| format!(" · {}", wx.condition_text))
        .unwrap_or_default();
    text.0 = format!(
        "{} ({}) · {:.0}°C · Sun {:.0} Rain {:.0} Wind {:.0}{}{} · Alive {}/{} · Avg health {:.0}",
        location.resolved_label,
        env.biome.label(),
        env.temperature,
        env.sun,
        env.rain,
        env.wind,
        hazard,
        condition,
        grid.alive_count(),
        grid.planted_count(),
        grid.average_health()
    );
}

pub fn update_care_line(
    active: Res<ActiveCare>,
    slider: Res<CareSlider>,
    grid: Res<FieldGrid>,
    mut query: Query<&mut Text, With<CareLine>>,
) {
    let Ok(mut text) = query.get_single_mut() else { return };
    match &active.0 {
        Some(ticket) => {
            let species = grid.cells[ticket.plant_index]
                .as_ref()
                .map(|p| p.species.as_str())
                .unwrap_or("plant");
            let intensity = slider
                .0
                .map(|v| format!("{v:.0}%"))
                .unwrap_or_else(|| "--".to_string());
            text.0 = format!(
                "⚠ {} needs {} · {:.0}s left · intensity {} (←/→, Enter)",
                species,
                ticket.action.label(),
                ticket.remaining_secs.max(0.0),
                intensity
            );
        }
        None => {
            if !text.0.is_empty() {
                text.0.clear();
            }
        }
    }
}
