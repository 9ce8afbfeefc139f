mod hud;
mod toast;

use bevy::prelude::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── TOASTS — always present ───
        app.add_systems(Startup, toast::spawn_toast_container);
        app.add_systems(Update, (toast::handle_toast_events, toast::update_toasts));

        // ─── HUD — always present; the sim state is shown, not gated on ───
        app.add_systems(Startup, hud::spawn_hud);
        app.add_systems(
            Update,
            (
                hud::update_status_line,
                hud::update_field_line,
                hud::update_care_line,
            ),
        );
    }
}
