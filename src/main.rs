mod shared;
mod input;
mod sim;
mod care;
mod actions;
mod economy;
mod weather;
mod advisor;
mod snapshot;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Khetbari".into(),
                        resolution: WindowResolution::new(1280.0, 720.0),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Sim state
        .init_state::<SimState>()
        // Shared resources
        .init_resource::<SimClock>()
        .init_resource::<Environment>()
        .init_resource::<FieldGrid>()
        .init_resource::<CropRegistry>()
        .init_resource::<ActiveCare>()
        .init_resource::<CareSlider>()
        .init_resource::<SimConfig>()
        .init_resource::<Wallet>()
        .init_resource::<EconomyTotals>()
        .init_resource::<Location>()
        .init_resource::<WeatherStation>()
        .init_resource::<SelectedCell>()
        .init_resource::<SelectedCrop>()
        // Events
        .add_event::<ToastEvent>()
        .add_event::<CoinChangeEvent>()
        .add_event::<DayRolloverEvent>()
        .add_event::<PlantSeedEvent>()
        .add_event::<BulkCareEvent>()
        .add_event::<HarvestEvent>()
        .add_event::<ClearDeadEvent>()
        .add_event::<CareResponseEvent>()
        .add_event::<ToggleSimEvent>()
        .add_event::<SetSpeedEvent>()
        .add_event::<SetEnvAxisEvent>()
        .add_event::<LocationSubmitEvent>()
        .add_event::<GeocodeResultEvent>()
        .add_event::<WeatherSnapshotEvent>()
        .add_event::<SaveSnapshotEvent>()
        .add_event::<LoadSnapshotEvent>()
        .add_event::<ChatQueryEvent>()
        .add_event::<ChatReplyEvent>()
        .add_event::<RecommendationRequestEvent>()
        .add_event::<RecommendationEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(sim::SimPlugin)
        .add_plugins(care::CarePlugin)
        .add_plugins(actions::ActionsPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(weather::WeatherPlugin)
        .add_plugins(advisor::AdvisorPlugin)
        .add_plugins(snapshot::SnapshotPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
