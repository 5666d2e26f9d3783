use bevy::prelude::*;
use bevy::state::app::AppExtStates;
use bevy_egui::EguiPlugin;

use crate::app::plugins::build_bevy_plugins;
use crate::app::scene::ScenePlugin;
use crate::app::state::AppState;
use crate::camera::FollowCameraPlugin;
use crate::character::CharacterPlugin;
use crate::control_mode::ControlModePlugin;
use crate::settings::{self, GameSettings, SettingsPlugin, SettingsResource};
use crate::ui::HudPlugin;

pub fn run_client_app() {
    let startup_settings = load_startup_settings();
    let mut app = App::new();
    configure_client_app(&mut app, &startup_settings);
    app.run();
}

pub fn configure_client_app(app: &mut App, startup_settings: &GameSettings) {
    app.insert_resource(SettingsResource::new(startup_settings.clone()))
        .add_plugins(build_bevy_plugins(startup_settings))
        .add_plugins(EguiPlugin::default())
        .init_state::<AppState>()
        .add_plugins(SettingsPlugin)
        .add_plugins(ControlModePlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(CharacterPlugin)
        .add_plugins(FollowCameraPlugin)
        .add_plugins(HudPlugin);
}

fn load_startup_settings() -> GameSettings {
    let startup_settings = settings::load_settings_or_default();
    if let Err(error) = settings::ensure_settings_file_exists(&startup_settings) {
        eprintln!(
            "Failed to ensure startup settings file '{}': {}",
            settings::SETTINGS_FILE_PATH,
            error
        );
    }
    startup_settings
}
