use bevy::app::PluginGroupBuilder;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::pipelined_rendering::PipelinedRenderingPlugin;
use bevy::window::WindowResolution;

use crate::settings::{self, GameSettings};

pub fn build_bevy_plugins(startup_settings: &GameSettings) -> PluginGroupBuilder {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(create_window_settings(startup_settings)),
            ..Default::default()
        })
        .set(AssetPlugin {
            file_path: concat!(env!("CARGO_MANIFEST_DIR"), "/../assets").into(),
            ..Default::default()
        })
        .disable::<PipelinedRenderingPlugin>()
}

fn create_window_settings(startup_settings: &GameSettings) -> Window {
    let window = &startup_settings.window;
    Window {
        title: window.title.clone(),
        resolution: WindowResolution::new(window.width, window.height),
        resizable: true,
        mode: window.mode.to_bevy(),
        present_mode: settings::present_mode_for(window),
        ..Default::default()
    }
}
