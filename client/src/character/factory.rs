use avatar::Controller;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use super::animation::AvatarAnimationLibrary;
use super::controller::{AvatarController, CharacterRoot};
use crate::settings::SettingsResource;

/// Loads the avatar glTF and spawns its root with an idle, not-yet-ready controller.
pub fn spawn_avatar(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SettingsResource>,
) {
    let avatar_settings = &settings.current.avatar;
    let model_path = avatar_settings.model_path.clone();
    info!("Loading avatar model '{}'", model_path);

    commands.insert_resource(AvatarAnimationLibrary::new(
        asset_server.load(model_path.clone()),
    ));

    commands.spawn((
        CharacterRoot,
        AvatarController(Controller::new(settings.current.controller)),
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(model_path))),
        Transform::from_scale(Vec3::splat(avatar_settings.scale)),
        Visibility::default(),
    ));
}
