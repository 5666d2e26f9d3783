use bevy::prelude::*;

use crate::app::state::AppState;
use crate::character::{AvatarSystems, CharacterRoot};
use crate::control_mode::character_control_active;

/// Camera position relative to the avatar in character mode.
pub const FOLLOW_OFFSET: Vec3 = Vec3::new(-20.0, 15.0, 5.0);
const INITIAL_POSITION: Vec3 = Vec3::new(25.0, 10.0, 25.0);

#[derive(Component, Debug, Clone, Copy)]
pub struct FollowCamera {
    pub offset: Vec3,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            offset: FOLLOW_OFFSET,
        }
    }
}

pub struct FollowCameraPlugin;

impl Plugin for FollowCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_follow_camera).add_systems(
            Update,
            follow_avatar
                .after(AvatarSystems::Tick)
                .run_if(in_state(AppState::Running).and(character_control_active)),
        );
    }
}

fn spawn_follow_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        FollowCamera::default(),
        Transform::from_translation(INITIAL_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Keeps the camera at a fixed world offset from the avatar, facing it.
pub fn follow_avatar(
    avatars: Query<&Transform, (With<CharacterRoot>, Without<FollowCamera>)>,
    mut cameras: Query<(&mut Transform, &FollowCamera)>,
) {
    let Ok(avatar) = avatars.single() else {
        return;
    };

    for (mut transform, follow) in &mut cameras {
        *transform = Transform::from_translation(avatar.translation + follow.offset)
            .looking_at(avatar.translation, Vec3::Y);
    }
}
