//! The controllable avatar: spawning, clip binding, per-frame ticking.

pub mod animation;
pub mod controller;
pub mod factory;
pub mod movement;

pub use animation::{
    AvatarAnimationBound, AvatarAnimationLibrary, bind_avatar_animation_players,
    initialize_avatar_animation_library, signal_clips_ready, sync_animation_players,
};
pub use controller::{AvatarController, AvatarInput, AvatarMixer, CharacterRoot};
pub use factory::spawn_avatar;
pub use movement::{apply_pose, collect_avatar_input, tick_avatar_controller};

use crate::app::state::AppState;
use crate::control_mode::character_control_active;
use bevy::prelude::*;

/// Ordering of the avatar's per-frame work; the follow camera runs after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AvatarSystems {
    Loading,
    Input,
    Tick,
    Animate,
}

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AvatarInput>()
            .configure_sets(
                Update,
                (
                    AvatarSystems::Loading,
                    AvatarSystems::Input,
                    AvatarSystems::Tick,
                    AvatarSystems::Animate,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_avatar)
            .add_systems(
                Update,
                (
                    initialize_avatar_animation_library,
                    bind_avatar_animation_players,
                    signal_clips_ready,
                )
                    .chain()
                    .in_set(AvatarSystems::Loading)
                    .run_if(in_state(AppState::Loading)),
            )
            .add_systems(
                Update,
                (
                    collect_avatar_input.in_set(AvatarSystems::Input),
                    tick_avatar_controller.in_set(AvatarSystems::Tick),
                )
                    .run_if(in_state(AppState::Running).and(character_control_active)),
            )
            .add_systems(
                Update,
                sync_animation_players
                    .in_set(AvatarSystems::Animate)
                    .run_if(in_state(AppState::Running)),
            );
    }
}
