use avatar::{Controller, InputSnapshot, Mixer};
use bevy::prelude::*;

/// Root entity of the controllable avatar.
#[derive(Component)]
pub struct CharacterRoot;

#[derive(Component, Debug, Deref, DerefMut)]
pub struct AvatarController(pub Controller);

/// Clip clock driven by the controller; mirrored onto the glTF animation players.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct AvatarMixer(pub Mixer);

/// Keyboard state sampled once per frame.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Deref, DerefMut)]
pub struct AvatarInput(pub InputSnapshot);
