//! Which control path owns the keyboard: the avatar or the fly camera.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::camera::FollowCamera;
use crate::settings::SettingsResource;

const FREE_ROAM_SPEED: f32 = 10.0;
const FREE_ROAM_LOOK_SPEED: f32 = 0.005;
const FREE_ROAM_UP: KeyCode = KeyCode::KeyQ;
const FREE_ROAM_DOWN: KeyCode = KeyCode::KeyE;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Keys drive the avatar and the camera follows it.
    #[default]
    Character,
    /// Keys fly the camera; the avatar is left untouched.
    FreeRoam,
}

impl ControlMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Character => Self::FreeRoam,
            Self::FreeRoam => Self::Character,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::FreeRoam => "Free roam",
        }
    }
}

/// Look angles of the fly camera, captured when free roam starts.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FreeRoamLook {
    pub yaw: f32,
    pub pitch: f32,
}

pub struct ControlModePlugin;

impl Plugin for ControlModePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlMode>()
            .init_resource::<FreeRoamLook>()
            .add_systems(
                Update,
                (toggle_control_mode, fly_free_roam_camera.run_if(free_roam_active)).chain(),
            );
    }
}

pub fn character_control_active(mode: Res<ControlMode>) -> bool {
    *mode == ControlMode::Character
}

pub fn free_roam_active(mode: Res<ControlMode>) -> bool {
    *mode == ControlMode::FreeRoam
}

pub fn toggle_control_mode(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<SettingsResource>,
    mut mode: ResMut<ControlMode>,
    mut look: ResMut<FreeRoamLook>,
    cameras: Query<&Transform, With<FollowCamera>>,
) {
    if !keys.just_pressed(settings.current.controls.toggle_control_mode) {
        return;
    }

    *mode = mode.toggled();
    if *mode == ControlMode::FreeRoam {
        if let Ok(transform) = cameras.single() {
            let forward = transform.forward();
            look.yaw = (-forward.x).atan2(-forward.z);
            look.pitch = forward.y.clamp(-0.999, 0.999).asin();
        }
    }

    info!("Control mode: {}", mode.label());
}

pub fn fly_free_roam_camera(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<SettingsResource>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut look: ResMut<FreeRoamLook>,
    mut cameras: Query<&mut Transform, With<FollowCamera>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    let mut mouse_delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        mouse_delta += motion.delta;
    }
    look.yaw -= mouse_delta.x * FREE_ROAM_LOOK_SPEED;
    look.pitch = (look.pitch - mouse_delta.y * FREE_ROAM_LOOK_SPEED)
        .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    transform.rotation = Quat::from_euler(EulerRot::YXZ, look.yaw, look.pitch, 0.0);

    let bindings = &settings.current.controls;
    let held = |bound: &[KeyCode]| keys.any_pressed(bound.iter().copied());
    let axis = |positive: bool, negative: bool| f32::from(u8::from(positive)) - f32::from(u8::from(negative));

    let direction = *transform.forward() * axis(held(&bindings.forward), held(&bindings.backward))
        + *transform.right() * axis(held(&bindings.right), held(&bindings.left))
        + Vec3::Y * axis(keys.pressed(FREE_ROAM_UP), keys.pressed(FREE_ROAM_DOWN));

    transform.translation += direction.normalize_or_zero() * FREE_ROAM_SPEED * time.delta_secs();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_returns_to_character() {
        let mode = ControlMode::default();
        assert_eq!(mode, ControlMode::Character);
        assert_eq!(mode.toggled(), ControlMode::FreeRoam);
        assert_eq!(mode.toggled().toggled(), ControlMode::Character);
    }
}
