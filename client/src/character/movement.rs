use super::controller::{AvatarController, AvatarInput, AvatarMixer, CharacterRoot};
use crate::settings::SettingsResource;
use avatar::Pose;
use bevy::prelude::*;

/// Sample the bound keys into the per-frame input snapshot.
pub fn collect_avatar_input(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<SettingsResource>,
    mut input: ResMut<AvatarInput>,
) {
    let snapshot = settings.current.controls.snapshot(&keys);
    if input.0 != snapshot {
        input.0 = snapshot;
    }
}

/// Advance every ready avatar by one frame and write its pose to the transform.
pub fn tick_avatar_controller(
    time: Res<Time>,
    input: Res<AvatarInput>,
    mut avatars: Query<(&mut AvatarController, &mut AvatarMixer, &mut Transform), With<CharacterRoot>>,
) {
    let dt = time.delta_secs();

    for (mut controller, mut mixer, mut transform) in &mut avatars {
        let pose = controller.0.tick(dt, &input.0, &mut mixer.0);
        apply_pose(&pose, &mut transform);
    }
}

/// Copies translation and rotation; scale belongs to the model.
pub fn apply_pose(pose: &Pose, transform: &mut Transform) {
    transform.translation = Vec3::from_array(pose.position.to_array());
    transform.rotation = Quat::from_array(pose.orientation.to_array());
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar::{ClipSet, Controller, InputSnapshot, Mixer};

    #[test]
    fn pose_moves_transform_and_keeps_model_scale() {
        let mut mixer = Mixer::new(ClipSet::from_fn(|_| 1.0));
        let mut controller = Controller::default();
        controller.on_clips_ready(&mut mixer);
        let input = InputSnapshot::IDLE.with_forward(true).with_left(true);
        let pose = controller.tick(0.1, &input, &mut mixer);

        let mut transform = Transform::from_scale(Vec3::splat(0.01));
        apply_pose(&pose, &mut transform);

        assert_eq!(transform.scale, Vec3::splat(0.01));
        assert_eq!(transform.translation.to_array(), pose.position.to_array());
        assert_eq!(transform.rotation.to_array(), pose.orientation.to_array());
        assert!(transform.translation.z > 0.0);
        assert!(transform.rotation != Quat::IDENTITY);
    }
}
