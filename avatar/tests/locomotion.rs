use avatar::{
    ClipSet, Controller, ControllerConfig, InputSnapshot, Mixer, MotionState, StateKind,
};
use glam::{Quat, Vec3};

const EPSILON: f32 = 1e-5;

fn ready_controller(motion: MotionState) -> (Controller, Mixer) {
    let mut clips = Mixer::new(ClipSet::from_fn(|kind| match kind {
        StateKind::Dance => 2.5,
        _ => 1.0,
    }));
    let mut controller = Controller::new(ControllerConfig::default()).with_motion(motion);
    controller.on_clips_ready(&mut clips);
    (controller, clips)
}

fn at_rest() -> (Controller, Mixer) {
    ready_controller(MotionState::default())
}

fn sliding(velocity_z: f32) -> (Controller, Mixer) {
    ready_controller(MotionState {
        velocity: Vec3::new(0.0, 0.0, velocity_z),
        ..MotionState::default()
    })
}

#[test]
fn forward_tick_from_rest_matches_reference_numbers() {
    let (mut controller, mut clips) = at_rest();
    let pose = controller.tick(0.1, &InputSnapshot::IDLE.with_forward(true), &mut clips);

    assert_eq!(controller.active_state(), Some(StateKind::Walk));
    assert!((controller.motion().velocity.z - 0.5).abs() < EPSILON);
    assert!((pose.position.z - 0.05).abs() < EPSILON);
    assert!(pose.position.x.abs() < EPSILON);
    assert_eq!(pose.orientation, Quat::IDENTITY);
}

#[test]
fn released_keys_decay_speed_without_reversing() {
    for start in [3.0, 0.4, -0.4, -3.0] {
        let (mut controller, mut clips) = sliding(start);
        let mut previous = start.abs();
        for tick in 0..600 {
            controller.tick(1.0 / 60.0, &InputSnapshot::IDLE, &mut clips);
            let velocity = controller.motion().velocity.z;
            if previous > 0.0 {
                assert!(
                    velocity.abs() < previous,
                    "tick {tick} from {start}: {} !< {previous}",
                    velocity.abs()
                );
            }
            assert!(velocity == 0.0 || velocity.signum() == start.signum());
            previous = velocity.abs();
        }
        assert_eq!(previous, 0.0);
    }
}

#[test]
fn large_decay_step_clamps_to_standstill() {
    let (mut controller, mut clips) = sliding(0.6);
    controller.tick(0.25, &InputSnapshot::IDLE, &mut clips);
    assert_eq!(controller.motion().velocity.z, 0.0);
}

#[test]
fn sprint_doubles_forward_gain() {
    let (mut walker, mut walk_clips) = at_rest();
    let (mut sprinter, mut sprint_clips) = at_rest();
    let forward = InputSnapshot::IDLE.with_forward(true);

    walker.tick(0.1, &forward, &mut walk_clips);
    sprinter.tick(0.1, &forward.with_shift(true), &mut sprint_clips);

    let walk = walker.motion().velocity.z;
    let sprint = sprinter.motion().velocity.z;
    assert!((sprint - 2.0 * walk).abs() < EPSILON);
}

#[test]
fn sprint_doubles_turn_rate() {
    let (mut walker, mut walk_clips) = at_rest();
    let (mut sprinter, mut sprint_clips) = at_rest();
    let left = InputSnapshot::IDLE.with_left(true);

    walker.tick(0.05, &left, &mut walk_clips);
    sprinter.tick(0.05, &left.with_shift(true), &mut sprint_clips);

    let walk_yaw = walker.motion().yaw();
    let sprint_yaw = sprinter.motion().yaw();
    assert!(walk_yaw > 0.0);
    assert!((sprint_yaw - 2.0 * walk_yaw).abs() < EPSILON);
}

#[test]
fn turning_alone_stays_idle() {
    let (mut controller, mut clips) = at_rest();
    controller.tick(0.1, &InputSnapshot::IDLE.with_right(true), &mut clips);
    assert_eq!(controller.active_state(), Some(StateKind::Idle));
    assert!(controller.motion().yaw() < 0.0);
    assert_eq!(controller.pose().position, Vec3::ZERO);
}

#[test]
fn dancing_avatar_holds_its_pose() {
    let (mut controller, mut clips) = sliding(2.0);
    controller.tick(1.0 / 60.0, &InputSnapshot::IDLE.with_space(true), &mut clips);
    assert_eq!(controller.active_state(), Some(StateKind::Dance));

    let held = controller.pose();
    let everything = InputSnapshot {
        forward: true,
        backward: false,
        left: true,
        right: false,
        space: true,
        shift: true,
    };
    for _ in 0..60 {
        let pose = controller.tick(1.0 / 60.0, &everything, &mut clips);
        assert_eq!(controller.active_state(), Some(StateKind::Dance));
        assert_eq!(pose, held);
        assert_eq!(controller.motion().velocity, Vec3::ZERO);
    }
}

#[test]
fn vertical_velocity_is_never_driven() {
    let (mut controller, mut clips) = at_rest();
    let input = InputSnapshot::IDLE
        .with_forward(true)
        .with_left(true)
        .with_shift(true);
    for _ in 0..90 {
        controller.tick(1.0 / 60.0, &input, &mut clips);
        assert_eq!(controller.motion().velocity.y, 0.0);
        assert_eq!(controller.pose().position.y, 0.0);
    }
}
