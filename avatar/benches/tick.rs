use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use avatar::{ClipSet, Controller, ControllerConfig, InputSnapshot, Mixer, StateKind};

const TICK: f32 = 1.0 / 60.0;

fn mixer() -> Mixer {
    Mixer::new(ClipSet::from_fn(|kind| match kind {
        StateKind::Idle => 2.0,
        StateKind::Walk => 1.0,
        StateKind::Run => 0.7,
        StateKind::Dance => 3.5,
    }))
}

/// Alternates walking, sprinting, stopping and dancing.
fn input_for(tick: usize) -> InputSnapshot {
    match (tick / 90) % 4 {
        0 => InputSnapshot::IDLE.with_forward(true).with_left(tick % 3 == 0),
        1 => InputSnapshot::IDLE.with_forward(true).with_shift(true),
        2 => InputSnapshot::IDLE,
        _ => InputSnapshot::IDLE.with_space(true),
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_tick");

    for ticks in [60usize, 600, 3600] {
        group.bench_with_input(BenchmarkId::new("scripted", ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                let mut clips = mixer();
                let mut controller = Controller::new(ControllerConfig::default());
                controller.on_clips_ready(&mut clips);
                for tick in 0..ticks {
                    black_box(controller.tick(TICK, &input_for(tick), &mut clips));
                }
                black_box(controller.active_state())
            })
        });
    }

    group.finish();
}

fn bench_state_switch(c: &mut Criterion) {
    c.bench_function("walk_run_switch", |b| {
        let mut clips = mixer();
        let mut controller = Controller::new(ControllerConfig::default());
        controller.on_clips_ready(&mut clips);
        let walk = InputSnapshot::IDLE.with_forward(true);
        let run = walk.with_shift(true);
        let mut sprinting = false;
        b.iter(|| {
            sprinting = !sprinting;
            let input = if sprinting { run } else { walk };
            black_box(controller.tick(TICK, &input, &mut clips))
        })
    });
}

criterion_group!(benches, bench_tick, bench_state_switch);
criterion_main!(benches);
