use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gridscape::animation::{FrameAnimator, TimerQueue};
use gridscape::scene::SceneBuilder;
use gridscape::Options;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn frame_step_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_step");

    for (name, options) in
        [("classic", Options::classic()), ("enhanced", Options::enhanced())]
    {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scene = SceneBuilder::new(&options).build(&mut rng);
        let timers = TimerQueue::new();
        let mut animator = FrameAnimator::new(&options, timers.clone(), rng);
        let mut t = 0.0_f32;

        group.bench_function(name, |b| {
            b.iter(|| {
                t += 1.0 / 60.0;
                animator.step(black_box(&mut scene), t);
                timers.clear();
            });
        });
    }
    group.finish();
}

fn scene_build_benchmark(c: &mut Criterion) {
    let options = Options::enhanced();
    c.bench_function("scene_build_enhanced", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            black_box(SceneBuilder::new(&options).build(&mut rng))
        });
    });
}

criterion_group!(benches, frame_step_benchmark, scene_build_benchmark);
criterion_main!(benches);
