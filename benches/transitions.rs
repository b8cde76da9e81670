use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use loading_steps::{FsmEvent, LoadingController, LoadingFsm, LoadingOptions, LoadingState};
use tokio::runtime::Runtime;

fn benchmark_transition_table(c: &mut Criterion) {
    let fsm = LoadingFsm::new(
        &LoadingOptions::new().with_reset_delay(Duration::from_millis(150)),
        false,
    );

    c.bench_function("transition_all_pairs", |b| {
        b.iter(|| {
            for state in LoadingState::ALL {
                for event in FsmEvent::ALL {
                    black_box(fsm.transition(black_box(state), black_box(event)));
                }
            }
        })
    });
}

fn benchmark_episode(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let step_names: Vec<String> = (0..100).map(|i| format!("step{i}")).collect();
    let step_names = &step_names;

    c.bench_function("episode_100_steps_with_reset", |b| {
        b.to_async(&rt).iter(|| async move {
            let options = LoadingOptions::new()
                .with_render_delay(Duration::from_secs(60))
                .with_reset_delay(Duration::from_secs(60))
                .with_diagnostics(false);
            let loading = LoadingController::new(step_names.len(), false, options);

            for name in step_names {
                loading.set_step_done(name.as_str());
            }
            loading.reset_loading();
            black_box(loading.current_state());
            loading.shutdown();
        })
    });
}

criterion_group!(benches, benchmark_transition_table, benchmark_episode);
criterion_main!(benches);
