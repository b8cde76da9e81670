use std::sync::Arc;
use std::time::Duration;

use loading_steps::{LoadingController, LoadingOptions, LoadingState};
use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn test_reset_delay_reenters_silent_loading() {
    let start = Instant::now();
    let options = LoadingOptions::new().with_reset_delay(ms(150));
    let loading = LoadingController::new(2, false, options);
    assert_eq!(loading.current_state(), LoadingState::Loading);

    sleep_until(start + ms(100)).await;
    loading.set_step_done("step1");
    sleep_until(start + ms(200)).await;
    loading.set_step_done("step2");
    assert_eq!(loading.current_state(), LoadingState::Done);

    sleep_until(start + ms(300)).await;
    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    assert_eq!(loading.progress().finished(), 0);
    assert_eq!(loading.pending_timers(), 1);

    sleep_until(start + ms(449)).await;
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);

    sleep_until(start + ms(451)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);

    sleep_until(start + ms(550)).await;
    loading.set_step_done("step1");
    loading.set_step_done("step2");
    assert_eq!(loading.current_state(), LoadingState::Done);
}

#[tokio::test(start_paused = true)]
async fn test_render_and_reset_delay() {
    let start = Instant::now();
    let options = LoadingOptions::new()
        .with_render_delay(ms(100))
        .with_reset_delay(ms(150));
    let loading = LoadingController::new(2, false, options);

    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    sleep_until(start + ms(90)).await;
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    sleep_until(start + ms(101)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);

    sleep_until(start + ms(140)).await;
    loading.set_step_done("step1");
    sleep_until(start + ms(190)).await;
    loading.set_step_done("step2");
    assert_eq!(loading.current_state(), LoadingState::Done);

    sleep_until(start + ms(240)).await;
    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);

    // After a reset the silent phase uses the longer of the two delays.
    sleep_until(start + ms(380)).await;
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    sleep_until(start + ms(391)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);

    sleep_until(start + ms(440)).await;
    loading.set_step_done("step1");
    loading.set_step_done("step2");
    assert_eq!(loading.current_state(), LoadingState::Done);
}

#[tokio::test(start_paused = true)]
async fn test_reset_without_reset_delay_goes_straight_to_loading() {
    let start = Instant::now();
    let options = LoadingOptions::new().with_render_delay(ms(100));
    let loading = LoadingController::new(1, false, options);
    let history = Arc::new(Mutex::new(Vec::new()));
    let sink = history.clone();
    loading.on_transition(move |from, to| sink.lock().push((from, to)));

    sleep_until(start + ms(50)).await;
    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::Loading);
    assert_eq!(loading.pending_timers(), 0);

    // The silent-phase timer armed at creation was cancelled with the reset.
    sleep_until(start + ms(300)).await;
    assert_eq!(
        *history.lock(),
        vec![(LoadingState::SilentLoading, LoadingState::Loading)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_grace_period_timer() {
    let start = Instant::now();
    let options = LoadingOptions::new()
        .with_done_delay(ms(100))
        .with_reset_delay(ms(50));
    let loading = LoadingController::new(1, false, options);

    sleep_until(start + ms(10)).await;
    loading.set_step_done("step1");
    assert_eq!(loading.current_state(), LoadingState::DelayDone);
    assert_eq!(loading.pending_timers(), 1);

    sleep_until(start + ms(20)).await;
    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    assert_eq!(loading.pending_timers(), 1);

    sleep_until(start + ms(71)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);
    assert_eq!(loading.pending_timers(), 0);

    // A stale SetDone at 110ms would have moved Loading to Done.
    sleep_until(start + ms(200)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_silent_phase_does_not_rearm() {
    let start = Instant::now();
    let options = LoadingOptions::new()
        .with_render_delay(ms(100))
        .with_reset_delay(ms(150));
    let loading = LoadingController::new(2, false, options);
    let mut rx = loading.subscribe();
    rx.borrow_and_update();

    sleep_until(start + ms(50)).await;
    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    assert_eq!(loading.pending_timers(), 0);
    assert!(!rx.has_changed().unwrap());

    // SilentLoading was never left, so no new silent-phase timer exists and
    // the one armed at creation was cancelled.
    sleep_until(start + ms(400)).await;
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);

    // The next step is past the 150ms silent phase and catches up.
    loading.set_step_done("step1");
    assert_eq!(loading.current_state(), LoadingState::Loading);
    loading.set_step_done("step2");
    assert_eq!(loading.current_state(), LoadingState::Done);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_resets_leave_no_stale_timers() {
    let options = LoadingOptions::new()
        .with_render_delay(ms(100))
        .with_reset_delay(ms(100));
    let loading = LoadingController::new(3, false, options);
    assert_eq!(loading.pending_timers(), 1);

    for _ in 0..5 {
        loading.set_step_done("a");
        loading.reset_loading();
        assert_eq!(loading.pending_timers(), 0);
    }
    assert_eq!(loading.progress().finished(), 0);
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
}

#[tokio::test(start_paused = true)]
async fn test_reset_from_done_rearms_silent_timer() {
    let start = Instant::now();
    let options = LoadingOptions::new()
        .with_render_delay(ms(100))
        .with_reset_delay(ms(100));
    let loading = LoadingController::new(1, false, options);

    loading.set_step_done("a");
    assert_eq!(loading.current_state(), LoadingState::Done);

    loading.reset_loading();
    assert_eq!(loading.current_state(), LoadingState::SilentLoading);
    assert_eq!(loading.pending_timers(), 1);

    sleep_until(start + ms(101)).await;
    assert_eq!(loading.current_state(), LoadingState::Loading);
}
