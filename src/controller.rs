//! Step tracking and timer orchestration around [`LoadingFsm`].

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::clock::{Clock, TokioClock};
use crate::fsm::LoadingFsm;
use crate::steps::{Progress, StepOutcome, StepTracker};
use crate::timer::{TimerSet, TimerTicket};
use crate::{FsmEvent, LoadingOptions, LoadingState};

type Observer = Arc<dyn Fn(LoadingState, LoadingState) + Send + Sync>;

/// Emits a `tracing` debug event tagged with the instance name and the time
/// since the episode started, unless diagnostics are off for the instance.
macro_rules! diag {
    ($inner:expr, $($arg:tt)+) => {
        if $inner.options.diagnostics {
            tracing::debug!(
                name = %$inner.options.name,
                elapsed_ms = $inner.elapsed().as_millis() as u64,
                $($arg)+
            );
        }
    };
}

/// Drives one loading indicator through a multi-step episode.
///
/// The controller owns a [`LoadingFsm`], the set of finished steps, and the
/// two auto-advance timers: the silent-phase timer (`SilentLoading` →
/// `Loading`) and the grace-period timer (`DelayDone` → `Done`). Every
/// operation is infallible; misuse such as re-marking a step or marking steps
/// after completion is ignored.
///
/// Clones share the same episode.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use loading_steps::{LoadingController, LoadingOptions, LoadingState};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let options = LoadingOptions::new().with_done_delay(Duration::from_millis(150));
/// let loading = LoadingController::new(2, false, options);
/// assert_eq!(loading.current_state(), LoadingState::Loading);
///
/// loading.set_step_done("profile");
/// loading.skip_step("avatar");
/// assert_eq!(loading.current_state(), LoadingState::DelayDone);
///
/// loading.wait_for_state(LoadingState::Done).await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct LoadingController {
    shared: Arc<Shared>,
}

struct Shared {
    weak: Weak<Shared>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<LoadingState>,
}

struct Inner {
    fsm: LoadingFsm,
    options: LoadingOptions,
    clock: Arc<dyn Clock>,
    state: LoadingState,
    /// State whose entry effects last ran. A transition back to the same
    /// value, including a `Reset`, does not run them again.
    entered: Option<LoadingState>,
    steps: StepTracker,
    timers: TimerSet,
    cycle_start: Instant,
    silent_delay: Duration,
    observers: Vec<Observer>,
    /// Changes not yet handed to observers, oldest first.
    undelivered: VecDeque<(LoadingState, LoadingState)>,
    /// Set while some thread is draining `undelivered`.
    delivering: bool,
    closed: bool,
}

type Changes = Vec<(LoadingState, LoadingState)>;

impl LoadingController {
    /// Creates a controller for an episode of `total_steps` steps.
    ///
    /// # Panics
    ///
    /// Timers need a Tokio runtime. Outside one the controller still works,
    /// but nothing is armed: the silent phase only ends through the catch-up
    /// check of a later step, and `DelayDone` is held until a reset.
    pub fn new(total_steps: usize, initial_loaded: bool, options: LoadingOptions) -> Self {
        Self::with_clock(total_steps, initial_loaded, options, TokioClock)
    }

    /// Like [`LoadingController::new`], reading time from `clock`.
    ///
    /// Timers are spawned on the runtime current at this call, if any.
    pub fn with_clock(
        total_steps: usize,
        initial_loaded: bool,
        options: LoadingOptions,
        clock: impl Clock,
    ) -> Self {
        let fsm = LoadingFsm::new(&options, initial_loaded);
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let initial = fsm.initial();

        let inner = Inner {
            fsm,
            silent_delay: options.render_delay,
            cycle_start: clock.now(),
            clock,
            options,
            state: initial,
            entered: None,
            steps: StepTracker::new(total_steps),
            timers: TimerSet::new(Handle::try_current().ok()),
            observers: Vec::new(),
            undelivered: VecDeque::new(),
            delivering: false,
            closed: false,
        };

        let (state_tx, _) = watch::channel(initial);
        let shared = Arc::new_cyclic(|weak| Shared {
            weak: weak.clone(),
            inner: Mutex::new(inner),
            state_tx,
        });

        shared.mutate(|shared, inner, changes| {
            diag!(inner, state = %initial, total_steps, "[init]");
            if let Some(event) = shared.enter(inner) {
                shared.dispatch(inner, event, changes);
            }
        });

        Self { shared }
    }

    /// The current state.
    pub fn current_state(&self) -> LoadingState {
        self.shared.inner.lock().state
    }

    /// Marks `step` as done.
    pub fn set_step_done(&self, step: impl Into<String>) {
        self.shared.add_step(step.into(), StepOutcome::Done);
    }

    /// Marks `step` as skipped. Counts toward completion like a done step.
    pub fn skip_step(&self, step: impl Into<String>) {
        self.shared.add_step(step.into(), StepOutcome::Skipped);
    }

    /// Starts a new episode in place.
    ///
    /// Forgets every finished step, cancels every pending timer and sends
    /// `Reset`. From now on the silent phase lasts
    /// `max(reset_delay, render_delay)`.
    pub fn reset_loading(&self) {
        self.shared.mutate(|shared, inner, changes| {
            if inner.closed {
                return;
            }
            inner.steps.clear();
            inner.cycle_start = inner.clock.now();
            inner.silent_delay = inner.options.silent_delay_after_reset();

            let cancelled = inner.timers.cancel_all();
            diag!(
                inner,
                delay_ms = inner.silent_delay.as_millis() as u64,
                target = %inner.fsm.reset_target(),
                cancelled,
                "[reset]"
            );

            shared.dispatch(inner, FsmEvent::Reset, changes);
        });
    }

    /// Cancels every pending timer and turns all later operations into
    /// no-ops. The state stays where it is.
    pub fn shutdown(&self) {
        self.shared.mutate(|_, inner, _| {
            if inner.closed {
                return;
            }
            inner.closed = true;
            let cancelled = inner.timers.cancel_all();
            diag!(inner, cancelled, "[shutdown]");
        });
    }

    /// Registers `observer`, called with `(from, to)` once per effective
    /// state change, in order.
    ///
    /// Observers run after the controller's lock is released, so they may call
    /// back into the controller. Changes made by other threads while an
    /// observer runs are queued and delivered afterwards by the thread already
    /// delivering, so every observer sees one ordered history.
    ///
    /// An observer that panics stops delivery for the rest of the controller's
    /// life.
    pub fn on_transition<F>(&self, observer: F)
    where
        F: Fn(LoadingState, LoadingState) + Send + Sync + 'static,
    {
        self.shared.inner.lock().observers.push(Arc::new(observer));
    }

    /// Returns a receiver that always holds the latest state.
    ///
    /// Intermediate states passed through within a single operation are
    /// coalesced; use [`LoadingController::on_transition`] to see every step.
    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.shared.state_tx.subscribe()
    }

    /// Waits for the controller to reach `target`.
    pub async fn wait_for_state(
        &self,
        target: LoadingState,
    ) -> Result<(), watch::error::RecvError> {
        let mut rx = self.subscribe();
        while *rx.borrow_and_update() != target {
            rx.changed().await?;
        }
        Ok(())
    }

    /// Number of auto-advance timers armed and not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.shared.inner.lock().timers.len()
    }

    pub fn progress(&self) -> Progress {
        self.shared.inner.lock().steps.progress()
    }

    pub fn total_steps(&self) -> usize {
        self.shared.inner.lock().steps.total()
    }

    pub fn name(&self) -> String {
        self.shared.inner.lock().options.name.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.current_state().is_loading()
    }

    pub fn is_reloading(&self) -> bool {
        self.current_state().is_reloading()
    }

    pub fn is_done(&self) -> bool {
        self.current_state().is_done()
    }
}

impl std::fmt::Debug for LoadingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("LoadingController")
            .field("name", &inner.options.name)
            .field("state", &inner.state)
            .field("progress", &inner.steps.progress())
            .field("pending_timers", &inner.timers.len())
            .finish()
    }
}

impl Shared {
    /// Runs `f` as one critical section, then publishes the resulting state
    /// and notifies observers outside the lock.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&Self, &mut Inner, &mut Changes),
    {
        let mut changes = Changes::new();
        let mut inner = self.inner.lock();
        f(self, &mut *inner, &mut changes);

        let state = inner.state;
        self.state_tx.send_if_modified(|current| {
            let modified = *current != state;
            *current = state;
            modified
        });

        inner.undelivered.extend(changes);
        if inner.delivering {
            return;
        }
        Self::deliver(&mut inner);
    }

    /// Hands queued changes to observers in the order they were made. Only
    /// one caller delivers at a time; the others just queue.
    fn deliver(inner: &mut MutexGuard<'_, Inner>) {
        inner.delivering = true;
        while !inner.undelivered.is_empty() {
            let batch: Vec<_> = inner.undelivered.drain(..).collect();
            let observers = inner.observers.clone();
            MutexGuard::unlocked(inner, || {
                for (from, to) in batch {
                    for observer in &observers {
                        observer(from, to);
                    }
                }
            });
        }
        inner.delivering = false;
    }

    fn add_step(&self, step: String, outcome: StepOutcome) {
        self.mutate(|shared, inner, changes| {
            if inner.closed || inner.steps.is_finished() {
                return;
            }
            inner.steps.insert(step.clone(), outcome);
            diag!(
                inner,
                step = %step,
                finished = inner.steps.len(),
                total = inner.steps.total(),
                "[step] {}",
                outcome.as_str()
            );

            // The silent-phase timer may not have run yet even though its
            // delay has already passed; catch up before judging completion.
            if inner.elapsed() > inner.silent_delay {
                shared.dispatch(inner, FsmEvent::StartLoading, changes);
            }

            if inner.steps.is_finished() {
                let event = if inner.options.done_delay.is_zero() {
                    FsmEvent::SetDone
                } else {
                    FsmEvent::LoadingFinished
                };
                shared.dispatch(inner, event, changes);
            }
        });
    }

    /// Feeds `event` to the machine, running entry effects for every state
    /// produced. Zero-delay effects are fed back in immediately.
    fn dispatch(&self, inner: &mut Inner, event: FsmEvent, changes: &mut Changes) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let from = inner.state;
            let to = inner.fsm.transition(from, event);
            if to != from {
                inner.state = to;
                changes.push((from, to));
                diag!(inner, event = %event, "[transition] {} -> {}", from, to);
            }
            if let Some(follow_up) = self.enter(inner) {
                queue.push_back(follow_up);
            }
        }
    }

    /// Runs the entry effect of the current state once per entry. Returns the
    /// follow-up event when the effect's delay is zero.
    fn enter(&self, inner: &mut Inner) -> Option<FsmEvent> {
        let state = inner.state;
        if inner.entered == Some(state) {
            return None;
        }
        inner.entered = Some(state);

        let (delay, event) = match state {
            LoadingState::SilentLoading => (inner.silent_delay, FsmEvent::StartLoading),
            LoadingState::DelayDone => (inner.options.done_delay, FsmEvent::SetDone),
            LoadingState::Loading | LoadingState::Done => return None,
        };

        if delay.is_zero() {
            return Some(event);
        }

        let weak = self.weak.clone();
        let armed = inner.timers.schedule(delay, move |ticket| {
            if let Some(shared) = weak.upgrade() {
                shared.fire(ticket, event);
            }
        });
        if armed.is_some() {
            diag!(inner, delay_ms = delay.as_millis() as u64, event = %event, "[timer] armed");
        } else if inner.options.diagnostics {
            tracing::warn!(
                name = %inner.options.name,
                event = %event,
                "[timer] no Tokio runtime, timer not armed"
            );
        }
        None
    }

    fn fire(&self, ticket: TimerTicket, event: FsmEvent) {
        self.mutate(|shared, inner, changes| {
            if !inner.timers.complete(ticket) {
                diag!(inner, event = %event, "[timer] discarded cancelled timer");
                return;
            }
            diag!(inner, event = %event, "[timer] fired");
            shared.dispatch(inner, event, changes);
        });
    }
}

impl Inner {
    fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.cycle_start)
    }
}
