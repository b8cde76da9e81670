//! The loading state machine's transition table.

use loading_steps_macros::transition_table;

use crate::{FsmEvent, LoadingOptions, LoadingState, Transition};

/// Pure transition table for one loading controller.
///
/// The table is fixed; the only parameters are the state a fresh machine
/// starts in and the state `Reset` leads to, both derived from the delay
/// configuration at construction.
///
/// | State         | StartLoading | LoadingFinished | SetDone | Reset        |
/// |---------------|--------------|-----------------|---------|--------------|
/// | SilentLoading | Loading      | DelayDone       | Done    | reset target |
/// | Loading       |              | DelayDone       | Done    | reset target |
/// | DelayDone     |              |                 | Done    | reset target |
/// | Done          |              |                 |         | reset target |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingFsm {
    initial: LoadingState,
    reset_target: LoadingState,
}

#[transition_table(state = LoadingState, event = FsmEvent)]
impl LoadingFsm {
    pub fn new(options: &LoadingOptions, initial_loaded: bool) -> Self {
        Self {
            initial: options.initial_state(initial_loaded),
            reset_target: options.reset_target(),
        }
    }

    /// State the machine starts in.
    pub fn initial(&self) -> LoadingState {
        self.initial
    }

    /// State every `Reset` leads to.
    pub fn reset_target(&self) -> LoadingState {
        self.reset_target
    }

    #[on(state = SilentLoading, event = StartLoading)]
    fn start_loading(&self) -> Transition<LoadingState> {
        Transition::to(LoadingState::Loading)
    }

    #[on(state = SilentLoading, event = LoadingFinished)]
    #[on(state = Loading, event = LoadingFinished)]
    fn finish_loading(&self) -> Transition<LoadingState> {
        Transition::to(LoadingState::DelayDone)
    }

    #[on(state = SilentLoading, event = SetDone)]
    #[on(state = Loading, event = SetDone)]
    #[on(state = DelayDone, event = SetDone)]
    fn set_done(&self) -> Transition<LoadingState> {
        Transition::to(LoadingState::Done)
    }

    #[on(state = SilentLoading, event = Reset)]
    #[on(state = Loading, event = Reset)]
    #[on(state = DelayDone, event = Reset)]
    #[on(state = Done, event = Reset)]
    fn reset(&self) -> Transition<LoadingState> {
        Transition::to(self.reset_target)
    }
}
