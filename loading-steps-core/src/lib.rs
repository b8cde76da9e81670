//! Core state types for loading-steps.

use std::fmt;

mod options;

pub use crate::options::{LoadingOptions, OptionsError};

/// Represents a state transition produced by a transition handler.
///
/// Handlers declared in a `#[transition_table]` block return this type; the
/// generated `transition` function unwraps it with [`Transition::into_state`].
#[derive(Debug)]
pub enum Transition<T> {
    /// Transition to the specified target state.
    To(T),
}

impl<T> Transition<T> {
    /// Creates a new transition to the specified target state.
    #[must_use]
    pub fn to(state: T) -> Self {
        Self::To(state)
    }

    /// Extracts the target state from the transition.
    #[must_use]
    pub fn into_state(self) -> T {
        match self {
            Self::To(state) => state,
        }
    }
}

/// Observable phase of a loading episode.
///
/// The two loading phases let a UI hide its indicator for fast work, and the
/// two done phases let it keep the indicator up briefly after a slow start so
/// it does not flicker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoadingState {
    /// Loading is in progress but the indicator must stay hidden.
    SilentLoading,
    /// Loading is in progress and the indicator is shown.
    Loading,
    /// Every step completed; the indicator is held for the grace period.
    DelayDone,
    /// Every step completed and the grace period elapsed.
    Done,
}

impl LoadingState {
    /// All four states, in progress order.
    pub const ALL: [LoadingState; 4] = [
        LoadingState::SilentLoading,
        LoadingState::Loading,
        LoadingState::DelayDone,
        LoadingState::Done,
    ];

    /// True only for the visible loading phase.
    #[must_use]
    pub fn is_loading(self) -> bool {
        is_loading(self)
    }

    /// True for either loading phase.
    #[must_use]
    pub fn is_reloading(self) -> bool {
        is_reloading(self)
    }

    /// True once the episode is fully done.
    #[must_use]
    pub fn is_done(self) -> bool {
        is_done(self)
    }

    /// Stable name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LoadingState::SilentLoading => "SILENT_LOADING",
            LoadingState::Loading => "LOADING",
            LoadingState::DelayDone => "DELAY_DONE",
            LoadingState::Done => "DONE",
        }
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the loading state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsmEvent {
    /// The silent phase is over; show the indicator.
    StartLoading,
    /// All steps completed and a grace period is configured.
    LoadingFinished,
    /// Go straight to [`LoadingState::Done`].
    SetDone,
    /// Start a new episode.
    Reset,
}

impl FsmEvent {
    /// All four events.
    pub const ALL: [FsmEvent; 4] = [
        FsmEvent::StartLoading,
        FsmEvent::LoadingFinished,
        FsmEvent::SetDone,
        FsmEvent::Reset,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FsmEvent::StartLoading => "START_LOADING",
            FsmEvent::LoadingFinished => "LOADING_FINISHED",
            FsmEvent::SetDone => "SET_DONE",
            FsmEvent::Reset => "RESET",
        }
    }
}

impl fmt::Display for FsmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if the visible loading indicator should be shown.
#[must_use]
pub fn is_loading(state: LoadingState) -> bool {
    state == LoadingState::Loading
}

/// Returns true while any loading phase is active, visible or not.
#[must_use]
pub fn is_reloading(state: LoadingState) -> bool {
    matches!(state, LoadingState::SilentLoading | LoadingState::Loading)
}

/// Returns true once the episode is fully done.
#[must_use]
pub fn is_done(state: LoadingState) -> bool {
    state == LoadingState::Done
}
