//! # loading-steps
//!
//! A debounced loading-state machine for multi-step work, built on Tokio
//! timers.
//!
//! A [`LoadingController`] tracks a fixed number of steps and exposes one
//! [`LoadingState`]. Two optional delays keep a loading indicator from
//! flickering: `render_delay` keeps it hidden ([`LoadingState::SilentLoading`])
//! while fast work finishes, and `done_delay` keeps it up
//! ([`LoadingState::DelayDone`]) briefly after the last step.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use loading_steps::{LoadingController, LoadingOptions, LoadingState, is_reloading};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let options = LoadingOptions::new()
//!     .with_render_delay(Duration::from_millis(100))
//!     .with_name("settings");
//! let loading = LoadingController::new(2, false, options);
//! assert_eq!(loading.current_state(), LoadingState::SilentLoading);
//! assert!(is_reloading(loading.current_state()));
//!
//! loading.set_step_done("preferences");
//! loading.set_step_done("account");
//! assert_eq!(loading.current_state(), LoadingState::Done);
//! # }
//! ```

mod clock;
mod controller;
mod fsm;
mod steps;
mod timer;

#[doc(inline)]
pub use crate::clock::{Clock, ManualClock, TokioClock};
#[doc(inline)]
pub use crate::controller::LoadingController;
#[doc(inline)]
pub use crate::fsm::LoadingFsm;
#[doc(inline)]
pub use crate::steps::{Progress, StepOutcome};
#[doc(inline)]
pub use loading_steps_core::*;
#[doc(inline)]
pub use loading_steps_macros::transition_table;
