//! Per-instance configuration.

use std::time::Duration;

use crate::LoadingState;

/// Error returned when building [`LoadingOptions`] from key/value pairs.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// A delay value could not be parsed as a duration.
    #[error("invalid duration for `{key}`: {value:?}: {source}")]
    InvalidDuration {
        key: String,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    /// A boolean flag was neither `true` nor `false`.
    #[error("invalid flag for `{key}`: {value:?}")]
    InvalidFlag { key: String, value: String },
    /// The key is not a known option.
    #[error("unknown option: {0}")]
    UnknownKey(String),
}

/// Delay configuration for one loading controller.
///
/// Immutable once handed to a controller. All delays default to zero, which
/// behaves exactly like "no delay configured".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOptions {
    /// How long [`LoadingState::SilentLoading`] persists after creation.
    pub render_delay: Duration,
    /// Silent-phase length after a reset; the effective value is
    /// `max(reset_delay, render_delay)`.
    pub reset_delay: Duration,
    /// How long [`LoadingState::DelayDone`] persists before `Done`.
    pub done_delay: Duration,
    /// Tag attached to diagnostics, to tell instances apart.
    pub name: String,
    /// Emit `tracing` diagnostics for this instance.
    pub diagnostics: bool,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            render_delay: Duration::ZERO,
            reset_delay: Duration::ZERO,
            done_delay: Duration::ZERO,
            name: "Loading".to_owned(),
            diagnostics: true,
        }
    }
}

impl LoadingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    #[must_use]
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    #[must_use]
    pub fn with_done_delay(mut self, delay: Duration) -> Self {
        self.done_delay = delay;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Builds options from `key = value` pairs, starting from the defaults.
    ///
    /// Recognized keys are `render_delay`, `reset_delay`, `done_delay`
    /// (humantime durations such as `"150ms"` or `"0s"`), `name`, and
    /// `diagnostics` (`true` / `false`).
    ///
    /// # Example
    ///
    /// ```rust
    /// # use loading_steps_core::LoadingOptions;
    /// # use std::time::Duration;
    /// let options = LoadingOptions::from_pairs([
    ///     ("render_delay", "150ms"),
    ///     ("name", "profile"),
    /// ])
    /// .unwrap();
    /// assert_eq!(options.render_delay, Duration::from_millis(150));
    /// assert_eq!(options.name, "profile");
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
            match key {
                "render_delay" => options.render_delay = parse_delay(key, value)?,
                "reset_delay" => options.reset_delay = parse_delay(key, value)?,
                "done_delay" => options.done_delay = parse_delay(key, value)?,
                "name" => options.name = value.to_owned(),
                "diagnostics" => {
                    options.diagnostics = value.parse().map_err(|_| OptionsError::InvalidFlag {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    })?;
                }
                other => return Err(OptionsError::UnknownKey(other.to_owned())),
            }
        }
        Ok(options)
    }

    /// Silent-phase length used once the first reset has happened.
    #[must_use]
    pub fn silent_delay_after_reset(&self) -> Duration {
        self.reset_delay.max(self.render_delay)
    }

    /// State a reset moves the machine to.
    #[must_use]
    pub fn reset_target(&self) -> LoadingState {
        if self.reset_delay.is_zero() {
            LoadingState::Loading
        } else {
            LoadingState::SilentLoading
        }
    }

    /// State a freshly created machine starts in.
    #[must_use]
    pub fn initial_state(&self, initial_loaded: bool) -> LoadingState {
        if initial_loaded {
            LoadingState::Done
        } else if self.render_delay.is_zero() {
            LoadingState::Loading
        } else {
            LoadingState::SilentLoading
        }
    }
}

fn parse_delay(key: &str, value: &str) -> Result<Duration, OptionsError> {
    // A bare zero means "no delay" and carries no unit.
    if value == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(value).map_err(|source| OptionsError::InvalidDuration {
        key: key.to_owned(),
        value: value.to_owned(),
        source,
    })
}
