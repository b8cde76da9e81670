//! Attribute parsing for the transition table macro.

use darling::FromMeta;
use syn::{Ident, Path};

/// Arguments for the `#[transition_table(state = .., event = ..)]` attribute.
#[derive(Debug, FromMeta)]
pub struct TableArgs {
    /// Enum holding the machine's states.
    pub state: Path,
    /// Enum holding the machine's events.
    pub event: Path,
}

/// Arguments for the `#[on(state = SilentLoading, event = Reset)]` attribute.
#[derive(Debug, Clone, FromMeta)]
pub struct OnAttr {
    /// Source state this handler is valid in.
    pub state: Ident,
    /// Event that triggers this handler.
    pub event: Ident,
}
