//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (shadow service,
//! keypad) that the [`AppService`](super::service::AppService) interprets
//! and acts upon.

use crate::keypad::KeyAction;

use super::events::ToggleSource;
use super::ports::ShadowCommand;

/// Commands that adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Record a toggle instance state.
    SetToggle {
        instance: String,
        state: bool,
        source: ToggleSource,
    },

    /// Flip the climate sensing toggle and report it upstream.
    ToggleSensing,

    PreviousPage,
    NextPage,
}

impl From<ShadowCommand> for AppCommand {
    fn from(cmd: ShadowCommand) -> Self {
        match cmd {
            ShadowCommand::SetToggleState { instance, state } => Self::SetToggle {
                instance,
                state,
                source: ToggleSource::Remote,
            },
        }
    }
}

impl AppCommand {
    /// Command for a key action, `None` for unmapped keys.
    pub fn from_key(action: KeyAction) -> Option<Self> {
        match action {
            KeyAction::PreviousPage => Some(Self::PreviousPage),
            KeyAction::NextPage => Some(Self::NextPage),
            KeyAction::ToggleSensing => Some(Self::ToggleSensing),
            KeyAction::Unmapped(_) => None,
        }
    }
}
