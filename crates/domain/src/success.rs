//! Mission outcome classification.

use serde::{Deserialize, Serialize};

/// Ordinal outcome of a mission or of one operative's participation.
///
/// `Undetermined` marks a report whose outcome has not been recorded yet;
/// it carries no severity and poisons any aggregate it appears in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuccessState {
    Undetermined,
    Success,
    PartialSuccess,
    Failure,
    Catastrophe,
}

impl SuccessState {
    /// Ordinal severity, best (0) to worst. `None` for `Undetermined`.
    pub fn severity(self) -> Option<u8> {
        match self {
            SuccessState::Undetermined => None,
            SuccessState::Success => Some(0),
            SuccessState::PartialSuccess => Some(1),
            SuccessState::Failure => Some(2),
            SuccessState::Catastrophe => Some(3),
        }
    }

    /// Whether an outcome has been recorded.
    pub fn is_determined(self) -> bool {
        self != SuccessState::Undetermined
    }
}
