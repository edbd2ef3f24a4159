//! Call lifecycle states.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a call session.
///
/// A session moves strictly forward through
/// `Inactive -> Connecting -> Active -> Finished`, with a single allowed
/// reversion (`Connecting -> Inactive` when dialing is rejected).
/// `Finished` is terminal; a new session must be created to call again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    /// No call has been placed yet (or dialing was rejected).
    Inactive,
    /// A start request was issued; waiting for the engine to confirm.
    Connecting,
    /// The engine confirmed the call; the conversation is live.
    Active,
    /// The call ended. No further transitions occur.
    Finished,
}

impl CallStatus {
    /// Returns true if no further transitions can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns true while a call is being placed or is live.
    ///
    /// Used as the double-dial guard: a new start request is ignored
    /// while this returns true.
    pub fn is_in_call(&self) -> bool {
        matches!(self, Self::Connecting | Self::Active)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Inactive => "INACTIVE",
            Self::Connecting => "CONNECTING",
            Self::Active => "ACTIVE",
            Self::Finished => "FINISHED",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_and_in_call_predicates() {
        assert!(!CallStatus::Inactive.is_in_call());
        assert!(CallStatus::Connecting.is_in_call());
        assert!(CallStatus::Active.is_in_call());
        assert!(!CallStatus::Finished.is_in_call());

        assert!(CallStatus::Finished.is_terminal());
        assert!(!CallStatus::Active.is_terminal());
    }
}
