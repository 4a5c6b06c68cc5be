//! Checkout status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where a checkout submission currently stands.
///
/// `Idle -> Processing -> Success`, back to `Idle` on re-entry. `Error` is
/// reserved for a payment failure path; the simulated processor never
/// produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl CheckoutStatus {
    /// Whether a new submission may start from this state.
    ///
    /// Only an in-flight submission blocks; a finished one is re-entered.
    #[must_use]
    pub const fn accepts_submission(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_blocks_submission() {
        assert!(CheckoutStatus::Idle.accepts_submission());
        assert!(CheckoutStatus::Error.accepts_submission());
        assert!(CheckoutStatus::Success.accepts_submission());
        assert!(!CheckoutStatus::Processing.accepts_submission());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&CheckoutStatus::Processing).ok().as_deref(),
            Some("\"PROCESSING\"")
        );
    }
}
