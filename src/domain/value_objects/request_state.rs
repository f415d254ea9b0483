//! # Quote Request State
//!
//! Quote request lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Pending → Sent → Collecting → Received
//!    ↓       ↓         ↓           ↓
//!    ├───────┴─────────┴→ Cancelled ┘
//!    ↓       ↓         ↓
//!    └───────┴─────────┴→ Expired
//! ```
//!
//! `Received` is entered once every selected provider has either responded
//! or been marked unreachable. `Expired` is entered when the expiry deadline
//! passes before that point.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::value_objects::request_state::RequestState;
//!
//! let state = RequestState::Sent;
//! assert!(state.can_transition_to(RequestState::Collecting));
//! assert!(!state.can_transition_to(RequestState::Pending));
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote request lifecycle state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RequestState {
    /// Created, not yet dispatched.
    #[default]
    Pending = 0,

    /// Dispatched to the selected providers.
    Sent = 1,

    /// At least one provider has responded.
    Collecting = 2,

    /// Every selected provider is resolved.
    Received = 3,

    /// The expiry deadline passed first (terminal).
    Expired = 4,

    /// Cancelled by the assessor (terminal).
    Cancelled = 5,
}

impl RequestState {
    /// Returns true if this is a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }

    /// Returns true if the request still holds the assessment's parts.
    ///
    /// A `Received` request is active until it is cancelled.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if provider responses are still being accepted.
    #[inline]
    #[must_use]
    pub const fn accepts_responses(&self) -> bool {
        matches!(self, Self::Sent | Self::Collecting)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// - Pending → Sent, Expired, Cancelled
    /// - Sent → Collecting, Received, Expired, Cancelled
    /// - Collecting → Received, Expired, Cancelled
    /// - Received → Cancelled
    /// - Terminal states → (none)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Sent)
                | (Self::Pending, Self::Expired)
                | (Self::Pending, Self::Cancelled)
                | (Self::Sent, Self::Collecting)
                | (Self::Sent, Self::Received)
                | (Self::Sent, Self::Expired)
                | (Self::Sent, Self::Cancelled)
                | (Self::Collecting, Self::Received)
                | (Self::Collecting, Self::Expired)
                | (Self::Collecting, Self::Cancelled)
                | (Self::Received, Self::Cancelled)
        )
    }

    /// Returns the valid next states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Pending => vec![Self::Sent, Self::Expired, Self::Cancelled],
            Self::Sent => vec![
                Self::Collecting,
                Self::Received,
                Self::Expired,
                Self::Cancelled,
            ],
            Self::Collecting => vec![Self::Received, Self::Expired, Self::Cancelled],
            Self::Received => vec![Self::Cancelled],
            Self::Expired | Self::Cancelled => vec![],
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Collecting => "COLLECTING",
            Self::Received => "RECEIVED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RequestState; 6] = [
        RequestState::Pending,
        RequestState::Sent,
        RequestState::Collecting,
        RequestState::Received,
        RequestState::Expired,
        RequestState::Cancelled,
    ];

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    from.valid_transitions().contains(&to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(RequestState::Expired.valid_transitions().is_empty());
        assert!(RequestState::Cancelled.valid_transitions().is_empty());
    }

    #[test]
    fn received_is_active_but_closed_for_responses() {
        assert!(RequestState::Received.is_active());
        assert!(!RequestState::Received.accepts_responses());
        assert!(RequestState::Collecting.accepts_responses());
    }

    #[test]
    fn no_backwards_moves() {
        assert!(!RequestState::Collecting.can_transition_to(RequestState::Sent));
        assert!(!RequestState::Received.can_transition_to(RequestState::Collecting));
        assert!(!RequestState::Received.can_transition_to(RequestState::Expired));
    }

    #[test]
    fn display_is_screaming_case() {
        assert_eq!(RequestState::Collecting.to_string(), "COLLECTING");
    }
}
