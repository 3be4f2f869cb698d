use std::fmt;

use serde::{Deserialize, Serialize};

use crate::change::SdpType;
use crate::ValidationError;

/// JSEP signaling state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalingState {
    /// No offer/answer exchange in progress. This is the initial state.
    #[default]
    Stable,
    /// A local offer has been applied.
    HaveLocalOffer,
    /// A remote offer has been applied.
    HaveRemoteOffer,
    /// A remote offer and a local provisional answer have been applied.
    HaveLocalPranswer,
    /// A local offer and a remote provisional answer have been applied.
    HaveRemotePranswer,
    /// The connection is closed. This is terminal.
    Closed,
}

/// Which side a description is applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Local,
    Remote,
}

impl SignalingState {
    /// Whether there is a remote offer to answer.
    pub fn has_remote_offer(&self) -> bool {
        matches!(
            self,
            SignalingState::HaveRemoteOffer | SignalingState::HaveLocalPranswer
        )
    }

    /// The state after applying a description of `typ` for `side`.
    pub(crate) fn apply(self, side: Side, typ: SdpType) -> Result<SignalingState, ValidationError> {
        use SdpType::*;
        use Side::*;
        use SignalingState::*;

        if self == Closed {
            return Err(ValidationError::Closed);
        }

        let next = match (side, typ, self) {
            (Local, Offer, Stable | HaveLocalOffer) => HaveLocalOffer,
            (Local, Answer, HaveRemoteOffer | HaveLocalPranswer) => Stable,
            (Local, Pranswer, HaveRemoteOffer | HaveLocalPranswer) => HaveLocalPranswer,
            (Local, Rollback, HaveLocalOffer) => Stable,

            (Remote, Offer, Stable | HaveRemoteOffer) => HaveRemoteOffer,
            (Remote, Answer, HaveLocalOffer | HaveRemotePranswer) => Stable,
            (Remote, Pranswer, HaveLocalOffer | HaveRemotePranswer) => HaveRemotePranswer,
            (Remote, Rollback, HaveRemoteOffer) => Stable,

            (_, Rollback, state) => return Err(ValidationError::RollbackNotAllowed(state)),

            (side, typ, state) => {
                return Err(ValidationError::InvalidState {
                    op: side.op_name(typ),
                    state,
                })
            }
        };

        Ok(next)
    }
}

impl Side {
    fn op_name(&self, typ: SdpType) -> &'static str {
        use SdpType::*;
        match (self, typ) {
            (Side::Local, Offer) => "set local offer",
            (Side::Local, Pranswer) => "set local pranswer",
            (Side::Local, Answer) => "set local answer",
            (Side::Local, Rollback) => "set local rollback",
            (Side::Remote, Offer) => "set remote offer",
            (Side::Remote, Pranswer) => "set remote pranswer",
            (Side::Remote, Answer) => "set remote answer",
            (Side::Remote, Rollback) => "set remote rollback",
        }
    }
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SignalingState::Stable => "stable",
            SignalingState::HaveLocalOffer => "have-local-offer",
            SignalingState::HaveRemoteOffer => "have-remote-offer",
            SignalingState::HaveLocalPranswer => "have-local-pranswer",
            SignalingState::HaveRemotePranswer => "have-remote-pranswer",
            SignalingState::Closed => "closed",
        };
        write!(f, "{x}")
    }
}
