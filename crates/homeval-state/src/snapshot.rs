//! Point-in-time views of the request lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use homeval_core::{RequestLifecycleState, StateKind};
use serde::{Deserialize, Serialize};

/// Identifies one submission. Tokens increase monotonically per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Token of a store that has never started a request.
    pub const NONE: RequestToken = RequestToken(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> RequestToken {
        RequestToken(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The lifecycle state together with the request it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    /// Latest request started, or [`RequestToken::NONE`].
    pub token: RequestToken,

    /// Current state.
    pub state: RequestLifecycleState,

    /// When `state` was last written.
    pub updated_at: DateTime<Utc>,
}

impl LifecycleSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            token: RequestToken::NONE,
            state: RequestLifecycleState::Idle,
            updated_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Returns true if this snapshot shows the settled outcome of `token`.
    pub fn is_settled_for(&self, token: RequestToken) -> bool {
        self.token == token && self.state.is_settled()
    }
}
