//! Lifecycle store implementations.

use chrono::Utc;
use homeval_core::RequestLifecycleState;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::snapshot::{LifecycleSnapshot, RequestToken};
use crate::subscription::{
    LifecycleSubscription, TransitionEvent, TransitionFilter, TransitionStream,
};

/// Capacity of the transition broadcast channel.
const TRANSITION_BUFFER: usize = 256;

/// Owner of the request lifecycle.
///
/// Writes are synchronous so that a new submission is observable as
/// `Pending` before its outbound call is even polled.
pub trait LifecycleStore: Send + Sync {
    /// Start a new request: issue the next token and move to `Pending`.
    fn begin(&self) -> RequestToken;

    /// Record the outcome of `token`.
    ///
    /// Returns false, leaving the state untouched, when `token` is no longer
    /// the latest request, when it has already settled, or when `state` is not
    /// a terminal state.
    fn settle(&self, token: RequestToken, state: RequestLifecycleState) -> bool;

    /// Get the current snapshot.
    fn snapshot(&self) -> LifecycleSnapshot;

    /// Observe the latest snapshot.
    fn subscribe(&self) -> LifecycleSubscription;

    /// Observe transitions matching `filter`.
    fn transitions(&self, filter: TransitionFilter) -> TransitionStream;

    /// Get the current state.
    fn current(&self) -> RequestLifecycleState {
        self.snapshot().state
    }

    /// Get the latest token issued.
    fn latest_token(&self) -> RequestToken {
        self.snapshot().token
    }
}

/// In-memory implementation of LifecycleStore.
pub struct InMemoryLifecycleStore {
    /// Latest snapshot, shared with subscribers.
    snapshot: watch::Sender<LifecycleSnapshot>,

    /// Transition history fan-out.
    transitions: broadcast::Sender<TransitionEvent>,
}

impl InMemoryLifecycleStore {
    /// Create a new store in the `Idle` state.
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(LifecycleSnapshot::initial());
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            snapshot,
            transitions,
        }
    }

    /// Number of live latest-value subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.snapshot.receiver_count()
    }
}

fn publish(transitions: &broadcast::Sender<TransitionEvent>, event: TransitionEvent) {
    // No transition observers is fine.
    let _ = transitions.send(event);
}

impl Default for InMemoryLifecycleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn begin(&self) -> RequestToken {
        let now = Utc::now();
        let mut token = RequestToken::NONE;

        // Publishing under the snapshot lock keeps transitions in token order.
        self.snapshot.send_modify(|snapshot| {
            token = snapshot.token.next();
            let from = std::mem::replace(&mut snapshot.state, RequestLifecycleState::Pending);
            snapshot.token = token;
            snapshot.updated_at = now;

            publish(
                &self.transitions,
                TransitionEvent {
                    token,
                    from,
                    to: RequestLifecycleState::Pending,
                    timestamp: now,
                },
            );
        });

        token
    }

    fn settle(&self, token: RequestToken, state: RequestLifecycleState) -> bool {
        if !state.is_settled() {
            debug!(%token, ?state, "refusing non-terminal settlement");
            return false;
        }

        let now = Utc::now();

        let applied = self.snapshot.send_if_modified(|snapshot| {
            if snapshot.token != token || !snapshot.state.is_pending() {
                return false;
            }

            let from = std::mem::replace(&mut snapshot.state, state.clone());
            snapshot.updated_at = now;

            publish(
                &self.transitions,
                TransitionEvent {
                    token,
                    from,
                    to: state.clone(),
                    timestamp: now,
                },
            );
            true
        });

        if !applied {
            debug!(%token, "discarding stale settlement");
        }

        applied
    }

    fn snapshot(&self) -> LifecycleSnapshot {
        self.snapshot.borrow().clone()
    }

    fn subscribe(&self) -> LifecycleSubscription {
        LifecycleSubscription::new(self.snapshot.subscribe())
    }

    fn transitions(&self, filter: TransitionFilter) -> TransitionStream {
        TransitionStream::new(filter, self.transitions.subscribe())
    }
}
