//! Lifecycle observation.
//!
//! Two views are offered: [`LifecycleSubscription`] always yields the latest
//! snapshot and is what a presentation layer renders from, while
//! [`TransitionStream`] delivers every transition in order for observers that
//! need history.

use chrono::{DateTime, Utc};
use homeval_core::{RequestLifecycleState, StateKind};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::warn;

use crate::snapshot::{LifecycleSnapshot, RequestToken};

/// A lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Request the transition belongs to.
    pub token: RequestToken,

    /// State before the transition.
    pub from: RequestLifecycleState,

    /// State after the transition.
    pub to: RequestLifecycleState,

    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

/// Filter for transition streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionFilter {
    /// Target state kinds to deliver.
    pub kinds: Option<Vec<StateKind>>,

    /// Skip transitions of requests older than this token.
    pub since: Option<RequestToken>,
}

impl TransitionFilter {
    /// Only deliver transitions into a settled state.
    pub fn settled() -> Self {
        Self {
            kinds: Some(vec![StateKind::Succeeded, StateKind::Failed]),
            ..Default::default()
        }
    }

    /// Only deliver transitions of `token` and later requests.
    pub fn since(token: RequestToken) -> Self {
        Self {
            since: Some(token),
            ..Default::default()
        }
    }

    /// Check if an event matches this filter.
    pub fn matches(&self, event: &TransitionEvent) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.to.kind()) {
                return false;
            }
        }

        if let Some(since) = self.since {
            if event.token < since {
                return false;
            }
        }

        true
    }
}

/// Ordered stream of transitions matching a filter.
pub struct TransitionStream {
    filter: TransitionFilter,
    receiver: broadcast::Receiver<TransitionEvent>,
}

impl TransitionStream {
    pub(crate) fn new(
        filter: TransitionFilter,
        receiver: broadcast::Receiver<TransitionEvent>,
    ) -> Self {
        Self { filter, receiver }
    }

    /// Wait for the next matching transition. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<TransitionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "transition stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn filter(&self) -> &TransitionFilter {
        &self.filter
    }
}

/// Latest-value view of the lifecycle.
#[derive(Clone)]
pub struct LifecycleSubscription {
    receiver: watch::Receiver<LifecycleSnapshot>,
}

impl LifecycleSubscription {
    pub(crate) fn new(receiver: watch::Receiver<LifecycleSnapshot>) -> Self {
        Self { receiver }
    }

    /// The snapshot as of now.
    pub fn current(&self) -> LifecycleSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait until the lifecycle changes after the last observed snapshot.
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<LifecycleSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the latest request has an outcome.
    pub async fn wait_until_settled(&mut self) -> Option<LifecycleSnapshot> {
        let snapshot = self
            .receiver
            .wait_for(|snapshot| snapshot.state.is_settled())
            .await
            .ok()?;
        Some((*snapshot).clone())
    }
}
