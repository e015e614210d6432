//! Prediction request lifecycle controller.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use homeval_core::{
    extract_prediction_price, PredictionPayload, PropertyForm, RequestLifecycleState, Result,
};
use homeval_state::{
    InMemoryLifecycleStore, LifecycleSnapshot, LifecycleStore, LifecycleSubscription,
    RequestToken, TransitionFilter, TransitionStream,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::transport::{HttpTransport, Transport};

/// User-facing message for every failed prediction.
pub const FAILURE_MESSAGE: &str =
    "Could not connect to the prediction API. Please ensure the backend is running.";

/// What became of a submission once its response arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The outcome was recorded as the current state.
    Applied {
        token: RequestToken,
        state: RequestLifecycleState,
    },
    /// A later submission had started; the outcome was discarded.
    Superseded { token: RequestToken },
}

impl Settlement {
    pub fn token(&self) -> RequestToken {
        match self {
            Settlement::Applied { token, .. } | Settlement::Superseded { token } => *token,
        }
    }

    /// The recorded state, unless superseded.
    pub fn state(&self) -> Option<&RequestLifecycleState> {
        match self {
            Settlement::Applied { state, .. } => Some(state),
            Settlement::Superseded { .. } => None,
        }
    }
}

/// Drives the `Idle -> Pending -> Succeeded | Failed` lifecycle of prediction
/// requests.
///
/// Overlapping submissions are allowed. Every submission takes a fresh
/// [`RequestToken`] and only the most recently started one may settle the
/// state; earlier responses are dropped whenever they arrive.
#[derive(Clone)]
pub struct PredictionRequestController {
    transport: Arc<dyn Transport>,
    target: String,
    store: Arc<dyn LifecycleStore>,
}

impl PredictionRequestController {
    /// Create a controller posting to `target` through `transport`.
    pub fn new(transport: Arc<dyn Transport>, target: impl Into<String>) -> Self {
        Self::with_store(transport, target, Arc::new(InMemoryLifecycleStore::new()))
    }

    /// Create a controller that records into an existing store.
    pub fn with_store(
        transport: Arc<dyn Transport>,
        target: impl Into<String>,
        store: Arc<dyn LifecycleStore>,
    ) -> Self {
        Self {
            transport,
            target: target.into(),
            store,
        }
    }

    /// Create an HTTP-backed controller from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config.target()?))
    }

    /// Submit a prediction request.
    ///
    /// The state is `Pending` by the time this returns, and the call is
    /// already running on the tokio runtime, so it must be invoked from within
    /// one. The returned future only waits for the outcome: dropping it, or
    /// abandoning it after a timeout, does not stop the request from settling.
    /// It never fails: every error becomes `Failed` with [`FAILURE_MESSAGE`].
    pub fn submit(&self, payload: PredictionPayload) -> BoxFuture<'static, Settlement> {
        let token = self.store.begin();
        let request_id = Uuid::new_v4();
        info!(%token, %request_id, target = %self.target, "submitting prediction request");

        let transport = self.transport.clone();
        let store = self.store.clone();
        let target = self.target.clone();

        let call = tokio::spawn(async move {
            let guard = PendingGuard::new(store.clone(), token);
            let outcome = request_price(transport.as_ref(), &target, &payload).await;
            guard.disarm();

            let (state, cause) = match outcome {
                Ok(value) => (RequestLifecycleState::Succeeded { value }, None),
                Err(err) => (failed(), Some(err)),
            };

            if !store.settle(token, state.clone()) {
                debug!(%token, %request_id, cause = ?cause, "discarding superseded prediction response");
                return Settlement::Superseded { token };
            }

            match cause {
                Some(err) => warn!(%token, %request_id, error = %err, "prediction request failed"),
                None => info!(%token, %request_id, price = ?state.prediction(), "prediction received"),
            }

            Settlement::Applied { token, state }
        });

        let store = self.store.clone();
        async move {
            match call.await {
                Ok(settlement) => settlement,
                Err(err) => {
                    error!(%token, %request_id, error = %err, "prediction task aborted");
                    // The guard has already settled the token if it was still current.
                    let snapshot = store.snapshot();
                    if snapshot.token == token {
                        Settlement::Applied {
                            token,
                            state: snapshot.state,
                        }
                    } else {
                        Settlement::Superseded { token }
                    }
                }
            }
        }
        .boxed()
    }

    /// Submit the current contents of `form`.
    pub fn submit_form(&self, form: &PropertyForm) -> BoxFuture<'static, Settlement> {
        self.submit(form.to_payload())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RequestLifecycleState {
        self.store.current()
    }

    /// Current state with its request token.
    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.store.snapshot()
    }

    /// Observe the latest state.
    pub fn subscribe(&self) -> LifecycleSubscription {
        self.store.subscribe()
    }

    /// Observe transitions matching `filter`.
    pub fn transitions(&self, filter: TransitionFilter) -> TransitionStream {
        self.store.transitions(filter)
    }

    /// Resolved request URL.
    pub fn target(&self) -> &str {
        &self.target
    }
}

async fn request_price(
    transport: &dyn Transport,
    target: &str,
    payload: &PredictionPayload,
) -> Result<f64> {
    let body = payload.to_value()?;
    let response = transport.post_json(target, &body).await?;
    extract_prediction_price(&response)
}

fn failed() -> RequestLifecycleState {
    RequestLifecycleState::Failed {
        message: FAILURE_MESSAGE.to_string(),
    }
}

/// Settles `token` as failed if the call is torn down before it completes.
struct PendingGuard {
    store: Arc<dyn LifecycleStore>,
    token: RequestToken,
    armed: bool,
}

impl PendingGuard {
    fn new(store: Arc<dyn LifecycleStore>, token: RequestToken) -> Self {
        Self {
            store,
            token,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.armed && self.store.settle(self.token, failed()) {
            warn!(token = %self.token, "prediction call ended without a response");
        }
    }
}
