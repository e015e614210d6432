use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use homeval_core::{
    BooleanField, HomevalError, PropertyForm, RequestLifecycleState, Result, StateKind,
};
use homeval_sdk::{PredictionRequestController, Settlement, Transport, FAILURE_MESSAGE};
use homeval_state::TransitionFilter;
use serde_json::{json, Value};
use tokio::sync::oneshot;

const TARGET: &str = "http://valuation.test/predict";

/// Transport whose responses are released by the test, keyed by payload area.
#[derive(Default)]
struct GatedTransport {
    gates: Mutex<HashMap<u64, oneshot::Receiver<Result<Value>>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl GatedTransport {
    fn gate(&self, area: u64) -> oneshot::Sender<Result<Value>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(area, rx);
        tx
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn post_json(&self, target: &str, body: &Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((target.to_string(), body.clone()));

        let area = body["area"].as_f64().unwrap_or_default() as u64;
        let gate = self.gates.lock().unwrap().remove(&area);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(HomevalError::Transport("gate dropped".into()))),
            None => Err(HomevalError::Transport(format!("no response for area {area}"))),
        }
    }
}

/// Transport that always answers the same way.
struct FixedTransport(Result<Value>);

#[async_trait]
impl Transport for FixedTransport {
    async fn post_json(&self, _target: &str, _body: &Value) -> Result<Value> {
        self.0.clone()
    }
}

/// Transport that panics mid-call.
struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn post_json(&self, _target: &str, _body: &Value) -> Result<Value> {
        panic!("transport bug");
    }
}

fn fixed(response: Result<Value>) -> PredictionRequestController {
    PredictionRequestController::new(Arc::new(FixedTransport(response)), TARGET)
}

fn form_with_area(area: u64) -> PropertyForm {
    let mut form = PropertyForm::new();
    assert!(form
        .set_numeric_field("area", &area.to_string())
        .unwrap());
    form
}

fn failed() -> RequestLifecycleState {
    RequestLifecycleState::Failed {
        message: FAILURE_MESSAGE.to_string(),
    }
}

#[tokio::test]
async fn starts_idle() {
    let controller = fixed(Ok(json!({})));

    assert_eq!(controller.state(), RequestLifecycleState::Idle);
    assert_eq!(controller.target(), TARGET);
}

#[tokio::test]
async fn submit_is_pending_before_the_call_settles() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let release = transport.gate(4000);

    let pending = controller.submit_form(&PropertyForm::new());

    // Not yet polled, yet already pending.
    assert_eq!(controller.state(), RequestLifecycleState::Pending);

    let handle = tokio::spawn(pending);
    tokio::task::yield_now().await;
    assert!(controller.state().is_pending());

    release
        .send(Ok(json!({ "prediction_price": 4800000 })))
        .unwrap();
    let settlement = handle.await.unwrap();

    assert_eq!(
        settlement.state(),
        Some(&RequestLifecycleState::Succeeded { value: 4_800_000.0 })
    );
    assert_eq!(controller.state().prediction(), Some(4_800_000.0));
}

#[tokio::test]
async fn well_formed_response_succeeds() {
    let controller = fixed(Ok(json!({
        "prediction_price": 4800000,
        "details": "Prediction successful"
    })));

    let settlement = controller.submit_form(&PropertyForm::new()).await;

    assert!(matches!(settlement, Settlement::Applied { .. }));
    assert_eq!(
        controller.state(),
        RequestLifecycleState::Succeeded { value: 4_800_000.0 }
    );
}

#[tokio::test]
async fn non_success_status_fails_with_generic_message() {
    let controller = fixed(Err(HomevalError::TransportStatus {
        status: 500,
        body: r#"{"detail":"model exploded"}"#.into(),
    }));

    controller.submit_form(&PropertyForm::new()).await;

    assert_eq!(controller.state(), failed());
    assert!(!controller.state().failure().unwrap().contains("exploded"));
}

#[tokio::test]
async fn connection_error_fails_with_generic_message() {
    let controller = fixed(Err(HomevalError::Transport(
        "error sending request: connection refused".into(),
    )));

    let settlement = controller.submit_form(&PropertyForm::new()).await;

    assert_eq!(settlement.state(), Some(&failed()));
    assert_eq!(controller.state(), failed());
}

#[tokio::test]
async fn malformed_response_never_succeeds() {
    for body in [
        json!({ "foo": "bar" }),
        json!({ "prediction_price": null }),
        json!({ "prediction_price": "4800000" }),
        json!([]),
    ] {
        let controller = fixed(Ok(body.clone()));

        controller.submit_form(&PropertyForm::new()).await;

        assert_eq!(controller.state(), failed(), "{body}");
        assert_eq!(controller.state().prediction(), None);
    }
}

#[tokio::test]
async fn unparseable_body_fails() {
    let controller = fixed(Err(HomevalError::MalformedResponse(
        "expected value at line 1 column 1".into(),
    )));

    controller.submit_form(&PropertyForm::new()).await;

    assert_eq!(controller.state().kind(), StateKind::Failed);
}

#[tokio::test]
async fn payload_reaches_transport() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let release = transport.gate(4000);

    let mut form = PropertyForm::new();
    form.toggle(BooleanField::Basement);
    form.toggle(BooleanField::Mainroad);

    let handle = tokio::spawn(controller.submit_form(&form));
    release.send(Ok(json!({ "prediction_price": 1.0 }))).unwrap();
    handle.await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, TARGET);
    assert_eq!(
        requests[0].1,
        json!({
            "area": 4000.0,
            "bedrooms": 3,
            "bathrooms": 2,
            "stories": 2,
            "parking": 1,
            "mainroad": 0,
            "basement": 1,
            "hotwaterheating": 0,
            "airconditioning": 1,
            "prefarea": 0
        })
    );
}

#[tokio::test]
async fn later_submission_wins_when_earlier_response_arrives_last() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let first_release = transport.gate(1000);
    let second_release = transport.gate(2000);

    let first = tokio::spawn(controller.submit_form(&form_with_area(1000)));
    let second = tokio::spawn(controller.submit_form(&form_with_area(2000)));

    second_release
        .send(Ok(json!({ "prediction_price": 2000000 })))
        .unwrap();
    let second = second.await.unwrap();

    first_release
        .send(Ok(json!({ "prediction_price": 1000000 })))
        .unwrap();
    let first = first.await.unwrap();

    assert_eq!(first, Settlement::Superseded { token: first.token() });
    assert!(matches!(second, Settlement::Applied { .. }));
    assert!(second.token() > first.token());
    assert_eq!(
        controller.state(),
        RequestLifecycleState::Succeeded { value: 2_000_000.0 }
    );
}

#[tokio::test]
async fn earlier_response_arriving_first_is_discarded() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let first_release = transport.gate(1000);
    let second_release = transport.gate(2000);

    let first = tokio::spawn(controller.submit_form(&form_with_area(1000)));
    let second = tokio::spawn(controller.submit_form(&form_with_area(2000)));

    first_release
        .send(Err(HomevalError::Transport("timed out".into())))
        .unwrap();
    assert!(matches!(first.await.unwrap(), Settlement::Superseded { .. }));

    // The stale failure is not surfaced.
    assert!(controller.state().is_pending());

    second_release
        .send(Ok(json!({ "prediction_price": 2500000 })))
        .unwrap();
    second.await.unwrap();

    assert_eq!(controller.state().prediction(), Some(2_500_000.0));
}

#[tokio::test]
async fn resubmission_clears_previous_outcome() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);

    transport
        .gate(4000)
        .send(Err(HomevalError::Transport("refused".into())))
        .unwrap();
    controller.submit_form(&PropertyForm::new()).await;
    assert_eq!(controller.state(), failed());

    let release = transport.gate(4000);
    let pending = controller.submit_form(&PropertyForm::new());
    assert_eq!(controller.state(), RequestLifecycleState::Pending);
    assert_eq!(controller.state().failure(), None);

    release.send(Ok(json!({ "prediction_price": 3.5 }))).unwrap();
    pending.await;
    assert_eq!(controller.state().prediction(), Some(3.5));
}

#[tokio::test]
async fn observers_see_each_phase() {
    let controller = fixed(Ok(json!({ "prediction_price": 99 })));
    let mut subscription = controller.subscribe();
    let mut transitions = controller.transitions(TransitionFilter::default());

    let pending = controller.submit_form(&PropertyForm::new());
    let snapshot = subscription.changed().await.unwrap();
    assert!(snapshot.state.is_pending());

    pending.await;
    let settled = subscription.wait_until_settled().await.unwrap();
    assert_eq!(settled.state.prediction(), Some(99.0));

    let kinds = [
        transitions.next().await.unwrap().to.kind(),
        transitions.next().await.unwrap().to.kind(),
    ];
    assert_eq!(kinds, [StateKind::Pending, StateKind::Succeeded]);
}

#[tokio::test]
async fn dropped_handle_still_settles() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let mut subscription = controller.subscribe();
    let release = transport.gate(4000);

    drop(controller.submit_form(&PropertyForm::new()));
    assert!(controller.state().is_pending());

    release
        .send(Ok(json!({ "prediction_price": 4800000 })))
        .unwrap();
    let settled = tokio::time::timeout(Duration::from_secs(1), subscription.wait_until_settled())
        .await
        .expect("request settled")
        .unwrap();

    assert_eq!(settled.state.prediction(), Some(4_800_000.0));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn abandoned_wait_does_not_leave_pending() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);
    let mut subscription = controller.subscribe();
    let release = transport.gate(4000);

    let waited = tokio::time::timeout(
        Duration::from_millis(50),
        controller.submit_form(&PropertyForm::new()),
    )
    .await;
    assert!(waited.is_err());
    assert!(controller.state().is_pending());
    assert_eq!(transport.requests().len(), 1);

    release
        .send(Err(HomevalError::Transport("refused".into())))
        .unwrap();
    let settled = tokio::time::timeout(Duration::from_secs(1), subscription.wait_until_settled())
        .await
        .expect("request settled")
        .unwrap();

    assert_eq!(settled.state, failed());
}

#[tokio::test]
async fn panicking_transport_fails_the_request() {
    let controller = PredictionRequestController::new(Arc::new(PanickingTransport), TARGET);

    let settlement = controller.submit_form(&PropertyForm::new()).await;

    assert_eq!(settlement.state(), Some(&failed()));
    assert_eq!(controller.state(), failed());
}

#[tokio::test]
async fn panicking_transport_with_dropped_handle_fails_the_request() {
    let controller = PredictionRequestController::new(Arc::new(PanickingTransport), TARGET);
    let mut subscription = controller.subscribe();

    drop(controller.submit_form(&PropertyForm::new()));

    let settled = tokio::time::timeout(Duration::from_secs(1), subscription.wait_until_settled())
        .await
        .expect("request settled")
        .unwrap();
    assert_eq!(settled.state, failed());
}

#[tokio::test]
async fn unencodable_payload_fails_without_a_call() {
    let transport = Arc::new(GatedTransport::default());
    let controller = PredictionRequestController::new(transport.clone(), TARGET);

    let mut payload = PropertyForm::new().to_payload();
    payload.area = f64::NAN;
    let settlement = controller.submit(payload).await;

    assert_eq!(settlement.state(), Some(&failed()));
    assert!(transport.requests().is_empty());
}
