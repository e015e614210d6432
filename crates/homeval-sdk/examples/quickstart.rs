//! Quick Start Example
//!
//! Fill in a property form, submit it to the configured prediction service
//! and print each lifecycle phase.
//!
//! Run a valuation service first (see `homeval-node`), then:
//! `HOMEVAL_ENDPOINT=http://localhost:8000/predict cargo run --example quickstart`

use homeval_sdk::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let controller = PredictionRequestController::from_config(&config)?;

    // 1. Describe the property
    let mut form = PropertyForm::new();
    form.set_numeric_field("area", "6500")?;
    form.increment_field("bedrooms")?;
    form.increment_field("stories")?;
    form.toggle_field("basement")?;
    form.toggle_field("prefarea")?;

    // 2. Watch the lifecycle from a separate task, as a UI would
    let mut subscription = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while let Some(snapshot) = subscription.changed().await {
            match snapshot.state {
                RequestLifecycleState::Idle => {}
                RequestLifecycleState::Pending => println!("⏳ Calculating valuation..."),
                RequestLifecycleState::Succeeded { value } => {
                    println!("✅ Estimated value: ${:.0}", value);
                    break;
                }
                RequestLifecycleState::Failed { message } => {
                    println!("❌ {}", message);
                    break;
                }
            }
        }
    });

    // 3. Submit
    println!("🏠 Submitting {:?}", form.to_payload());
    controller.submit_form(&form).await;

    if let Err(err) = watcher.await {
        tracing::error!(error = %err, "lifecycle watcher failed");
    }
    Ok(())
}
