use anyhow::Context;
use reqid::configs::{current_environment, load_config};
use reqid::startup::Application;
use reqid::telemetry::tracing_setup;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = current_environment();
    let config = load_config().context("failed to load configuration")?;

    // The guard flushes buffered log lines on drop; keep it for the process lifetime.
    let _guard = tracing_setup(&env, &config.log);

    let app = Application::build(config).await?;
    app.run().await?;

    Ok(())
}
