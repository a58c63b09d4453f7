use intake_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    intake_api::telemetry::init_telemetry(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = intake_api::setup::initialize_app(config.clone()).await?;

    intake_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
