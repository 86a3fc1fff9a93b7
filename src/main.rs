mod telemetry;

use std::error::Error;

use api::AppConfig;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: real deployments inject the environment directly.
    let dotenv = dotenvy::dotenv();

    telemetry::init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => warn!(error = %e, "failed to load .env"),
    }

    let config = AppConfig::from_env().inspect_err(|e| {
        error!(error = %e, "invalid configuration");
    })?;

    api::start(config).await?;

    Ok(())
}
