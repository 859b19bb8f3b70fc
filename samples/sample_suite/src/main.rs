mod config;
mod scenarios;

use ngsild_datasource::LogLevel;
use ngsild_datasource::ngsild::datasource::{DataSource, HealthStatus};

use config::load_secrets;

#[tokio::main]
async fn main() -> Result<(), String> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();

    let secrets = load_secrets()?;
    let settings = secrets.settings();
    settings.validate().map_err(|e| e.to_string())?;

    let source = DataSource::new(settings).with_log_level(LogLevel::Debug);

    let health = source.check_health().await;
    log::info!("Health: {:?} ({})", health.status, health.message);
    if health.status == HealthStatus::Error {
        return Err(health.message);
    }

    scenarios::table::run(&source, &secrets).await?;
    scenarios::worldmap::run(&source, &secrets).await?;

    Ok(())
}
