use std::sync::Arc;

use lilo_client::config::Config;
use lilo_client::http_client::ReqwestLiloClient;
use lilo_client::retry::RetryPolicy;
use lilo_stats::services::StatsService;
use lilo_stats::{Scope, options_from_env_with};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = lilo_stats::init_tracing();
    tracing::info!(%log_env, "lilo_stats: log filter");

    let cfg = Config::from_env()?;
    let options = options_from_env_with(|k| std::env::var(k).ok())?;
    let scope = match std::env::var("LILO_USER_ID") {
        Ok(id) if !id.trim().is_empty() => Scope::User(id.trim().to_string()),
        _ => Scope::Team,
    };

    let client = ReqwestLiloClient::from_config(&cfg);
    let service = StatsService::new(Arc::new(client), RetryPolicy::with_retries(cfg.max_retries));
    tracing::info!(base_url = %cfg.base_url, %scope, "building mood report");

    let report = service.report(&scope, &options).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
