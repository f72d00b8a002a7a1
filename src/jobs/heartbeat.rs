use crate::client::GraphQlClient;
use crate::config::Config;
use crate::error::Result;
use crate::jobs::sink::LogSink;
use serde_json::json;
use tracing::{info, warn};

const PROBE_QUERY: &str = "{ hello }";

/// Append a liveness line to the heartbeat sink, then probe the GraphQL
/// endpoint. The probe result is logged but never affects the heartbeat
/// write.
pub async fn run(config: &Config) -> Result<()> {
    let sink = LogSink::new(&config.jobs.heartbeat_log);
    sink.append("CRM is alive")?;

    let client = GraphQlClient::new(config.api.endpoint.clone(), config.api.retries);
    match client.execute(PROBE_QUERY, json!({})).await {
        Ok(data) => {
            info!("GraphQL endpoint responded: {data}");
            println!("GraphQL endpoint responded: {data}");
        }
        Err(e) => {
            warn!("GraphQL check failed: {e}");
            println!("GraphQL check failed: {e}");
        }
    }
    Ok(())
}
