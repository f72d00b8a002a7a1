use crate::client::GraphQlClient;
use crate::config::Config;
use crate::error::Result;
use crate::jobs::sink::LogSink;
use serde_json::json;
use tracing::{error, info};

const RESTOCK_MUTATION: &str = r#"
mutation {
  updateLowStockProducts {
    success
    message
    products {
      name
      stock
    }
  }
}"#;

/// Invoke the restock mutation and log the outcome. Threshold and restock
/// amount are server-side policy; this job only triggers and records.
pub async fn run(config: &Config) -> Result<()> {
    let sink = LogSink::new(&config.jobs.restock_log);
    let client = GraphQlClient::new(config.api.endpoint.clone(), config.api.retries);

    match client.execute(RESTOCK_MUTATION, json!({})).await {
        Ok(data) => {
            let payload = &data["updateLowStockProducts"];
            let message = payload["message"].as_str().unwrap_or("no message");
            sink.append(message)?;
            if let Some(products) = payload["products"].as_array() {
                for product in products {
                    let name = product["name"].as_str().unwrap_or("unknown");
                    let stock = product["stock"].as_i64().unwrap_or(0);
                    sink.append(&format!("Restocked {name} (stock: {stock})"))?;
                }
                info!("Restock finished: {} products updated", products.len());
            }
        }
        Err(e) => {
            error!("Restock mutation failed: {e}");
            sink.append(&format!("Error: {e}"))?;
        }
    }
    Ok(())
}
