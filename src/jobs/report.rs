use crate::client::GraphQlClient;
use crate::config::Config;
use crate::error::Result;
use crate::jobs::sink::LogSink;
use serde_json::{json, Value};
use tracing::{error, info};

const REPORT_QUERY: &str = r#"
query {
  totalCustomers
  totalOrders
  totalRevenue
}"#;

// The revenue scalar arrives as a JSON string; counts arrive as numbers.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fetch the aggregate counts and append a single summary line.
pub async fn run(config: &Config) -> Result<()> {
    let sink = LogSink::new(&config.jobs.report_log);
    let client = GraphQlClient::new(config.api.endpoint.clone(), config.api.retries);

    match client.execute(REPORT_QUERY, json!({})).await {
        Ok(data) => {
            let customers = data["totalCustomers"].as_i64().unwrap_or(0);
            let orders = data["totalOrders"].as_i64().unwrap_or(0);
            let revenue = scalar_to_string(&data["totalRevenue"]);
            sink.append(&format!(
                "Report: {customers} customers, {orders} orders, {revenue} revenue"
            ))?;
            info!("CRM report generated successfully");
        }
        Err(e) => {
            error!("Error generating CRM report: {e}");
            sink.append(&format!("Error: {e}"))?;
        }
    }
    Ok(())
}
