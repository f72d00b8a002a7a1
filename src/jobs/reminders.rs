use crate::client::GraphQlClient;
use crate::config::Config;
use crate::constants::REMINDER_WINDOW_DAYS;
use crate::error::Result;
use crate::jobs::sink::LogSink;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};

const RECENT_ORDERS_QUERY: &str = r#"
query RecentOrders($fromDate: DateTime!) {
  orders(filter: { orderDateGte: $fromDate }) {
    id
    customer {
      email
    }
  }
}"#;

/// Log a reminder line for every order placed within the trailing window.
/// Pure read plus sink writes; no mutation.
pub async fn run(config: &Config) -> Result<()> {
    let sink = LogSink::new(&config.jobs.reminders_log);
    let client = GraphQlClient::new(config.api.endpoint.clone(), config.api.retries);

    let from_date = Utc::now() - Duration::days(REMINDER_WINDOW_DAYS);
    let variables = json!({ "fromDate": from_date.to_rfc3339() });

    match client.execute(RECENT_ORDERS_QUERY, variables).await {
        Ok(data) => {
            let orders = data["orders"].as_array().cloned().unwrap_or_default();
            for order in &orders {
                let order_id = order["id"].as_str().unwrap_or("unknown");
                let email = order["customer"]["email"].as_str().unwrap_or("unknown");
                sink.append(&format!("Order ID: {order_id}, Email: {email}"))?;
            }
            info!("Logged {} order reminders", orders.len());
            println!("Order reminders processed!");
        }
        Err(e) => {
            error!("Order reminders query failed: {e}");
            sink.append(&format!("Error: {e}"))?;
        }
    }
    Ok(())
}
