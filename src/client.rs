use crate::error::{CrmError, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// GraphQL client used by the maintenance jobs.
///
/// Constructed explicitly inside each job's entry point with the endpoint and
/// retry count injected from configuration; there is no process-wide client.
/// Retries are a fixed transport-level count with a short pause between
/// attempts; the external scheduler's next tick is the real retry mechanism.
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    retries: u32,
}

impl GraphQlClient {
    pub fn new(endpoint: String, retries: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            retries,
        }
    }

    /// Execute a GraphQL document and return the `data` object.
    /// GraphQL-level errors in the response are surfaced as `CrmError::Api`.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let body = json!({ "query": query, "variables": variables });
        let mut last_err = CrmError::Api {
            message: "request not attempted".to_string(),
        };
        for attempt in 0..=self.retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(500)).await;
                debug!("Retrying GraphQL request (attempt {attempt})");
            }
            match self.execute_once(&body).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    warn!("GraphQL request failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    async fn execute_once(&self, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response.json().await?;

        if let Some(errors) = payload.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("unknown error")
                            .to_string()
                    })
                    .collect();
                return Err(CrmError::Api {
                    message: messages.join("; "),
                });
            }
        }

        payload
            .get("data")
            .filter(|d| !d.is_null())
            .cloned()
            .ok_or_else(|| CrmError::Api {
                message: "response contained no data".to_string(),
            })
    }
}
