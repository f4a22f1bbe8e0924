use async_trait::async_trait;
use serde_json::Value;

use super::{envelope, post_operation, ClientError, Operation, Transport};

/// Talks to the gateway API, which answers with array-wrapped envelopes.
#[derive(Clone)]
pub struct GatewayTransport {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for GatewayTransport {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn call(&self, operation: Operation, payload: Value) -> Result<Value, ClientError> {
        let raw = post_operation(&self.http, &self.base_url, operation, &payload).await?;
        envelope::from_array(operation, raw)
    }
}
