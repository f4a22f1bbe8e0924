use async_trait::async_trait;
use serde_json::Value;

use super::{envelope, post_operation, ClientError, Operation, Transport};

/// Talks to the HelixDB HTTP endpoint, one `POST /{operation}` per query.
#[derive(Clone)]
pub struct DirectTransport {
    http: reqwest::Client,
    base_url: String,
}

impl DirectTransport {
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
impl Transport for DirectTransport {
    fn name(&self) -> &'static str {
        "sdk"
    }

    async fn call(&self, operation: Operation, payload: Value) -> Result<Value, ClientError> {
        let raw = post_operation(&self.http, &self.base_url, operation, &payload).await?;
        envelope::from_object(operation, raw)
    }
}
