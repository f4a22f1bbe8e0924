//! The gateway API: `POST /{operation}` forwards the body to HelixDB and
//! answers with the result envelope wrapped in a one-element array, the shape
//! the `api` transport expects.

use actix_web::{web, HttpResponse};
use serde_json::Value;

use crate::client::Operation;
use crate::core::errors::ApiError;
use crate::handlers::AppState;

pub async fn forward(
    path: web::Path<String>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let operation: Operation = path
        .into_inner()
        .parse()
        .map_err(ApiError::NotFound)?;

    let payload = parse_body(&body)?;
    tracing::debug!(%operation, "forwarding gateway request");

    let envelope = state.upstream.call(operation, payload).await.map_err(|err| {
        tracing::warn!(%operation, error = %err, "gateway upstream failure");
        ApiError::from(err)
    })?;

    Ok(HttpResponse::Ok().json(vec![envelope]))
}

/// An empty body stands for `{}`; getUsers and getPosts take no input.
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest("Request body must be a JSON object".to_string()));
    }
    Ok(value)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}
