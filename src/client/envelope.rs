//! Response shape normalization.
//!
//! HelixDB answers with a bare object (`{"users": [..]}`) while the gateway
//! API wraps that object in a one-element array (`[{"users": [..]}]`). Both
//! are reduced here to the bare object before any typed decoding happens.

use serde_json::Value;

use super::{ClientError, Operation};

/// Accepts a bare envelope object.
pub fn from_object(operation: Operation, value: Value) -> Result<Value, ClientError> {
    match value {
        Value::Object(map) => {
            if let Some(message) = map.get("error").and_then(Value::as_str) {
                return Err(ClientError::Remote {
                    operation,
                    message: message.to_string(),
                });
            }
            Ok(Value::Object(map))
        }
        Value::Null => Ok(Value::Object(Default::default())),
        _ => Err(ClientError::BadEnvelope { operation }),
    }
}

/// Accepts an array-wrapped envelope, falling back to a bare object.
pub fn from_array(operation: Operation, value: Value) -> Result<Value, ClientError> {
    match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => from_object(operation, first),
            None => Err(ClientError::BadEnvelope { operation }),
        },
        other => from_object(operation, other),
    }
}

/// Pulls a human readable message out of an error body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn both_shapes_normalize_to_the_same_object() {
        let bare = json!({"users": [{"id": "1"}]});
        let wrapped = json!([{"users": [{"id": "1"}]}]);

        let a = from_object(Operation::GetUsers, bare).unwrap();
        let b = from_array(Operation::GetUsers, wrapped).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn error_object_becomes_remote_error() {
        let err = from_array(Operation::CreateUser, json!({"error": "boom"})).unwrap_err();
        match err {
            ClientError::Remote { operation, message } => {
                assert_eq!(operation, Operation::CreateUser);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(
            from_array(Operation::GetPosts, json!([])),
            Err(ClientError::BadEnvelope { .. })
        ));
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(from_object(Operation::GetPosts, json!(42)).is_err());
        assert!(from_object(Operation::GetPosts, json!([{"posts": []}])).is_err());
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        assert_eq!(error_message(r#"{"error": "no such user"}"#), "no such user");
        assert_eq!(error_message("  plain text \n"), "plain text");
    }
}
