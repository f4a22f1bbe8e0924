use super::Operation;

/// Failure of a single remote operation. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {operation} failed: {source}")]
    Http {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned status {status}: {message}")]
    Status {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    Remote { operation: Operation, message: String },

    #[error("could not encode {operation} payload: {source}")]
    Encode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} response is not a result envelope")]
    BadEnvelope { operation: Operation },
}

impl ClientError {
    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Http { operation, .. }
            | ClientError::Status { operation, .. }
            | ClientError::Remote { operation, .. }
            | ClientError::Encode { operation, .. }
            | ClientError::Decode { operation, .. }
            | ClientError::BadEnvelope { operation } => *operation,
        }
    }
}
