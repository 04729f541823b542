//! Error types for replica response handling.

use std::net::SocketAddr;

use thiserror::Error;

/// Structured error types for decoding replica responses.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResponseError {
    /// A response body could not be parsed.
    ///
    /// Localized to the one message it names; sibling responses in the same
    /// set are unaffected.
    #[error("failed to decode response from {from}: {source}")]
    Decode {
        from: SocketAddr,
        #[source]
        source: serde_json::Error,
    },
}

impl ResponseError {
    /// Check if this error is a payload decode failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, ResponseError::Decode { .. })
    }

    /// The origin of the message that produced this error.
    pub fn origin(&self) -> SocketAddr {
        match self {
            ResponseError::Decode { from, .. } => *from,
        }
    }
}

// Conversion from ResponseError to the main Error type
impl From<ResponseError> for crate::Error {
    fn from(err: ResponseError) -> Self {
        crate::Error::Response(err)
    }
}
