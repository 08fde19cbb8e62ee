//! GraphQL client error types.

use thiserror::Error;

use crate::{GraphQLResponseError, HttpResponse};

/// Result type for GraphQL client operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;

/// Boxed error returned by transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message used when the server answers with something that is not a
/// GraphQL JSON document.
pub const INVALID_JSON_MESSAGE: &str = "The GraphQL Server did not provide a valid JSON response. \
     Please make sure that you have provided the correct URL to a GraphQL Endpoint.";

/// GraphQL client errors.
#[derive(Debug, Error)]
pub enum GraphQLError {
    /// The HTTP exchange failed, returned a non-2xx status, or the body
    /// could not be decoded.
    #[error("{message}")]
    InvalidResponse {
        /// Human readable diagnostic.
        message: String,
        /// The response, when the server answered at all.
        response: Option<Box<HttpResponse>>,
        /// Underlying transport or decoding error.
        #[source]
        source: Option<BoxError>,
    },

    /// An error entry returned inside a successful GraphQL response.
    #[error("{message}")]
    GraphQL {
        /// Formatted message.
        message: String,
        /// The error entry that was escalated.
        error: Box<GraphQLResponseError>,
    },

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response data did not have the expected shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphQLError {
    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            response: None,
            source: None,
        }
    }

    /// Check if this is a transport, status or decoding failure.
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse { .. })
    }

    /// Check if this is a GraphQL error (server-side).
    pub fn is_graphql_error(&self) -> bool {
        matches!(self, Self::GraphQL { .. })
    }

    /// Get the HTTP response attached to an `InvalidResponse`, if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::InvalidResponse { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    /// Get the HTTP status code if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status().as_u16())
    }

    /// Get the escalated GraphQL error entry.
    pub fn graphql_error(&self) -> Option<&GraphQLResponseError> {
        match self {
            Self::GraphQL { error, .. } => Some(error),
            _ => None,
        }
    }
}
