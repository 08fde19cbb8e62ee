//! # GraphQL Fetch
//!
//! A small GraphQL-over-HTTP client. A query and its variables are POSTed as
//! JSON to a configured endpoint, and the decoded body is wrapped in a
//! [`Response`] that keeps `data` and `errors` apart.
//!
//! ## Features
//!
//! - **Bearer auth**: a configured token is sent unless the call sets `Authorization`
//! - **Typed failures**: transport, status and decoding problems are [`GraphQLError::InvalidResponse`]
//! - **GraphQL errors as data**: inspect them with [`Response::has_errors`] or
//!   escalate with [`Response::throw_first_error`]
//! - **Pluggable transport**: anything implementing [`Transport`], reqwest by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphql_fetch::GraphQLClient;
//! use serde_json::Map;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = GraphQLClient::new("https://api.example.com/graphql")?;
//!     client.set_auth_token("secret");
//!
//!     let response = client
//!         .fetch("{ viewer { login } }", Map::new(), Vec::new())
//!         .await?;
//!
//!     response.throw_first_error()?;
//!     println!("Viewer: {:?}", response.first_data());
//!     Ok(())
//! }
//! ```
//!
//! ## Query Builder
//!
//! ```rust,no_run
//! use graphql_fetch::GraphQLClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct GetUserResponse {
//!     user: User,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GraphQLClient::new("https://api.example.com/graphql")?;
//!
//!     let response: GetUserResponse = client
//!         .query("query GetUser($id: ID!) { user(id: $id) { id name } }")
//!         .variable("id", "123")
//!         .header("X-Request-Id", "abc")
//!         .send_as()
//!         .await?;
//!
//!     println!("User: {} ({})", response.user.name, response.user.id);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod transport;

pub use client::GraphQLClient;
pub use config::{GraphQLClientConfig, GraphQLClientConfigBuilder};
pub use error::{BoxError, GraphQLError, INVALID_JSON_MESSAGE, Result};
pub use request::{GraphQLRequest, QueryBuilder};
pub use response::{ErrorLocation, ErrorPath, GraphQLResponseError, PathSegment, Response};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

// Re-export common types
pub use http::{HeaderMap, StatusCode};
pub use serde_json::{Map as JsonMap, Value as JsonValue};
