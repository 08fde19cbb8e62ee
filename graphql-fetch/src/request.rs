//! GraphQL request payload and per-call builder.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{GraphQLClient, GraphQLError, Response, Result};

/// GraphQL request payload.
///
/// `variables` is always serialized, as `{}` when empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// The GraphQL query or mutation.
    pub query: String,
    /// Operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables for the operation.
    pub variables: Map<String, Value>,
}

impl GraphQLRequest {
    /// Create a new request.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Map::new(),
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set variables.
    pub fn variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }
}

/// Convert a serializable value into a variables object.
pub(crate) fn to_variables<T: Serialize>(variables: T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(variables)
        .map_err(|e| GraphQLError::InvalidRequest(format!("variables not serializable: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(GraphQLError::InvalidRequest(format!(
            "variables must be a JSON object, got {}",
            other
        ))),
    }
}

/// Query builder for a single GraphQL call.
pub struct QueryBuilder<'a> {
    client: &'a GraphQLClient,
    request: GraphQLRequest,
    headers: Vec<(String, String)>,
    error: Option<GraphQLError>,
}

impl<'a> QueryBuilder<'a> {
    /// Create a new query builder.
    pub(crate) fn new(client: &'a GraphQLClient, query: impl Into<String>) -> Self {
        Self {
            client,
            request: GraphQLRequest::new(query),
            headers: Vec::new(),
            error: None,
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.request.operation_name = Some(name.into());
        self
    }

    /// Set variables from any value serializing to a JSON object.
    ///
    /// Errors are reported by [`send`](Self::send).
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        match to_variables(variables) {
            Ok(map) => self.request.variables = map,
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request.variables.insert(name.into(), value.into());
        self
    }

    /// Add a header for this request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Execute the query and return the response envelope.
    pub async fn send(self) -> Result<Response> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.client.execute(self.request, self.headers).await
    }

    /// Execute the query, fail on the first GraphQL error and deserialize the data.
    pub async fn send_as<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.send().await?;
        response.throw_first_error()?;
        response.data_as()
    }
}
