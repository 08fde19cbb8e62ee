//! GraphQL client implementation.

use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::INVALID_JSON_MESSAGE;
use crate::request::GraphQLRequest;
use crate::{
    GraphQLClientConfig, GraphQLError, HttpRequest, HttpResponse, QueryBuilder, ReqwestTransport,
    Response, Result, Transport,
};

/// Longest body excerpt quoted in status errors.
const BODY_EXCERPT_LEN: usize = 120;

/// GraphQL client.
#[derive(Clone)]
pub struct GraphQLClient {
    config: GraphQLClientConfig,
    transport: Arc<dyn Transport>,
}

impl GraphQLClient {
    /// Create a new GraphQL client with the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(GraphQLClientConfig::new(endpoint))
    }

    /// Create a new GraphQL client with custom configuration.
    pub fn with_config(config: GraphQLClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(config: GraphQLClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GraphQLClientConfig {
        &self.config
    }

    /// Set the GraphQL endpoint to query against.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.config.endpoint = url.into();
        self
    }

    /// Set the bearer token used when a request has no `Authorization` header.
    pub fn set_auth_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Stop sending a bearer token.
    pub fn clear_auth_token(&mut self) -> &mut Self {
        self.config.auth_token = None;
        self
    }

    /// Replace the transport used for requests.
    pub fn set_transport(&mut self, transport: impl Transport + 'static) -> &mut Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Create a query builder.
    pub fn query(&self, query: impl Into<String>) -> QueryBuilder<'_> {
        QueryBuilder::new(self, query)
    }

    /// Send a query with its variables and extra headers.
    ///
    /// GraphQL errors in a 2xx body do not fail the call; they are returned
    /// inside the [`Response`].
    pub async fn fetch(
        &self,
        query: impl Into<String>,
        variables: Map<String, Value>,
        headers: Vec<(String, String)>,
    ) -> Result<Response> {
        let request = GraphQLRequest::new(query).variables(variables);
        self.execute(request, headers).await
    }

    /// Execute a single request.
    pub(crate) async fn execute(
        &self,
        request: GraphQLRequest,
        extra_headers: Vec<(String, String)>,
    ) -> Result<Response> {
        let endpoint = self.config.endpoint.clone();
        let headers = self.request_headers(extra_headers)?;
        let body = serde_json::to_vec(&request)?;

        debug!(endpoint = %endpoint, query = %request.query, "Executing GraphQL request");

        let http_request = HttpRequest::new(Method::POST, endpoint.clone(), headers, body.into());
        let http_response = match self.transport.send(http_request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "GraphQL request failed");
                return Err(GraphQLError::InvalidResponse {
                    message: format!(
                        "The GraphQL Server could not be reached (POST {}). {}",
                        endpoint, e
                    ),
                    response: None,
                    source: Some(e),
                });
            }
        };

        debug!(status = %http_response.status(), "Received GraphQL response");

        if !http_response.is_success() {
            warn!(endpoint = %endpoint, status = %http_response.status(), "GraphQL server returned an error status");
            return Err(status_error(&endpoint, http_response));
        }

        let json: Value = match serde_json::from_slice(http_response.body()) {
            Ok(json) => json,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "GraphQL response is not valid JSON");
                return Err(GraphQLError::InvalidResponse {
                    message: INVALID_JSON_MESSAGE.to_string(),
                    response: Some(Box::new(http_response)),
                    source: Some(Box::new(e)),
                });
            }
        };

        if !json.is_object() {
            warn!(endpoint = %endpoint, "GraphQL response is not a JSON object");
            return Err(GraphQLError::InvalidResponse {
                message: INVALID_JSON_MESSAGE.to_string(),
                response: Some(Box::new(http_response)),
                source: None,
            });
        }

        let (_, headers, _) = http_response.into_parts();
        Response::new(json, headers)
    }

    /// Build the header map: content type, default headers, per-call
    /// headers, then the bearer token unless `Authorization` is already set.
    fn request_headers(&self, extra_headers: Vec<(String, String)>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in self
            .config
            .default_headers
            .iter()
            .cloned()
            .chain(extra_headers)
        {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GraphQLError::InvalidRequest(format!("invalid header name `{}`: {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| {
                GraphQLError::InvalidRequest(format!("invalid value for header `{}`: {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }

        if let Some(token) = &self.config.auth_token
            && !token.is_empty()
            && !headers.contains_key(AUTHORIZATION)
        {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                GraphQLError::InvalidRequest(format!("invalid auth token: {}", e))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

/// Build the error for a non-2xx response, keeping the response attached.
///
/// The reason phrase is the canonical one for the status code; codes
/// without one are reported as `Unknown Status`.
fn status_error(endpoint: &str, response: HttpResponse) -> GraphQLError {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    let kind = if status.is_client_error() {
        "Client error"
    } else if status.is_server_error() {
        "Server error"
    } else {
        "Unexpected response"
    };

    let mut message = format!(
        "The GraphQL Server responded with a non-200 HTTP status code ({} {}). {}: POST {} resulted in a {} {} response",
        status.as_u16(),
        reason,
        kind,
        endpoint,
        status.as_u16(),
        reason
    );

    let text = response.text();
    if !text.is_empty() {
        message.push_str(": ");
        message.extend(text.chars().take(BODY_EXCERPT_LEN));
        if text.chars().count() > BODY_EXCERPT_LEN {
            message.push_str(" (truncated...)");
        }
    }

    GraphQLError::InvalidResponse {
        message,
        response: Some(Box::new(response)),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use async_trait::async_trait;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport that records requests and replays a canned outcome.
    #[derive(Clone)]
    struct MockTransport {
        status: Option<StatusCode>,
        body: &'static str,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl MockTransport {
        fn respond(status: StatusCode, body: &'static str) -> Self {
            Self {
                status: Some(status),
                body,
                requests: Arc::default(),
            }
        }

        fn unreachable() -> Self {
            Self {
                status: None,
                body: "",
                requests: Arc::default(),
            }
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
            self.requests.lock().unwrap().push(request);
            match self.status {
                Some(status) => Ok(HttpResponse::new(status, HeaderMap::new(), self.body)),
                None => Err("connection refused".into()),
            }
        }
    }

    fn client(transport: &MockTransport) -> GraphQLClient {
        let config = GraphQLClientConfig::new("http://graphql.test/graphql");
        GraphQLClient::with_transport(config, transport.clone())
    }

    #[test]
    fn test_client_creation() {
        let client = GraphQLClient::new("http://localhost:4000/graphql").unwrap();
        assert_eq!(client.config().endpoint, "http://localhost:4000/graphql");
    }

    #[test]
    fn test_setters_chain() {
        let transport = MockTransport::respond(StatusCode::OK, "{}");
        let mut client = client(&transport);
        client
            .set_url("https://api.example.com/graphql")
            .set_auth_token("token123")
            .set_transport(transport.clone());

        assert_eq!(client.config().endpoint, "https://api.example.com/graphql");
        assert_eq!(client.config().auth_token.as_deref(), Some("token123"));

        client.clear_auth_token();
        assert!(client.config().auth_token.is_none());
    }

    #[tokio::test]
    async fn test_request_body_and_headers() {
        let transport = MockTransport::respond(StatusCode::OK, r#"{"data": {"ok": true}}"#);
        let mut client = client(&transport);
        client.set_auth_token("secret");

        let response = client
            .fetch("{ ok }", Map::new(), vec![("X-Trace".to_string(), "abc".to_string())])
            .await
            .unwrap();
        assert_eq!(response.first_data(), Some(&json!(true)));

        let request = transport.last_request();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url(), "http://graphql.test/graphql");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer secret");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()["x-trace"], "abc");

        let body: Value = serde_json::from_slice(request.body()).unwrap();
        assert_eq!(body, json!({"query": "{ ok }", "variables": {}}));
    }

    #[tokio::test]
    async fn test_explicit_authorization_wins() {
        let transport = MockTransport::respond(StatusCode::OK, "{}");
        let mut client = client(&transport);
        client.set_auth_token("secret");

        client
            .fetch("{ ok }", Map::new(), vec![("authorization".to_string(), "Basic xyz".to_string())])
            .await
            .unwrap();

        let request = transport.last_request();
        let values: Vec<_> = request.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values, vec!["Basic xyz"]);
    }

    #[tokio::test]
    async fn test_no_token_no_authorization() {
        let transport = MockTransport::respond(StatusCode::OK, "{}");
        client(&transport).fetch("{ ok }", Map::new(), Vec::new()).await.unwrap();
        assert!(!transport.last_request().headers().contains_key(AUTHORIZATION));
    }

    #[tokio::test]
    async fn test_status_error_message() {
        let transport = MockTransport::respond(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        assert!(err.is_invalid_response());
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Internal Server Error"));
        assert!(message.contains("oops"));
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.response().unwrap().text(), "oops");
    }

    #[tokio::test]
    async fn test_long_body_is_truncated() {
        let body: &'static str = Box::leak("x".repeat(500).into_boxed_str());
        let transport = MockTransport::respond(StatusCode::BAD_REQUEST, body);
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400 Bad Request"));
        assert!(message.contains("Client error"));
        assert!(message.ends_with(" (truncated...)"));
        assert!(!message.contains(&"x".repeat(BODY_EXCERPT_LEN + 1)));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = MockTransport::unreachable();
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        assert!(err.is_invalid_response());
        assert!(err.response().is_none());
        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let transport = MockTransport::respond(StatusCode::OK, "not json");
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        assert!(err.is_invalid_response());
        assert_eq!(err.to_string(), INVALID_JSON_MESSAGE);
        assert_eq!(err.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_non_object_json_keeps_response() {
        let transport = MockTransport::respond(StatusCode::OK, "[1,2]");
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        assert!(err.is_invalid_response());
        assert_eq!(err.to_string(), INVALID_JSON_MESSAGE);
        assert!(err.response().is_some());
        assert_eq!(err.response().unwrap().text(), "[1,2]");
        assert_eq!(err.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_unusual_error_entries_do_not_fail_fetch() {
        let transport = MockTransport::respond(
            StatusCode::OK,
            r#"{"data": {"a": 1}, "errors": ["boom", {"message": "x", "path": ["a", -1], "category": 5}]}"#,
        );
        let response = client(&transport)
            .fetch("{ a }", Map::new(), Vec::new())
            .await
            .unwrap();

        assert_eq!(response.data(), Some(&json!({"a": 1})));
        assert_eq!(response.errors().len(), 2);
        assert_eq!(response.errors()[1].to_string(), "[a.-1] x");
    }

    #[tokio::test]
    async fn test_non_standard_status_code() {
        let transport = MockTransport::respond(StatusCode::from_u16(599).unwrap(), "");
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("(599 Unknown Status)"));
        assert!(message.contains("Server error"));
        assert!(message.ends_with("resulted in a 599 Unknown Status response"));
        assert_eq!(err.status_code(), Some(599));
    }

    #[tokio::test]
    async fn test_graphql_errors_do_not_fail_fetch() {
        let transport =
            MockTransport::respond(StatusCode::OK, r#"{"data": null, "errors": [{"message": "denied"}]}"#);
        let response = client(&transport)
            .fetch("{ ok }", Map::new(), Vec::new())
            .await
            .unwrap();

        assert!(response.has_errors());
        assert!(response.data().is_none());
    }

    #[tokio::test]
    async fn test_invalid_header_is_rejected() {
        let transport = MockTransport::respond(StatusCode::OK, "{}");
        let err = client(&transport)
            .fetch("{ ok }", Map::new(), vec![("bad header".to_string(), "v".to_string())])
            .await
            .unwrap_err();

        assert!(matches!(err, GraphQLError::InvalidRequest(_)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_builder() {
        let transport = MockTransport::respond(StatusCode::OK, r#"{"data": {"user": {"id": 1}}}"#);
        let client = client(&transport);

        let data: Value = client
            .query("query User($id: ID!) { user(id: $id) { id } }")
            .operation_name("User")
            .variable("id", 1)
            .header("X-Request-Id", "r1")
            .send_as()
            .await
            .unwrap();
        assert_eq!(data, json!({"user": {"id": 1}}));

        let request = transport.last_request();
        assert_eq!(request.headers()["x-request-id"], "r1");
        let body: Value = serde_json::from_slice(request.body()).unwrap();
        assert_eq!(body["operationName"], "User");
        assert_eq!(body["variables"], json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_query_builder_escalates_graphql_errors() {
        let transport =
            MockTransport::respond(StatusCode::OK, r#"{"errors": [{"message": "nope", "category": "auth"}]}"#);
        let err = client(&transport)
            .query("{ me { id } }")
            .send_as::<Value>()
            .await
            .unwrap_err();

        assert!(err.is_graphql_error());
        assert!(err.to_string().ends_with("Error: auth: nope"));
    }

    #[tokio::test]
    async fn test_query_builder_rejects_non_object_variables() {
        let transport = MockTransport::respond(StatusCode::OK, "{}");
        let err = client(&transport)
            .query("{ ok }")
            .variables(vec![1, 2, 3])
            .send()
            .await
            .unwrap_err();

        assert!(matches!(err, GraphQLError::InvalidRequest(_)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }
}
