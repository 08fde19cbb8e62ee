//! GraphQL response types.

use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::INVALID_JSON_MESSAGE;
use crate::{GraphQLError, Result};

/// Decoded GraphQL response.
///
/// GraphQL errors in the body are data, not failures: check
/// [`has_errors`](Self::has_errors) or escalate with
/// [`throw_first_error`](Self::throw_first_error).
#[derive(Debug, Clone)]
pub struct Response {
    data: Value,
    errors: Vec<GraphQLResponseError>,
    headers: HeaderMap,
}

impl Response {
    /// Build a response from a decoded JSON body and the HTTP headers.
    ///
    /// The body must be a JSON object. Error entries are decoded leniently
    /// and never reject the body.
    pub fn new(body: Value, headers: HeaderMap) -> Result<Self> {
        let Value::Object(mut fields) = body else {
            return Err(GraphQLError::invalid_response(INVALID_JSON_MESSAGE));
        };

        let data = fields.shift_remove("data").unwrap_or(Value::Null);
        let errors = match fields.shift_remove("errors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .into_iter()
                .map(GraphQLResponseError::from)
                .collect(),
            Some(other) => vec![GraphQLResponseError::from(other)],
        };

        Ok(Self {
            data,
            errors,
            headers,
        })
    }

    /// Get the data, or `None` when the body had no data.
    pub fn data(&self) -> Option<&Value> {
        if self.data.is_null() {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Get the value of the first data field.
    ///
    /// Only defined for non-empty object data; field order is the order of
    /// the response body.
    pub fn first_data(&self) -> Option<&Value> {
        self.data.as_object().and_then(|fields| fields.values().next())
    }

    /// Deserialize the data into `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.data).map_err(|e| GraphQLError::InvalidData(e.to_string()))
    }

    /// Deserialize the first data field into `T`.
    pub fn first_data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let first = self
            .first_data()
            .ok_or_else(|| GraphQLError::InvalidData("Response contained no data".to_string()))?;
        T::deserialize(first).map_err(|e| GraphQLError::InvalidData(e.to_string()))
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get every value received for a header.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get the GraphQL errors.
    pub fn errors(&self) -> &[GraphQLResponseError] {
        &self.errors
    }

    /// Get only the first GraphQL error.
    pub fn first_error(&self) -> Option<&GraphQLResponseError> {
        self.errors.first()
    }

    /// Check if the response has errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Turn the first GraphQL error, if any, into a [`GraphQLError::GraphQL`].
    pub fn throw_first_error(&self) -> Result<()> {
        match self.first_error() {
            Some(error) => Err(GraphQLError::GraphQL {
                message: format!(
                    "A GraphQL Error was returned by the GraphQL Server. Error: {}",
                    Self::error_as_string(error)
                ),
                error: Box::new(error.clone()),
            }),
            None => Ok(()),
        }
    }

    /// Format an error as `[path] category: message`.
    pub fn error_as_string(error: &GraphQLResponseError) -> String {
        error.to_string()
    }

    /// Serialize the data (not the whole response) to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.data)?)
    }

    /// Convert any serializable value into a plain JSON value.
    pub fn force_array<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    /// Get a data field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Get a data field mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.data.get_mut(name)
    }

    /// Set a data field, returning the previous value.
    ///
    /// Absent data becomes an empty object first.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let name = name.into();
        if self.data.is_null() {
            self.data = Value::Object(Map::new());
        }

        match &mut self.data {
            Value::Object(fields) => Ok(fields.insert(name, value.into())),
            other => Err(GraphQLError::InvalidData(format!(
                "cannot set field `{}` on non-object data: {}",
                name, other
            ))),
        }
    }

    /// Check if a data field is present and not null.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    /// Remove a data field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.data
            .as_object_mut()
            .and_then(|fields| fields.shift_remove(name))
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

/// A GraphQL error from the server.
///
/// Decoding accepts any JSON value: fields with an unexpected type are
/// dropped, and a bare string or scalar becomes the message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLResponseError {
    /// Error message.
    pub message: String,
    /// Detailed message, preferred over `message` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_message: Option<String>,
    /// Path to the field that caused the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ErrorPath>,
    /// Error category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Locations in the query where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Additional error extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl From<Value> for GraphQLResponseError {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            Value::String(message) => {
                return Self {
                    message,
                    ..Default::default()
                };
            }
            other => {
                return Self {
                    message: other.to_string(),
                    ..Default::default()
                };
            }
        };

        Self {
            message: take_string(&mut fields, "message").unwrap_or_default(),
            debug_message: take_string(&mut fields, "debugMessage"),
            path: fields
                .shift_remove("path")
                .and_then(|v| serde_json::from_value(v).ok()),
            category: take_string(&mut fields, "category"),
            locations: match fields.shift_remove("locations") {
                Some(Value::Array(entries)) => Some(
                    entries
                        .into_iter()
                        .filter_map(|v| serde_json::from_value(v).ok())
                        .collect(),
                ),
                _ => None,
            },
            extensions: fields.shift_remove("extensions").filter(|v| !v.is_null()),
        }
    }
}

impl<'de> Deserialize<'de> for GraphQLResponseError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.shift_remove(key) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

impl std::fmt::Display for GraphQLResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path
            && !path.is_empty()
        {
            write!(f, "[{}] ", path)?;
        }
        if let Some(category) = &self.category
            && !category.is_empty()
        {
            write!(f, "{}: ", category)?;
        }
        match &self.debug_message {
            Some(debug) if !debug.is_empty() => write!(f, "{}", debug),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Location in the GraphQL query.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// Error path, either preformatted text or a list of segments.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ErrorPath {
    /// Path given as a single string, e.g. `user.id`.
    Text(String),
    /// Path given as field names and list indices.
    Segments(Vec<PathSegment>),
}

impl ErrorPath {
    /// Check if the path has no content.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Segments(segments) => segments.is_empty(),
        }
    }
}

impl std::fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Segments(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", segment)?;
                }
                Ok(())
            }
        }
    }
}

/// Path segment in a GraphQL error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Field name.
    Field(String),
    /// Array index.
    Index(i64),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Index(idx) => write!(f, "{}", idx),
        }
    }
}
