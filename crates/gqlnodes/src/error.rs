//! Error types for gqlnodes.
//!
//! [`NodesError`] is the single failure channel: request construction,
//! dot-path injection, document rendering, HTTP transport and response
//! decoding all report through it. Whatever the cause, callers can read a
//! message, an optional HTTP status, an optional free-text description and
//! an optional list of structured [`GraphQLError`]s.

use serde::{Deserialize, Deserializer, Serialize};

/// Line/column position of a GraphQL error in the sent document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A single GraphQL error from the API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// Servers may send `"locations": null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl GraphQLError {
    /// Error classification tag reported by the server, if any.
    ///
    /// Reads `extensions.classification`, falling back to `extensions.code`.
    pub fn classification(&self) -> Option<&str> {
        let extensions = self.extensions.as_ref()?;
        extensions
            .get("classification")
            .or_else(|| extensions.get("code"))
            .and_then(|v| v.as_str())
    }
}

/// Errors that can occur while building, sending or decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum NodesError {
    /// The request configuration is incomplete or inconsistent.
    #[error("{0}")]
    Build(String),
    /// The configured endpoint is not a valid URL.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// A dot path did not resolve to a property.
    #[error("'{path}' is an invalid property path")]
    InvalidPath { path: String },
    /// The property at the dot path declares no arguments.
    #[error(
        "Path '{path}' is not expecting any arguments, please declare an argument, arguments or \
         property attribute on the field you are expecting arguments for"
    )]
    ArgumentsNotSupported { path: String },
    /// The argument key was not declared on the property.
    #[error("Argument '{argument}' doesn't exist on path '{path}'")]
    UnknownArgument { argument: String, path: String },
    /// A declared argument value does not parse as its declared kind.
    #[error("Argument '{argument}' has value '{value}' which is not a valid {kind}")]
    TypeCoercion {
        argument: String,
        value: String,
        kind: String,
    },
    /// The type graph refers back to a type that is still being walked.
    #[error("Cyclic schema: {cycle}; mark the back reference with `ignore` or `scalar`")]
    CyclicSchema { cycle: String },
    /// Network or HTTP transport error (no response was received).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx HTTP response.
    #[error("HTTP error {status}: {}", .message.as_deref().unwrap_or("no status message"))]
    Http {
        status: u16,
        message: Option<String>,
        description: Option<String>,
        errors: Option<Vec<GraphQLError>>,
    },
    /// The response body could not be decoded.
    #[error("Protocol error: {description}")]
    Protocol {
        status: Option<u16>,
        description: String,
    },
    /// Internal error (e.g. runtime creation failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NodesError {
    /// Human-readable message, the same text as `Display`.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Protocol { status, .. } => *status,
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Free-text description of the underlying cause.
    pub fn description(&self) -> Option<String> {
        match self {
            Self::Http { description, .. } => description.clone(),
            Self::Protocol { description, .. } => Some(description.clone()),
            Self::Transport(e) => Some(e.to_string()),
            Self::InvalidUrl { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }

    /// Structured GraphQL errors parsed from the response body.
    pub fn errors(&self) -> Option<&[GraphQLError]> {
        match self {
            Self::Http { errors, .. } => errors.as_deref(),
            _ => None,
        }
    }
}
