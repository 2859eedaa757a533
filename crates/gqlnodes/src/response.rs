//! Response decoding.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{GraphQLError, NodesError};

/// Statuses at or above this are failures.
const STATUS_CODE_THRESHOLD: u16 = 400;

/// A decoded response: the typed resource plus any GraphQL errors.
///
/// Partial results are kept: `data` and `errors` may both be present.
#[derive(Debug, Clone)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
    pub status: u16,
    pub headers: IndexMap<String, String>,
}

impl<T> GraphQLResponse<T> {
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Raw response envelope.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

/// Turn a received HTTP response into a [`GraphQLResponse`].
///
/// `resource_key` is the synthetic top-level key introduced when the request
/// was compiled; the payload is read from under it, or from the whole `data`
/// object when there is none. Unknown fields in the payload are ignored by
/// serde unless the target type denies them.
pub(crate) fn unwrap_response<T: DeserializeOwned>(
    status: u16,
    reason: Option<&str>,
    headers: IndexMap<String, String>,
    body: &[u8],
    resource_key: Option<&str>,
) -> Result<GraphQLResponse<T>, NodesError> {
    let envelope = serde_json::from_slice::<Envelope>(body);

    if status >= STATUS_CODE_THRESHOLD {
        let message = reason.map(str::to_string);
        return Err(match envelope {
            Ok(envelope) => NodesError::Http {
                status,
                message,
                description: None,
                errors: envelope.errors,
            },
            Err(e) => NodesError::Http {
                status,
                message,
                description: Some(e.to_string()),
                errors: None,
            },
        });
    }

    let envelope = envelope.map_err(|e| NodesError::Protocol {
        status: Some(status),
        description: e.to_string(),
    })?;

    let payload = match (envelope.data, resource_key) {
        (Some(mut data), Some(key)) => data.get_mut(key).map(serde_json::Value::take),
        (data, None) => data,
        (None, Some(_)) => None,
    };

    let data = match payload {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value).map_err(|e| NodesError::Protocol {
            status: Some(status),
            description: format!(
                "Failed to deserialize '{}': {}",
                resource_key.unwrap_or("data"),
                e
            ),
        })?),
    };

    Ok(GraphQLResponse {
        data,
        errors: envelope.errors,
        status,
        headers,
    })
}
