//! Async GraphQL client.
//!
//! Sends a [`GraphQLRequest`] to its endpoint and decodes the response.
//! Construct a [`Client`] via [`Client::new`] or [`Client::builder`], then
//! call [`query`](Client::query), [`mutate`](Client::mutate) or
//! [`execute`](Client::execute).

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;

use crate::error::NodesError;
use crate::operation::Method;
use crate::request::GraphQLRequest;
use crate::response::{unwrap_response, GraphQLResponse};

fn default_user_agent() -> String {
    format!("gqlnodes/{}", env!("CARGO_PKG_VERSION"))
}

/// The GraphQL client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// Create a client with default settings.
    pub fn new() -> Result<Self, NodesError> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Send the request as a query, whatever method its root type declares.
    pub async fn query<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.send(request, Some(Method::Query)).await
    }

    /// Send the request as a mutation, whatever method its root type declares.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.send(request, Some(Method::Mutation)).await
    }

    /// Send the request with its own method. Raw documents go out verbatim.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.send(request, request.method()).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
        method: Option<Method>,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        let body = request.body(method)?;
        tracing::debug!(url = %request.url(), query = %body["query"], "sending request");

        let mut builder = self
            .http
            .post(request.url().clone())
            .header(ACCEPT, "application/json")
            .json(&body);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers: IndexMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), len = bytes.len(), "received response");

        unwrap_response(
            status.as_u16(),
            status.canonical_reason(),
            headers,
            &bytes,
            request.resource_key(),
        )
    }
}

/// Configuration for a [`Client`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ClientBuilder {
    timeout: Option<Duration>,
    headers: IndexMap<String, String>,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            headers: IndexMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientBuilder {
    /// Total time allowed for one request, connect to last body byte.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A header sent with every request. Request headers win on conflict.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<Client, NodesError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NodesError::Build(format!("invalid header name '{name}'")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| NodesError::Build(format!("invalid value for header '{name}'")))?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(self.user_agent)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Client {
            http: builder.build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Variable;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn raw(server: &MockServer, document: &str) -> GraphQLRequest {
        GraphQLRequest::builder()
            .url(server.uri())
            .document(document)
            .build()
            .unwrap()
    }

    async fn body_of(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[test]
    fn builder_rejects_bad_header_names() {
        let err = Client::builder().header("bad header", "x").build().unwrap_err();
        assert!(matches!(err, NodesError::Build(_)));
        assert!(err.to_string().contains("bad header"));
    }

    #[tokio::test]
    async fn execute_success_deserializes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"viewer": {"id": "user-123", "name": "Test User"}}
            })))
            .mount(&server)
            .await;

        let client = Client::new().unwrap();
        let response: GraphQLResponse<serde_json::Value> = client
            .execute(&raw(&server, "query { viewer { id name } }"))
            .await
            .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data["viewer"]["id"], "user-123");
        assert_eq!(response.status, 200);
        assert!(response.errors.is_none());
    }

    #[tokio::test]
    async fn posts_query_and_variables_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {}})),
            )
            .mount(&server)
            .await;

        let request = GraphQLRequest::builder()
            .url(server.uri())
            .document("query ($n:Int){ items (first:$n) { id } }")
            .variable(Variable::new("n", 3))
            .build()
            .unwrap();
        let _: GraphQLResponse<serde_json::Value> =
            Client::new().unwrap().execute(&request).await.unwrap();

        let body = body_of(&server).await;
        assert_eq!(body["query"], "query ($n:Int){ items (first:$n) { id } }");
        assert_eq!(body["variables"]["n"], 3);
    }

    #[tokio::test]
    async fn sends_request_and_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer secret"))
            .and(header("X-Client", "tests"))
            .and(header("user-agent", "custom-agent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {}})),
            )
            .mount(&server)
            .await;

        let request = GraphQLRequest::builder()
            .url(server.uri())
            .header("Authorization", "Bearer secret")
            .document("{ a }")
            .build()
            .unwrap();
        let client = Client::builder()
            .header("X-Client", "tests")
            .user_agent("custom-agent")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let result: Result<GraphQLResponse<serde_json::Value>, _> = client.execute(&request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failure_status_carries_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errors": [{"message": "Field 'foo' not found", "locations": [{"line": 1, "column": 9}]}]
            })))
            .mount(&server)
            .await;

        let err = Client::new()
            .unwrap()
            .execute::<serde_json::Value>(&raw(&server, "query { foo }"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.errors().unwrap()[0].message, "Field 'foo' not found");
        assert_eq!(err.to_string(), "HTTP error 400: Bad Request");
    }

    #[tokio::test]
    async fn failure_status_with_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = Client::new()
            .unwrap()
            .execute::<serde_json::Value>(&raw(&server, "query { foo }"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.errors().is_none());
        assert!(err.description().is_some());
    }

    #[tokio::test]
    async fn graphql_errors_with_success_status_are_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": null,
                "errors": [{"message": "Something failed", "extensions": {"classification": "DataFetchingException"}}]
            })))
            .mount(&server)
            .await;

        let response = Client::new()
            .unwrap()
            .execute::<serde_json::Value>(&raw(&server, "query { foo }"))
            .await
            .unwrap();

        assert!(response.data.is_none());
        let errors = response.errors.unwrap();
        assert_eq!(errors[0].classification(), Some("DataFetchingException"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let request = GraphQLRequest::builder()
            .url("http://127.0.0.1:1/graphql")
            .document("{ a }")
            .build()
            .unwrap();
        let err = Client::new()
            .unwrap()
            .execute::<serde_json::Value>(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, NodesError::Transport(_)));
        assert!(err.status().is_none());
        assert!(err.description().is_some());
    }

    #[tokio::test]
    async fn response_headers_are_exposed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("x-request-id", "abc")
                    .set_body_json(serde_json::json!({"data": {}})),
            )
            .mount(&server)
            .await;

        let response = Client::new()
            .unwrap()
            .execute::<serde_json::Value>(&raw(&server, "{ a }"))
            .await
            .unwrap();
        assert_eq!(response.headers.get("x-request-id").map(String::as_str), Some("abc"));
    }
}
