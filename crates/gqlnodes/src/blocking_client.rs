//! Blocking (synchronous) GraphQL client.
//!
//! This module provides a synchronous wrapper around the async [`Client`](crate::Client).
//! Enable it with the `blocking` feature flag:
//!
//! ```toml
//! [dependencies]
//! gqlnodes = { version = "...", features = ["blocking"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gqlnodes::blocking_client::Client;
//! use gqlnodes::GraphQLRequest;
//!
//! let request = GraphQLRequest::builder()
//!     .url("https://api.example.com/graphql")
//!     .document("query { viewer { login } }")
//!     .build()
//!     .unwrap();
//! let client = Client::new().unwrap();
//! let response = client.execute::<serde_json::Value>(&request).unwrap();
//! println!("{:?}", response.data);
//! ```

use serde::de::DeserializeOwned;

use crate::client::ClientBuilder;
use crate::error::NodesError;
use crate::request::GraphQLRequest;
use crate::response::GraphQLResponse;

/// A synchronous GraphQL client.
///
/// Wraps the async [`crate::Client`] with an internal current-thread tokio
/// runtime. Every method blocks the calling thread until the response is
/// decoded.
pub struct Client {
    inner: crate::Client,
    rt: tokio::runtime::Runtime,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking_client::Client")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new() -> Result<Self, NodesError> {
        Self::from_builder(crate::Client::builder())
    }

    /// Create a blocking client from an async client configuration.
    pub fn from_builder(builder: ClientBuilder) -> Result<Self, NodesError> {
        Ok(Self {
            inner: builder.build()?,
            rt: build_runtime()?,
        })
    }

    /// Blocking equivalent of [`crate::Client::query`].
    pub fn query<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.rt.block_on(self.inner.query(request))
    }

    /// Blocking equivalent of [`crate::Client::mutate`].
    pub fn mutate<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.rt.block_on(self.inner.mutate(request))
    }

    /// Blocking equivalent of [`crate::Client::execute`].
    pub fn execute<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>, NodesError> {
        self.rt.block_on(self.inner.execute(request))
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime, NodesError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NodesError::Internal(format!("Failed to create tokio runtime: {}", e)))
}
