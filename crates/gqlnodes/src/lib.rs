//! Compile annotated Rust types into GraphQL documents.
//!
//! Derive [`GraphQLObject`] on the types describing the shape you want back;
//! [`GraphQLRequest::builder`] compiles the root type into a document,
//! [`Arguments`] inject values at dot paths, and [`Client`] sends the request
//! and unwraps the JSON payload into your type.
//!
//! ```ignore
//! use gqlnodes::{Argument, Arguments, Client, GraphQLObject, GraphQLRequest};
//! use serde::Deserialize;
//!
//! #[derive(GraphQLObject, Deserialize)]
//! #[graphql(property(name = "user", argument(name = "login")))]
//! struct User {
//!     login: String,
//!     name: Option<String>,
//! }
//!
//! let request = GraphQLRequest::builder()
//!     .url("https://api.example.com/graphql")
//!     .request::<User>()
//!     .arguments(Arguments::new("user", [Argument::new("login", "octocat")]))
//!     .build()?;
//! // query { user (login:"octocat") { login name } }
//! let response = Client::new()?.query::<User>(&request).await?;
//! ```

// The derive macros refer to `::gqlnodes::...` paths.
extern crate self as gqlnodes;

pub mod argument;
#[cfg(feature = "blocking")]
pub mod blocking_client;
pub mod builder;
pub mod client;
pub mod error;
pub mod operation;
pub mod property;
pub mod request;
pub mod response;
pub mod schema;

// Re-export key types at crate root for convenience.
pub use argument::{Argument, ArgumentKind, Arguments, InputObject, Value, Variable};
pub use client::{Client, ClientBuilder};
pub use error::{GraphQLError, Location, NodesError};
pub use gqlnodes_derive::{GraphQLObject, GraphQLScalar};
pub use operation::{Method, Operation};
pub use property::Property;
pub use request::{GraphQLRequest, RequestBuilder};
pub use response::GraphQLResponse;
pub use schema::{GraphQLField, GraphQLObject, Scalars};
