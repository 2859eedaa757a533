//! Request construction.
//!
//! A [`GraphQLRequest`] is built once through [`RequestBuilder`]: the root
//! type is compiled into an [`Operation`], argument overrides are injected by
//! dot path, and the document is rendered lazily when the request is sent.

use std::fmt;

use indexmap::IndexMap;
use url::Url;

use crate::argument::{Argument, Arguments, Variable};
use crate::builder::{Compiled, TreeBuilder};
use crate::error::NodesError;
use crate::operation::{Method, Operation};
use crate::schema::{GraphQLObject, Scalars};

type Compile = fn(&Scalars) -> Result<Compiled, NodesError>;

fn compile<T: GraphQLObject>(scalars: &Scalars) -> Result<Compiled, NodesError> {
    TreeBuilder::new(scalars).build::<T>()
}

#[derive(Debug, Clone)]
enum Document {
    /// A document supplied as text, sent verbatim.
    Raw(String),
    Compiled(Compiled),
}

/// A compiled request, ready to be sent by a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct GraphQLRequest {
    url: Url,
    headers: IndexMap<String, String>,
    variables: IndexMap<String, serde_json::Value>,
    scalars: Scalars,
    document: Document,
}

impl GraphQLRequest {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Runtime variable bindings sent alongside the document.
    pub fn variables(&self) -> &IndexMap<String, serde_json::Value> {
        &self.variables
    }

    pub fn scalars(&self) -> &Scalars {
        &self.scalars
    }

    /// The compiled operation, or `None` for a raw document.
    pub fn operation(&self) -> Option<&Operation> {
        match &self.document {
            Document::Compiled(compiled) => Some(&compiled.operation),
            Document::Raw(_) => None,
        }
    }

    /// Key under `data` that holds the resource in the response.
    pub fn resource_key(&self) -> Option<&str> {
        match &self.document {
            Document::Compiled(compiled) => compiled.resource_key.as_deref(),
            Document::Raw(_) => None,
        }
    }

    /// The operation's own method. Raw documents carry none.
    pub fn method(&self) -> Option<Method> {
        self.operation().and_then(Operation::method)
    }

    /// The document text with the request's own method.
    pub fn document(&self) -> Result<String, NodesError> {
        self.document_as(self.method())
    }

    /// The document text with `method` as the operation keyword.
    ///
    /// Raw documents are returned verbatim whatever the method.
    pub fn document_as(&self, method: Option<Method>) -> Result<String, NodesError> {
        match &self.document {
            Document::Raw(text) => Ok(text.clone()),
            Document::Compiled(compiled) => compiled.operation.render_as(method),
        }
    }

    /// Overwrite declared argument values at `path`.
    pub fn set_arguments(&mut self, path: &str, arguments: &[Argument]) -> Result<(), NodesError> {
        match &mut self.document {
            Document::Compiled(compiled) => compiled.operation.set_arguments(path, arguments),
            Document::Raw(_) => Err(NodesError::InvalidPath {
                path: path.to_string(),
            }),
        }
    }

    /// JSON body posted to the endpoint.
    pub(crate) fn body(&self, method: Option<Method>) -> Result<serde_json::Value, NodesError> {
        Ok(serde_json::json!({
            "query": self.document_as(method)?,
            "variables": self.variables,
        }))
    }
}

impl fmt::Display for GraphQLRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.document() {
            Ok(document) => write!(f, "GraphQLRequest{{request='{document}', url='{}'}}", self.url),
            Err(e) => write!(f, "GraphQLRequest{{error='{e}', url='{}'}}", self.url),
        }
    }
}

/// Builder for [`GraphQLRequest`].
///
/// ```ignore
/// let request = GraphQLRequest::builder()
///     .url("https://api.example.com/graphql")
///     .header("Authorization", "Bearer token")
///     .request::<User>()
///     .arguments(Arguments::new("user", [Argument::new("login", "octocat")]))
///     .build()?;
/// ```
#[derive(Default)]
#[must_use]
pub struct RequestBuilder {
    url: Option<String>,
    headers: IndexMap<String, String>,
    document: Option<String>,
    root: Option<Compile>,
    arguments: Vec<Arguments>,
    variables: Vec<Variable>,
    scalars: Scalars,
    method: Option<Method>,
}

impl RequestBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Compile the document from the root type `T`.
    pub fn request<T: GraphQLObject>(mut self) -> Self {
        self.root = Some(compile::<T>);
        self
    }

    /// Send `document` verbatim. Takes precedence over [`request`](Self::request).
    pub fn document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Inject argument values once the tree is built. Applied in call order.
    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.arguments.push(arguments);
        self
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Treat `T` as a leaf when building the tree.
    pub fn scalar<T: ?Sized + 'static>(mut self) -> Self {
        self.scalars.insert::<T>();
        self
    }

    /// Override the operation method declared on the root type.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn build(self) -> Result<GraphQLRequest, NodesError> {
        let raw_url = self
            .url
            .ok_or_else(|| NodesError::Build("url must be set".to_string()))?;
        let url = Url::parse(&raw_url).map_err(|source| NodesError::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;

        let document = match (self.document, self.root) {
            (Some(text), _) => Document::Raw(text),
            (None, Some(compile)) => {
                let mut compiled = compile(&self.scalars)?;
                if let Some(method) = self.method {
                    compiled.operation.set_method(Some(method));
                }
                Document::Compiled(compiled)
            }
            (None, None) => return Err(NodesError::Build("request must be set".to_string())),
        };

        let variables = self.variables.into_iter().map(Variable::into_parts).collect();

        let mut request = GraphQLRequest {
            url,
            headers: self.headers,
            variables,
            scalars: self.scalars,
            document,
        };

        for arguments in &self.arguments {
            request.set_arguments(arguments.path(), arguments.arguments())?;
        }

        if let Ok(text) = request.document() {
            tracing::debug!(url = %request.url, document = %text, "built request");
        }
        Ok(request)
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("document", &self.document)
            .field("root", &self.root.is_some())
            .field("arguments", &self.arguments)
            .field("variables", &self.variables)
            .field("scalars", &self.scalars)
            .field("method", &self.method)
            .finish()
    }
}
