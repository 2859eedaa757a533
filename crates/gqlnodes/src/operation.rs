//! The root of a compiled document.
//!
//! An [`Operation`] owns the method keyword, the optional operation name, the
//! variable declarations collected from the whole tree and the top-level
//! fields. It renders to document text and resolves dot paths for argument
//! injection.

use std::fmt;

use indexmap::IndexMap;

use crate::argument::Argument;
use crate::error::NodesError;
use crate::property::{write_declarations, write_selection, Property};

/// The operation verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Query,
    Mutation,
}

impl Method {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A compiled GraphQL operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    method: Option<Method>,
    name: Option<String>,
    variables: IndexMap<String, String>,
    children: Option<IndexMap<String, Property>>,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            method: Some(Method::Query),
            name: None,
            variables: IndexMap::new(),
            children: None,
        }
    }
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn set_method(&mut self, method: Option<Method>) {
        self.method = method;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Declared variables (name without `$` → wire type), in declaration order.
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    pub fn set_variables(&mut self, variables: IndexMap<String, String>) {
        self.variables = variables;
    }

    pub fn children(&self) -> Option<&IndexMap<String, Property>> {
        self.children.as_ref()
    }

    pub fn set_children(&mut self, children: IndexMap<String, Property>) {
        self.children = Some(children);
    }

    /// Render the document with this operation's own method.
    pub fn render(&self) -> Result<String, NodesError> {
        self.render_as(self.method)
    }

    /// Render the document with `method` in place of the operation's own.
    pub fn render_as(&self, method: Option<Method>) -> Result<String, NodesError> {
        let children = self.children.as_ref().ok_or_else(|| {
            NodesError::Build("Operation must specify one or more properties".to_string())
        })?;

        let mut out = String::new();
        if let Some(method) = method {
            out.push_str(method.keyword());
            out.push(' ');
        }
        if let Some(name) = &self.name {
            out.push_str(name);
            out.push(' ');
        }
        if !self.variables.is_empty() {
            write_declarations(&self.variables, &mut out);
        }
        // An empty top level still renders its braces.
        if children.is_empty() {
            out.push_str("{ } ");
        } else {
            write_selection(children, &mut out);
        }
        Ok(out)
    }

    /// Resolve `path` (dot-separated original field keys) to a property.
    ///
    /// `"."` names the single top-level property.
    pub fn property(&self, path: &str) -> Result<&Property, NodesError> {
        let invalid = || NodesError::InvalidPath {
            path: path.to_string(),
        };
        let children = self.children.as_ref().ok_or_else(invalid)?;

        if targets_top_level(path) {
            return single_top_level(children);
        }

        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(invalid)?;
        let mut property = children.get(first).ok_or_else(invalid)?;
        for key in segments {
            property = property
                .children()
                .and_then(|c| c.get(key))
                .ok_or_else(invalid)?;
        }
        Ok(property)
    }

    fn property_mut(&mut self, path: &str) -> Result<&mut Property, NodesError> {
        let invalid = || NodesError::InvalidPath {
            path: path.to_string(),
        };
        let children = self.children.as_mut().ok_or_else(invalid)?;

        if targets_top_level(path) {
            if children.len() > 1 {
                return Err(too_many_top_level());
            }
            return children.values_mut().next().ok_or_else(invalid);
        }

        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(invalid)?;
        let mut property = children.get_mut(first).ok_or_else(invalid)?;
        for key in segments {
            property = property
                .children_mut()
                .and_then(|c| c.get_mut(key))
                .ok_or_else(invalid)?;
        }
        Ok(property)
    }

    /// Overwrite pre-declared argument values at `path`.
    ///
    /// Keys match case-insensitively. Only arguments declared when the tree
    /// was built can be set; the set of keys never grows.
    pub fn set_arguments(&mut self, path: &str, arguments: &[Argument]) -> Result<(), NodesError> {
        tracing::trace!(path, count = arguments.len(), "injecting arguments");
        let property = self.property_mut(path)?;
        let declared = property
            .arguments_mut()
            .ok_or_else(|| NodesError::ArgumentsNotSupported {
                path: path.to_string(),
            })?;

        for argument in arguments {
            let target = declared
                .iter_mut()
                .find(|a| a.key().eq_ignore_ascii_case(argument.key()))
                .ok_or_else(|| NodesError::UnknownArgument {
                    argument: argument.key().to_string(),
                    path: path.to_string(),
                })?;
            target.set_value(argument.value().clone());
        }
        Ok(())
    }
}

/// A path of dots only has no segments left once split.
fn targets_top_level(path: &str) -> bool {
    !path.is_empty() && path.bytes().all(|b| b == b'.')
}

fn single_top_level(children: &IndexMap<String, Property>) -> Result<&Property, NodesError> {
    if children.len() > 1 {
        return Err(too_many_top_level());
    }
    children.values().next().ok_or_else(|| NodesError::InvalidPath {
        path: ".".to_string(),
    })
}

fn too_many_top_level() -> NodesError {
    NodesError::Build(
        "Operation contains more than one property, dot path must specify a top level property"
            .to_string(),
    )
}
