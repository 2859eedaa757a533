//! A single field of a compiled document.

use indexmap::IndexMap;

use crate::argument::Argument;
use crate::operation::Method;

/// One field of the compiled document tree.
///
/// - `arguments: None` means the field accepts no arguments at all;
///   `Some(vec![])` means it was declared to take arguments but has none yet.
/// - `children: None` marks a leaf; `Some(_)` a field with a selection set.
///
/// Children are keyed by the original field key, never by alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    alias: Option<String>,
    method: Option<Method>,
    arguments: Option<Vec<Argument>>,
    variables: Option<IndexMap<String, String>>,
    children: Option<IndexMap<String, Property>>,
}

impl Property {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        self.alias = alias;
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn set_method(&mut self, method: Option<Method>) {
        self.method = method;
    }

    pub fn arguments(&self) -> Option<&[Argument]> {
        self.arguments.as_deref()
    }

    pub fn arguments_mut(&mut self) -> Option<&mut Vec<Argument>> {
        self.arguments.as_mut()
    }

    pub fn set_arguments(&mut self, arguments: Option<Vec<Argument>>) {
        self.arguments = arguments;
    }

    /// Node-local variable declarations (name without `$` → wire type).
    pub fn variables(&self) -> Option<&IndexMap<String, String>> {
        self.variables.as_ref()
    }

    pub fn set_variables(&mut self, variables: Option<IndexMap<String, String>>) {
        self.variables = variables;
    }

    pub fn children(&self) -> Option<&IndexMap<String, Property>> {
        self.children.as_ref()
    }

    pub fn children_mut(&mut self) -> Option<&mut IndexMap<String, Property>> {
        self.children.as_mut()
    }

    pub fn set_children(&mut self, children: Option<IndexMap<String, Property>>) {
        self.children = children;
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Render this field under `key`.
    pub fn render(&self, key: Option<&str>) -> String {
        let mut out = String::new();
        self.write_to(key, &mut out);
        out
    }

    pub(crate) fn write_to(&self, key: Option<&str>, out: &mut String) {
        if let Some(method) = self.method {
            out.push_str(method.keyword());
            out.push(' ');
        }
        if let Some(key) = key {
            out.push_str(key);
            out.push(' ');
        }
        if let Some(alias) = &self.alias {
            out.push_str(": ");
            out.push_str(alias);
            out.push(' ');
        }
        if let Some(variables) = self.variables.as_ref().filter(|v| !v.is_empty()) {
            write_declarations(variables, out);
        }
        if let Some(arguments) = &self.arguments {
            let mut rendered = arguments.iter().filter(|a| a.is_rendered()).peekable();
            if rendered.peek().is_some() {
                out.push('(');
                for (i, argument) in rendered.enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    argument.write_to(out);
                }
                out.push_str(") ");
            }
        }
        if let Some(children) = self.children.as_ref().filter(|c| !c.is_empty()) {
            write_selection(children, out);
        }
    }
}

/// `($name:Type,...)`, without a trailing space.
pub(crate) fn write_declarations(variables: &IndexMap<String, String>, out: &mut String) {
    out.push('(');
    for (i, (name, wire_type)) in variables.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('$');
        out.push_str(name);
        out.push(':');
        out.push_str(wire_type);
    }
    out.push(')');
}

/// `{ field field } `
pub(crate) fn write_selection(children: &IndexMap<String, Property>, out: &mut String) {
    out.push_str("{ ");
    for (key, child) in children {
        child.write_to(Some(key), out);
    }
    out.push_str("} ");
}
