//! Arguments, input objects and variable bindings.
//!
//! An [`Argument`] is a key with a typed [`Value`] and an `optional` flag.
//! Values render as GraphQL literals: strings are quoted unless they start
//! with `$` (a variable reference), lists and [`InputObject`]s render
//! recursively, everything else renders as plain text.

use std::fmt;

use indexmap::IndexMap;

use crate::error::NodesError;

/// Declared kind of an argument value, fixed when the type is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentKind {
    Boolean,
    Integer,
    Float,
    #[default]
    String,
}

impl ArgumentKind {
    /// Parse a declared value as this kind. An absent value is `null`.
    pub fn coerce(self, argument: &str, raw: Option<&str>) -> Result<Value, NodesError> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };
        let invalid = || NodesError::TypeCoercion {
            argument: argument.to_string(),
            value: raw.to_string(),
            kind: self.to_string(),
        };
        match self {
            Self::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(Value::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(Value::Boolean(false))
                } else {
                    Err(invalid())
                }
            }
            Self::Integer => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float)
                .ok_or_else(invalid),
            Self::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
        })
    }
}

/// A GraphQL argument value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    /// Enum-like symbol, rendered unquoted.
    Enum(String),
    List(Vec<Value>),
    Object(InputObject),
    /// Reference to a declared variable, rendered as `$name`.
    Variable(String),
}

impl Value {
    /// An enum-like symbol such as `ACTIVE`.
    pub fn enumeration(symbol: impl Into<String>) -> Self {
        Self::Enum(symbol.into())
    }

    /// A reference to the variable `name` (without the `$`).
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("null"),
            Self::String(s) if s.starts_with('$') => out.push_str(s),
            Self::String(s) => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        '\u{8}' => out.push_str("\\b"),
                        '\u{c}' => out.push_str("\\f"),
                        c if (c as u32) < 0x20 => {
                            out.push_str(&format!("\\u{:04X}", c as u32));
                        }
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            Self::Int(i) => out.push_str(&i.to_string()),
            // GraphQL has no literal for NaN or infinity.
            Self::Float(v) if !v.is_finite() => out.push_str("null"),
            Self::Float(v) => out.push_str(&format!("{v:?}")),
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Enum(symbol) => out.push_str(symbol),
            Self::List(values) => {
                out.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    value.write_to(out);
                }
                out.push(']');
            }
            Self::Object(object) => object.write_to(out),
            Self::Variable(name) => {
                out.push('$');
                out.push_str(name);
            }
        }
    }
}

/// Renders the value as a GraphQL literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

macro_rules! int_values {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Self::Int(i64::from(i))
                }
            }
        )*
    };
}

int_values!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    /// Widens through the shortest decimal form, so `1.1f32` stays `1.1`.
    fn from(v: f32) -> Self {
        Self::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<InputObject> for Value {
    fn from(object: InputObject) -> Self {
        Self::Object(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An insertion-ordered input object literal, e.g. `{name:"x",limit:5}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputObject {
    fields: IndexMap<String, Value>,
}

impl InputObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InputObjectBuilder {
        InputObjectBuilder::default()
    }

    /// Insert a field; re-inserting a key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push('{');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(key);
            out.push(':');
            value.write_to(out);
        }
        out.push('}');
    }
}

/// Chained construction of an [`InputObject`].
#[derive(Debug, Default)]
#[must_use]
pub struct InputObjectBuilder {
    object: InputObject,
}

impl InputObjectBuilder {
    pub fn put(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.object.insert(key, value);
        self
    }

    pub fn build(self) -> InputObject {
        self.object
    }
}

/// A single argument on a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    key: String,
    value: Value,
    optional: bool,
}

impl Argument {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            optional: false,
        }
    }

    /// An argument that is left out of the document while its value is `null`.
    pub fn optional(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            optional: true,
            ..Self::new(key, value)
        }
    }

    /// An argument bound to the variable `name`, rendered as `key:$name`.
    pub fn variable(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, Value::variable(name))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Whether the argument appears in the rendered document.
    pub fn is_rendered(&self) -> bool {
        !(self.optional && self.value.is_null())
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str(&self.key);
        out.push(':');
        self.value.write_to(out);
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

/// Argument values to inject at a dot path, e.g. `"user.repositories"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    path: String,
    arguments: Vec<Argument>,
}

impl Arguments {
    pub fn new(path: impl Into<String>, arguments: impl IntoIterator<Item = Argument>) -> Self {
        Self {
            path: path.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

/// A runtime variable binding sent in the `variables` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: serde_json::Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub(crate) fn into_parts(self) -> (String, serde_json::Value) {
        (self.name, self.value)
    }
}
