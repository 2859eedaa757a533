//! Type descriptors and scalar classification.
//!
//! Every type that takes part in a document describes itself through
//! [`GraphQLField`]: either a leaf (builtin primitives, strings, temporal
//! types, `#[derive(GraphQLScalar)]` types) or a composite object whose
//! fields are listed in a [`TypeDescriptor`] table produced by
//! `#[derive(GraphQLObject)]`. Wrapper types (`Option`, `Box`, `Arc`) are
//! transparent and collections (`Vec`, arrays, sets) mark the field as a list
//! of their element type.
//!
//! No runtime reflection is involved: the derive macro writes the table at
//! compile time and the tree builder only reads it.

use std::any::TypeId;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::argument::ArgumentKind;
use crate::operation::Method;

/// Trait implemented by every type that can appear as a field in a document.
pub trait GraphQLField {
    /// Classification of this type when used as a field.
    fn field_type() -> FieldType;
}

/// Trait implemented by composite types, usually via `#[derive(GraphQLObject)]`.
///
/// # Example
///
/// ```ignore
/// use gqlnodes::GraphQLObject;
///
/// #[derive(GraphQLObject, Deserialize)]
/// #[graphql(property(name = "viewer"))]
/// struct Viewer {
///     login: String,
///     #[graphql(argument(name = "first", kind = "Integer", value = "10"))]
///     followers: Vec<User>,
/// }
/// ```
pub trait GraphQLObject: GraphQLField + 'static {
    /// The field table of this type.
    fn descriptor() -> TypeDescriptor;
}

/// How a field's element type takes part in the document.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// A leaf value rendered without a selection set.
    Builtin,
    /// A field explicitly marked as a leaf (`ignore` or `scalar`).
    Opaque,
    /// An object whose fields are selected recursively.
    Composite(fn() -> TypeDescriptor),
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("Builtin"),
            Self::Opaque => f.write_str("Opaque"),
            Self::Composite(_) => f.write_str("Composite"),
        }
    }
}

/// A reference to a Rust type as seen by the tree builder.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    pub name: &'static str,
    pub id: Option<TypeId>,
    pub kind: TypeKind,
}

/// Declared type of a field: its element type and whether it is a list.
#[derive(Debug, Clone, Copy)]
pub struct FieldType {
    pub list: bool,
    pub element: TypeRef,
}

impl FieldType {
    /// A builtin leaf type.
    pub fn scalar<T: ?Sized + 'static>() -> Self {
        Self {
            list: false,
            element: TypeRef {
                name: std::any::type_name::<T>(),
                id: Some(TypeId::of::<T>()),
                kind: TypeKind::Builtin,
            },
        }
    }

    /// A composite object type.
    pub fn composite<T: GraphQLObject>() -> Self {
        Self {
            list: false,
            element: TypeRef {
                name: std::any::type_name::<T>(),
                id: Some(TypeId::of::<T>()),
                kind: TypeKind::Composite(T::descriptor),
            },
        }
    }

    /// A field marked as a leaf regardless of its Rust type.
    pub fn opaque() -> Self {
        Self {
            list: false,
            element: TypeRef {
                name: "opaque",
                id: None,
                kind: TypeKind::Opaque,
            },
        }
    }

    /// The same element type, as a list.
    pub fn into_list(self) -> Self {
        Self { list: true, ..self }
    }
}

/// Field table of a composite type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub type_id: TypeId,
    /// Type-level property: wraps the whole document in one top-level field.
    pub property: Option<PropertyAttr>,
    /// Type-level operation header (name, method, declared variables).
    pub operation: Option<OperationAttr>,
    pub fields: Vec<FieldDescriptor>,
}

/// One row of a [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Original field key, used for lookup and as the rendered field name.
    pub name: &'static str,
    pub property: Option<PropertyAttr>,
    pub arguments: Option<Vec<ArgumentAttr>>,
    pub argument: Option<ArgumentAttr>,
    pub variables: Vec<VariableAttr>,
    pub ignore: bool,
    /// Inline the fields of this field's type into the enclosing type.
    pub flatten: bool,
    pub ty: FieldType,
}

/// `property(name = "...", argument(...)...)`
#[derive(Debug, Clone)]
pub struct PropertyAttr {
    pub name: &'static str,
    pub arguments: Vec<ArgumentAttr>,
}

/// `argument(name = "...", value = "...", kind = "...", optional, variable = "...")`
#[derive(Debug, Clone)]
pub struct ArgumentAttr {
    pub name: &'static str,
    pub value: Option<&'static str>,
    pub kind: ArgumentKind,
    pub optional: bool,
    /// Render the argument as a reference to this variable.
    pub variable: Option<&'static str>,
}

/// `variable(name = "...", scalar = "...")`
#[derive(Debug, Clone)]
pub struct VariableAttr {
    pub name: &'static str,
    /// Wire type signature, e.g. `String!` or `[ID]`.
    pub scalar: &'static str,
}

/// `operation(name = "...", method = "...", variable(...)..., property(...))`
#[derive(Debug, Clone)]
pub struct OperationAttr {
    pub name: &'static str,
    pub method: Method,
    pub variables: Vec<VariableAttr>,
    pub property: Option<PropertyAttr>,
}

// ── Scalar classification ───────────────────────────────────────────────────

/// Caller-supplied set of extra types to treat as leaves.
#[derive(Clone, Default)]
pub struct Scalars {
    ids: HashSet<TypeId>,
    names: Vec<&'static str>,
}

impl Scalars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `T` as a leaf even if it is a composite object.
    pub fn insert<T: ?Sized + 'static>(&mut self) {
        if self.ids.insert(TypeId::of::<T>()) {
            self.names.push(std::any::type_name::<T>());
        }
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.ids.contains(&id)
    }

    /// Names of the registered types, in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether a field's element type is a leaf.
    ///
    /// Builtins and opaque fields are always leaves; composites are leaves
    /// only when registered in this set.
    pub fn is_scalar(&self, ty: &TypeRef) -> bool {
        match ty.kind {
            TypeKind::Builtin | TypeKind::Opaque => true,
            TypeKind::Composite(_) => ty.id.is_some_and(|id| self.contains(id)),
        }
    }
}

impl fmt::Debug for Scalars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}

// ── Builtin implementations ─────────────────────────────────────────────────

macro_rules! builtin_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GraphQLField for $ty {
                fn field_type() -> FieldType {
                    FieldType::scalar::<$ty>()
                }
            }
        )*
    };
}

builtin_scalars!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
    serde_json::Value,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::NaiveTime,
);

impl<Tz: chrono::TimeZone + 'static> GraphQLField for chrono::DateTime<Tz> {
    fn field_type() -> FieldType {
        FieldType::scalar::<Self>()
    }
}

// Transparent wrappers
impl<T: GraphQLField> GraphQLField for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: GraphQLField> GraphQLField for Box<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: GraphQLField> GraphQLField for Rc<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: GraphQLField> GraphQLField for Arc<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

// Lists classify their element type; nested lists collapse to the innermost element.
impl<T: GraphQLField> GraphQLField for Vec<T> {
    fn field_type() -> FieldType {
        T::field_type().into_list()
    }
}

impl<T: GraphQLField> GraphQLField for VecDeque<T> {
    fn field_type() -> FieldType {
        T::field_type().into_list()
    }
}

impl<T: GraphQLField, const N: usize> GraphQLField for [T; N] {
    fn field_type() -> FieldType {
        T::field_type().into_list()
    }
}

impl<T: GraphQLField, S> GraphQLField for HashSet<T, S> {
    fn field_type() -> FieldType {
        T::field_type().into_list()
    }
}

impl<T: GraphQLField> GraphQLField for BTreeSet<T> {
    fn field_type() -> FieldType {
        T::field_type().into_list()
    }
}
