//! Builds the property tree of a document from derived type descriptors.

use std::any::TypeId;

use indexmap::IndexMap;

use crate::argument::{Argument, Value};
use crate::error::NodesError;
use crate::operation::Operation;
use crate::property::Property;
use crate::schema::{
    ArgumentAttr, FieldDescriptor, GraphQLObject, PropertyAttr, Scalars, TypeDescriptor, TypeKind,
};

/// Result of compiling a root type.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub operation: Operation,
    /// Key of the synthetic top-level property, if the root type introduced one.
    /// The response payload is read from under this key.
    pub resource_key: Option<String>,
}

/// Walks a type graph once and owns everything accumulated along the way.
///
/// Variable declarations from every field land in one flat map, in the order
/// they are met. Types currently being walked are kept on a stack so a type
/// that refers back to itself is reported instead of recursing forever.
pub struct TreeBuilder<'a> {
    scalars: &'a Scalars,
    variables: IndexMap<String, String>,
    visiting: Vec<(TypeId, &'static str)>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(scalars: &'a Scalars) -> Self {
        Self {
            scalars,
            variables: IndexMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Compile `T` into an operation.
    pub fn build<T: GraphQLObject>(self) -> Result<Compiled, NodesError> {
        self.build_descriptor(&T::descriptor())
    }

    pub fn build_descriptor(mut self, root: &TypeDescriptor) -> Result<Compiled, NodesError> {
        tracing::trace!(root = root.name, "building property tree");

        let mut operation = Operation::new();
        if let Some(attr) = &root.operation {
            operation.set_name(Some(attr.name.to_string()));
            operation.set_method(Some(attr.method));
            for variable in &attr.variables {
                self.variables
                    .insert(variable.name.to_string(), variable.scalar.to_string());
            }
        }

        let children = self.walk(root)?;

        let top = root
            .operation
            .as_ref()
            .and_then(|attr| attr.property.as_ref())
            .or(root.property.as_ref());

        let resource_key = match top {
            Some(attr) => {
                // The synthetic node is keyed by the property name and carries no alias.
                let mut property = Property::new();
                property.set_arguments(Some(self.arguments(attr)?));
                property.set_children(Some(children));
                let mut top_level = IndexMap::new();
                top_level.insert(attr.name.to_string(), property);
                operation.set_children(top_level);
                Some(attr.name.to_string())
            }
            None => {
                operation.set_children(children);
                None
            }
        };

        operation.set_variables(self.variables);
        Ok(Compiled {
            operation,
            resource_key,
        })
    }

    fn walk(&mut self, descriptor: &TypeDescriptor) -> Result<IndexMap<String, Property>, NodesError> {
        self.enter(descriptor)?;
        let mut children = IndexMap::new();
        self.collect(descriptor, &mut children)?;
        self.visiting.pop();
        Ok(children)
    }

    fn enter(&mut self, descriptor: &TypeDescriptor) -> Result<(), NodesError> {
        if let Some(start) = self
            .visiting
            .iter()
            .position(|(id, _)| *id == descriptor.type_id)
        {
            let mut cycle: Vec<&str> = self.visiting[start..].iter().map(|(_, n)| *n).collect();
            cycle.push(descriptor.name);
            return Err(NodesError::CyclicSchema {
                cycle: cycle.join(" -> "),
            });
        }
        self.visiting.push((descriptor.type_id, descriptor.name));
        Ok(())
    }

    /// Add the fields of `descriptor` to `children`, inlining flattened members.
    fn collect(
        &mut self,
        descriptor: &TypeDescriptor,
        children: &mut IndexMap<String, Property>,
    ) -> Result<(), NodesError> {
        for field in &descriptor.fields {
            if field.ignore {
                continue;
            }
            if field.flatten {
                let TypeKind::Composite(describe) = field.ty.element.kind else {
                    return Err(NodesError::Build(format!(
                        "field '{}' of {} is marked flatten but its type is not an object",
                        field.name, descriptor.name
                    )));
                };
                let inner = describe();
                self.enter(&inner)?;
                self.collect(&inner, children)?;
                self.visiting.pop();
                continue;
            }
            let property = self.field(field)?;
            children.insert(field.name.to_string(), property);
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDescriptor) -> Result<Property, NodesError> {
        tracing::trace!(field = field.name, ty = field.ty.element.name, "walking field");
        let mut property = Property::new();
        let mut arguments: Option<Vec<Argument>> = None;

        if let Some(attr) = &field.property {
            property.set_alias(Some(attr.name.to_string()));
            arguments = Some(self.arguments(attr)?);
        }
        if let Some(list) = &field.arguments {
            let declared = arguments.get_or_insert_with(Vec::new);
            for attr in list {
                declared.push(argument(attr)?);
            }
        }
        if let Some(attr) = &field.argument {
            arguments.get_or_insert_with(Vec::new).push(argument(attr)?);
        }
        for variable in &field.variables {
            arguments
                .get_or_insert_with(Vec::new)
                .push(Argument::variable(variable.name, variable.name));
            self.variables
                .insert(variable.name.to_string(), variable.scalar.to_string());
        }
        property.set_arguments(arguments);

        let element = &field.ty.element;
        if !self.scalars.is_scalar(element) {
            if let TypeKind::Composite(describe) = element.kind {
                property.set_children(Some(self.walk(&describe())?));
            }
        }
        Ok(property)
    }

    fn arguments(&self, attr: &PropertyAttr) -> Result<Vec<Argument>, NodesError> {
        attr.arguments.iter().map(argument).collect()
    }
}

fn argument(attr: &ArgumentAttr) -> Result<Argument, NodesError> {
    let value = match attr.variable {
        Some(name) => Value::variable(name),
        None => attr.kind.coerce(attr.name, attr.value)?,
    };
    Ok(if attr.optional {
        Argument::optional(attr.name, value)
    } else {
        Argument::new(attr.name, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgumentKind;
    use crate::operation::Method;
    use crate::schema::{FieldType, GraphQLField, OperationAttr, VariableAttr};

    fn plain(name: &'static str, ty: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            name,
            property: None,
            arguments: None,
            argument: None,
            variables: Vec::new(),
            ignore: false,
            flatten: false,
            ty,
        }
    }

    fn arg(name: &'static str, kind: ArgumentKind, value: Option<&'static str>) -> ArgumentAttr {
        ArgumentAttr {
            name,
            value,
            kind,
            optional: false,
            variable: None,
        }
    }

    struct Repository;

    impl GraphQLField for Repository {
        fn field_type() -> FieldType {
            FieldType::composite::<Self>()
        }
    }

    impl GraphQLObject for Repository {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor {
                name: "Repository",
                type_id: TypeId::of::<Self>(),
                property: None,
                operation: None,
                fields: vec![plain("name", String::field_type())],
            }
        }
    }

    struct User;

    impl GraphQLField for User {
        fn field_type() -> FieldType {
            FieldType::composite::<Self>()
        }
    }

    impl GraphQLObject for User {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor {
                name: "User",
                type_id: TypeId::of::<Self>(),
                property: Some(PropertyAttr {
                    name: "user",
                    arguments: vec![arg("login", ArgumentKind::String, None)],
                }),
                operation: None,
                fields: vec![
                    plain("login", String::field_type()),
                    FieldDescriptor {
                        arguments: Some(vec![ArgumentAttr {
                            optional: true,
                            ..arg("first", ArgumentKind::Integer, None)
                        }]),
                        argument: Some(arg("private", ArgumentKind::Boolean, Some("false"))),
                        ..plain("repositories", Vec::<Repository>::field_type())
                    },
                    FieldDescriptor {
                        ignore: true,
                        ..plain("cache", FieldType::opaque())
                    },
                ],
            }
        }
    }

    /// A node that links back to itself.
    struct Node;

    impl GraphQLField for Node {
        fn field_type() -> FieldType {
            FieldType::composite::<Self>()
        }
    }

    impl GraphQLObject for Node {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor {
                name: "Node",
                type_id: TypeId::of::<Self>(),
                property: None,
                operation: None,
                fields: vec![
                    plain("id", String::field_type()),
                    plain("parent", Option::<Box<Node>>::field_type()),
                ],
            }
        }
    }

    struct Base;

    impl GraphQLField for Base {
        fn field_type() -> FieldType {
            FieldType::composite::<Self>()
        }
    }

    impl GraphQLObject for Base {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor {
                name: "Base",
                type_id: TypeId::of::<Self>(),
                property: None,
                operation: None,
                fields: vec![plain("id", String::field_type())],
            }
        }
    }

    struct Extended;

    impl GraphQLField for Extended {
        fn field_type() -> FieldType {
            FieldType::composite::<Self>()
        }
    }

    impl GraphQLObject for Extended {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor {
                name: "Extended",
                type_id: TypeId::of::<Self>(),
                property: None,
                operation: Some(OperationAttr {
                    name: "FindExtended",
                    method: Method::Mutation,
                    variables: vec![VariableAttr {
                        name: "id",
                        scalar: "ID!",
                    }],
                    property: Some(PropertyAttr {
                        name: "extended",
                        arguments: vec![ArgumentAttr {
                            variable: Some("id"),
                            ..arg("id", ArgumentKind::String, None)
                        }],
                    }),
                }),
                fields: vec![
                    plain("extra", i32::field_type()),
                    FieldDescriptor {
                        flatten: true,
                        ..plain("base", Base::field_type())
                    },
                ],
            }
        }
    }

    fn compile<T: GraphQLObject>() -> Compiled {
        TreeBuilder::new(&Scalars::new()).build::<T>().unwrap()
    }

    #[test]
    fn wraps_children_in_the_root_property() {
        let compiled = compile::<User>();
        assert_eq!(compiled.resource_key.as_deref(), Some("user"));
        assert_eq!(
            compiled.operation.render().unwrap(),
            "query { user (login:null) { login repositories (private:false) { name } } } "
        );
    }

    #[test]
    fn ignored_fields_are_skipped() {
        let compiled = compile::<User>();
        let user = compiled.operation.property("user").unwrap();
        assert!(!user.children().unwrap().contains_key("cache"));
    }

    #[test]
    fn argument_lists_merge_in_order() {
        let compiled = compile::<User>();
        let repositories = compiled.operation.property("user.repositories").unwrap();
        let keys: Vec<&str> = repositories
            .arguments()
            .unwrap()
            .iter()
            .map(|a| a.key())
            .collect();
        assert_eq!(keys, ["first", "private"]);
    }

    #[test]
    fn fields_without_arguments_have_none() {
        let compiled = compile::<User>();
        assert!(compiled
            .operation
            .property("user.login")
            .unwrap()
            .arguments()
            .is_none());
    }

    #[test]
    fn registered_scalars_stop_recursion() {
        let mut scalars = Scalars::new();
        scalars.insert::<Repository>();
        let compiled = TreeBuilder::new(&scalars).build::<User>().unwrap();
        assert!(compiled
            .operation
            .property("user.repositories")
            .unwrap()
            .is_leaf());
    }

    #[test]
    fn builds_are_deterministic() {
        assert_eq!(
            compile::<User>().operation.render().unwrap(),
            compile::<User>().operation.render().unwrap()
        );
    }

    #[test]
    fn cyclic_types_fail() {
        let err = TreeBuilder::new(&Scalars::new())
            .build::<Node>()
            .unwrap_err();
        assert!(matches!(err, NodesError::CyclicSchema { .. }));
        assert!(err.to_string().contains("Node -> Node"));
    }

    #[test]
    fn cycles_can_be_broken_with_scalars() {
        let mut scalars = Scalars::new();
        scalars.insert::<Node>();
        let compiled = TreeBuilder::new(&scalars).build::<Node>().unwrap();
        assert_eq!(
            compiled.operation.render().unwrap(),
            "query { id parent } "
        );
    }

    #[test]
    fn operation_header_and_flattened_fields() {
        let compiled = compile::<Extended>();
        assert_eq!(compiled.operation.method(), Some(Method::Mutation));
        assert_eq!(compiled.resource_key.as_deref(), Some("extended"));
        assert_eq!(
            compiled.operation.render().unwrap(),
            "mutation FindExtended ($id:ID!){ extended (id:$id) { extra id } } "
        );
    }

    #[test]
    fn malformed_declared_value_fails() {
        struct Bad;

        impl GraphQLField for Bad {
            fn field_type() -> FieldType {
                FieldType::composite::<Self>()
            }
        }

        impl GraphQLObject for Bad {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor {
                    name: "Bad",
                    type_id: TypeId::of::<Self>(),
                    property: None,
                    operation: None,
                    fields: vec![FieldDescriptor {
                        argument: Some(arg("first", ArgumentKind::Integer, Some("ten"))),
                        ..plain("items", Vec::<String>::field_type())
                    }],
                }
            }
        }

        let err = TreeBuilder::new(&Scalars::new()).build::<Bad>().unwrap_err();
        assert!(matches!(err, NodesError::TypeCoercion { .. }));
    }

    #[test]
    fn field_variables_declare_and_bind() {
        struct Search;

        impl GraphQLField for Search {
            fn field_type() -> FieldType {
                FieldType::composite::<Self>()
            }
        }

        impl GraphQLObject for Search {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor {
                    name: "Search",
                    type_id: TypeId::of::<Self>(),
                    property: None,
                    operation: None,
                    fields: vec![FieldDescriptor {
                        variables: vec![
                            VariableAttr {
                                name: "term",
                                scalar: "String!",
                            },
                            VariableAttr {
                                name: "limit",
                                scalar: "Int",
                            },
                        ],
                        ..plain("results", Vec::<String>::field_type())
                    }],
                }
            }
        }

        let compiled = compile::<Search>();
        assert!(compiled.resource_key.is_none());
        assert_eq!(
            compiled.operation.render().unwrap(),
            "query ($term:String!,$limit:Int){ results (term:$term,limit:$limit) } "
        );
    }
}
