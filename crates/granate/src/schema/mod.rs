//! The parsed shape of an SDL document: type definitions with `extend` merged in and the root
//! operation types named.

mod executable;

use async_graphql_parser::types::{
    BaseType, InputValueDefinition, ServiceDocument, Type, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_value::ConstValue;
use indexmap::IndexMap;

pub use executable::GranateSchema;
pub(crate) use executable::build_executable_schema;

use crate::error::{AnnotationError, GranateError, SchemaError};

#[derive(Debug, Clone)]
pub struct SchemaModel {
    query: String,
    mutation: Option<String>,
    types: IndexMap<String, TypeModel>,
}

#[derive(Debug, Clone)]
pub struct TypeModel {
    pub name: String,
    pub description: Option<String>,
    pub kind: TypeModelKind,
}

#[derive(Debug, Clone)]
pub enum TypeModelKind {
    Scalar,
    Object { implements: Vec<String>, fields: Vec<FieldModel> },
    Interface { implements: Vec<String>, fields: Vec<FieldModel> },
    Union { members: Vec<String> },
    Enum { values: Vec<String> },
    InputObject { fields: Vec<InputValueModel> },
}

impl TypeModelKind {
    fn has_fields(&self) -> Option<bool> {
        match self {
            TypeModelKind::Object { fields, .. } | TypeModelKind::Interface { fields, .. } => Some(!fields.is_empty()),
            TypeModelKind::InputObject { fields } => Some(!fields.is_empty()),
            _ => None,
        }
    }

    /// Appends the members of an extension of the same kind.
    fn merge(&mut self, extension: TypeModelKind) -> Result<(), TypeModelKind> {
        match (self, extension) {
            (
                TypeModelKind::Object { implements, fields },
                TypeModelKind::Object {
                    implements: more_implements,
                    fields: more_fields,
                },
            )
            | (
                TypeModelKind::Interface { implements, fields },
                TypeModelKind::Interface {
                    implements: more_implements,
                    fields: more_fields,
                },
            ) => {
                implements.extend(more_implements);
                fields.extend(more_fields);
            }
            (TypeModelKind::Union { members }, TypeModelKind::Union { members: more }) => members.extend(more),
            (TypeModelKind::Enum { values }, TypeModelKind::Enum { values: more }) => values.extend(more),
            (TypeModelKind::InputObject { fields }, TypeModelKind::InputObject { fields: more }) => fields.extend(more),
            (TypeModelKind::Scalar, TypeModelKind::Scalar) => {}
            (_, extension) => return Err(extension),
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FieldModel {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueModel>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct InputValueModel {
    pub name: String,
    pub description: Option<String>,
    pub ty: Type,
    pub default_value: Option<ConstValue>,
}

impl From<&InputValueDefinition> for InputValueModel {
    fn from(definition: &InputValueDefinition) -> Self {
        InputValueModel {
            name: definition.name.node.to_string(),
            description: definition.description.as_ref().map(|description| description.node.clone()),
            ty: definition.ty.node.clone(),
            default_value: definition.default_value.as_ref().map(|value| value.node.clone()),
        }
    }
}

impl SchemaModel {
    pub fn parse(sdl: &str) -> Result<Self, GranateError> {
        let document = async_graphql_parser::parse_schema(sdl).map_err(AnnotationError::from)?;

        Ok(Self::from_document(&document)?)
    }

    pub fn from_document(document: &ServiceDocument) -> Result<Self, SchemaError> {
        let mut types: IndexMap<String, TypeModel> = IndexMap::new();
        let mut extensions = Vec::new();
        let mut query = None;
        let mut mutation = None;

        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = &schema.node;

                    if let Some(name) = &schema.query {
                        query = Some(name.node.to_string());
                    }

                    if let Some(name) = &schema.mutation {
                        mutation = Some(name.node.to_string());
                    }
                }
                TypeSystemDefinition::Type(definition) if definition.node.extend => extensions.push(&definition.node),
                TypeSystemDefinition::Type(definition) => {
                    let model = TypeModel::from_definition(&definition.node);

                    if types.contains_key(&model.name) {
                        return Err(SchemaError::DuplicateType(model.name));
                    }

                    types.insert(model.name.clone(), model);
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        for extension in extensions {
            let extension = TypeModel::from_definition(extension);

            let Some(target) = types.get_mut(&extension.name) else {
                return Err(SchemaError::UnknownExtension(extension.name));
            };

            if target.kind.merge(extension.kind).is_err() {
                return Err(SchemaError::ExtensionKindMismatch(extension.name));
            }
        }

        for model in types.values() {
            if model.kind.has_fields() == Some(false) {
                return Err(SchemaError::EmptyFields(model.name.clone()));
            }
        }

        let query = query
            .or_else(|| types.contains_key("Query").then(|| "Query".to_owned()))
            .filter(|name| types.contains_key(name))
            .ok_or(SchemaError::MissingQueryType)?;

        let mutation = mutation.or_else(|| types.contains_key("Mutation").then(|| "Mutation".to_owned()));

        Ok(SchemaModel { query, mutation, types })
    }

    pub fn query_type(&self) -> &str {
        &self.query
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation.as_deref()
    }

    pub fn is_root_type(&self, name: &str) -> bool {
        self.query == name || self.mutation.as_deref() == Some(name)
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeModel> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeModel> {
        self.types.values()
    }

    /// Union members, or the object types implementing an interface.
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        match self.type_named(name).map(|model| &model.kind) {
            Some(TypeModelKind::Union { members }) => members.iter().map(String::as_str).collect(),
            Some(TypeModelKind::Interface { .. }) => self
                .types
                .values()
                .filter(|model| match &model.kind {
                    TypeModelKind::Object { implements, .. } => implements.iter().any(|interface| interface == name),
                    _ => false,
                })
                .map(|model| model.name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_abstract(&self, name: &str) -> bool {
        matches!(
            self.type_named(name).map(|model| &model.kind),
            Some(TypeModelKind::Interface { .. } | TypeModelKind::Union { .. })
        )
    }
}

impl TypeModel {
    fn from_definition(definition: &TypeDefinition) -> Self {
        let names = |names: &[async_graphql_parser::Positioned<async_graphql_value::Name>]| {
            names.iter().map(|name| name.node.to_string()).collect::<Vec<_>>()
        };

        let kind = match &definition.kind {
            TypeKind::Scalar => TypeModelKind::Scalar,
            TypeKind::Object(object) => TypeModelKind::Object {
                implements: names(&object.implements),
                fields: object.fields.iter().map(|field| FieldModel::from(&field.node)).collect(),
            },
            TypeKind::Interface(interface) => TypeModelKind::Interface {
                implements: names(&interface.implements),
                fields: interface.fields.iter().map(|field| FieldModel::from(&field.node)).collect(),
            },
            TypeKind::Union(union) => TypeModelKind::Union {
                members: names(&union.members),
            },
            TypeKind::Enum(enumeration) => TypeModelKind::Enum {
                values: enumeration
                    .values
                    .iter()
                    .map(|value| value.node.value.node.to_string())
                    .collect(),
            },
            TypeKind::InputObject(input) => TypeModelKind::InputObject {
                fields: input.fields.iter().map(|field| InputValueModel::from(&field.node)).collect(),
            },
        };

        TypeModel {
            name: definition.name.node.to_string(),
            description: definition.description.as_ref().map(|description| description.node.clone()),
            kind,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        match &self.kind {
            TypeModelKind::Object { fields, .. } | TypeModelKind::Interface { fields, .. } => {
                fields.iter().find(|field| field.name == name)
            }
            _ => None,
        }
    }
}

impl From<&async_graphql_parser::types::FieldDefinition> for FieldModel {
    fn from(definition: &async_graphql_parser::types::FieldDefinition) -> Self {
        FieldModel {
            name: definition.name.node.to_string(),
            description: definition.description.as_ref().map(|description| description.node.clone()),
            arguments: definition
                .arguments
                .iter()
                .map(|argument| InputValueModel::from(&argument.node))
                .collect(),
            ty: definition.ty.node.clone(),
        }
    }
}

/// The name at the bottom of list wrappers.
pub(crate) fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => named_type(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_mutation_default_names() {
        let model = SchemaModel::parse("type Query { a: String } type Mutation { b: Int }").unwrap();

        assert_eq!(model.query_type(), "Query");
        assert_eq!(model.mutation_type(), Some("Mutation"));
        assert!(model.is_root_type("Mutation"));
    }

    #[test]
    fn schema_definition_names_the_roots() {
        let model = SchemaModel::parse(
            r#"
            schema { query: Root }
            type Root { a: String }
            type Mutation { b: Int }
            "#,
        )
        .unwrap();

        assert_eq!(model.query_type(), "Root");
        assert_eq!(model.mutation_type(), Some("Mutation"));
    }

    #[test]
    fn extensions_are_merged() {
        let model = SchemaModel::parse(
            r#"
            extend type Query { b: Int }
            type Query { a: String }
            enum Color { RED }
            extend enum Color { GREEN }
            "#,
        )
        .unwrap();

        let query = model.type_named("Query").unwrap();
        assert!(query.field("a").is_some());
        assert!(query.field("b").is_some());

        let TypeModelKind::Enum { values } = &model.type_named("Color").unwrap().kind else {
            unreachable!()
        };
        assert_eq!(values, &["RED", "GREEN"]);
    }

    #[test]
    fn possible_types() {
        let model = SchemaModel::parse(
            r#"
            type Query { node: Node }
            interface Node { id: ID! }
            type User implements Node { id: ID! }
            type Post implements Node { id: ID! }
            type Tag { id: ID! }
            union Content = Post | Tag
            "#,
        )
        .unwrap();

        assert_eq!(model.possible_types("Node"), vec!["User", "Post"]);
        assert_eq!(model.possible_types("Content"), vec!["Post", "Tag"]);
        assert!(model.possible_types("User").is_empty());
        assert!(model.is_abstract("Content"));
        assert!(!model.is_abstract("Tag"));
    }

    #[test]
    fn errors() {
        let error = SchemaModel::parse("type Foo { a: String }").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Must provide schema definition with query type or a type named Query."
        );

        let error = SchemaModel::parse("type Query").unwrap_err();
        assert_eq!(error.to_string(), "Query fields must be an object with field names.");

        let error = SchemaModel::parse("type Query { a: String } extend type User { b: Int }").unwrap_err();
        assert_eq!(error.to_string(), "Cannot extend type: 'User' because it is not defined.");

        let error = SchemaModel::parse("type Query { a: String } extend enum Query { B }").unwrap_err();
        assert_eq!(error.to_string(), "Cannot extend type: 'Query' with a different kind of type.");

        let error = SchemaModel::parse("type Query { a: String } type Query { b: String }").unwrap_err();
        assert_eq!(error.to_string(), "Type: 'Query' is defined more than once.");
    }
}
