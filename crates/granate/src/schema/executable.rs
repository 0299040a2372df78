use std::{collections::HashMap, sync::Arc};

use async_graphql::{
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface, InterfaceField, Object,
        ResolverContext, Scalar, Schema, TypeRef, Union,
    },
    Name, Request, Response, Variables,
};
use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::ConstValue;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use super::{named_type, FieldModel, InputValueModel, SchemaModel, TypeModelKind};
use crate::{
    context::{OperationContext, ResolverArguments, RootField, RootValue},
    error::{MockError, SchemaError},
    mocks::{default_scalar_mock, Mocks},
};

/// Number of items mocked for a list.
const MOCK_LIST_LENGTH: usize = 2;

/// An executable schema together with the build-time operation context.
pub struct GranateSchema {
    schema: Schema,
    model: Arc<SchemaModel>,
    mocks: Arc<Mocks>,
    context: OperationContext,
}

impl GranateSchema {
    /// Runs one operation. Every call gets its own [`OperationContext`], forked from the
    /// build-time one, so REST responses are never shared between operations.
    pub async fn execute(&self, query: &str, variables: Option<Value>) -> Response {
        let context = Arc::new(self.context.fork());
        let roots = OperationRoots::new(&self.model, &self.mocks);

        let mut request = Request::new(query).data(context).data(roots);

        if let Some(variables) = variables {
            request = request.variables(Variables::from_json(variables));
        }

        self.schema.execute(request).await
    }
}

impl std::fmt::Debug for GranateSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GranateSchema")
            .field("query", &self.model.query_type())
            .field("mocks", &self.mocks)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// The source objects of the root types for one operation: their mock, or an empty object.
pub(crate) struct OperationRoots(HashMap<String, Value>);

impl OperationRoots {
    pub(crate) fn new(model: &SchemaModel, mocks: &Mocks) -> Self {
        let roots = [Some(model.query_type()), model.mutation_type()]
            .into_iter()
            .flatten()
            .map(|name| {
                let value = mocks
                    .mock(name)
                    .filter(Value::is_object)
                    .unwrap_or_else(|| Value::Object(Map::new()));

                (name.to_owned(), value)
            })
            .collect();

        OperationRoots(roots)
    }

    fn get(&self, type_name: &str) -> Option<&Value> {
        self.0.get(type_name)
    }
}

pub(crate) fn build_executable_schema(
    model: SchemaModel,
    mocks: Mocks,
    root_value: RootValue,
    context: OperationContext,
) -> Result<GranateSchema, SchemaError> {
    let model = Arc::new(model);
    let mocks = Arc::new(mocks);
    let root_value = Arc::new(root_value);

    let mut builder = Schema::build(model.query_type(), model.mutation_type(), None);

    for definition in model.types() {
        let name = definition.name.as_str();

        builder = match &definition.kind {
            TypeModelKind::Scalar if is_builtin_scalar(name) => continue,
            TypeModelKind::Scalar => {
                let mut scalar = Scalar::new(name);

                if let Some(description) = &definition.description {
                    scalar = scalar.description(description);
                }

                builder.register(scalar)
            }
            TypeModelKind::Object { implements, fields } => {
                let mut object = Object::new(name);

                if let Some(description) = &definition.description {
                    object = object.description(description);
                }

                for interface in implements {
                    object = object.implement(interface);
                }

                for field in fields {
                    let binding = Arc::new(FieldBinding {
                        model: model.clone(),
                        mocks: mocks.clone(),
                        root_value: root_value.clone(),
                        parent_type: name.to_owned(),
                        field: field.clone(),
                    });

                    object = object.field(output_field(field, binding));
                }

                builder.register(object)
            }
            TypeModelKind::Interface { fields, .. } => {
                let mut interface = Interface::new(name);

                if let Some(description) = &definition.description {
                    interface = interface.description(description);
                }

                for field in fields {
                    let mut interface_field = InterfaceField::new(&field.name, type_ref(&field.ty));

                    for argument in &field.arguments {
                        interface_field = interface_field.argument(input_value(argument));
                    }

                    interface = interface.field(interface_field);
                }

                builder.register(interface)
            }
            TypeModelKind::Union { members } => {
                let union = members
                    .iter()
                    .fold(Union::new(name), |union, member| union.possible_type(member));

                builder.register(union)
            }
            TypeModelKind::Enum { values } => {
                let enumeration = values
                    .iter()
                    .fold(Enum::new(name), |enumeration, value| enumeration.item(EnumItem::new(value)));

                builder.register(enumeration)
            }
            TypeModelKind::InputObject { fields } => {
                let input = fields
                    .iter()
                    .fold(InputObject::new(name), |input, field| input.field(input_value(field)));

                builder.register(input)
            }
        };
    }

    let schema = builder
        .finish()
        .map_err(|error| SchemaError::Executable(error.to_string()))?;

    tracing::debug!(query = %model.query_type(), mutation = ?model.mutation_type(), "built executable schema");

    Ok(GranateSchema {
        schema,
        model,
        mocks,
        context,
    })
}

fn output_field(field: &FieldModel, binding: Arc<FieldBinding>) -> Field {
    let mut output = Field::new(&field.name, type_ref(&field.ty), move |ctx| {
        let binding = binding.clone();
        FieldFuture::new(async move { binding.resolve(ctx).await })
    });

    if let Some(description) = &field.description {
        output = output.description(description);
    }

    for argument in &field.arguments {
        output = output.argument(input_value(argument));
    }

    output
}

fn input_value(model: &InputValueModel) -> InputValue {
    let mut input = InputValue::new(&model.name, type_ref(&model.ty));

    if let Some(description) = &model.description {
        input = input.description(description);
    }

    if let Some(default_value) = &model.default_value {
        input = input.default_value(default_value.clone());
    }

    input
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.to_string()),
        BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };

    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn is_builtin_scalar(name: &str) -> bool {
    matches!(name, "String" | "Int" | "Float" | "Boolean" | "ID")
}

/// Everything the resolver of one output field needs.
struct FieldBinding {
    model: Arc<SchemaModel>,
    mocks: Arc<Mocks>,
    root_value: Arc<RootValue>,
    parent_type: String,
    field: FieldModel,
}

impl FieldBinding {
    /// The root value first, then the key of the parent object, then a mock of the field type.
    async fn resolve<'a>(&self, ctx: ResolverContext<'a>) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let is_root = self.model.is_root_type(&self.parent_type);

        let parent = match ctx.parent_value.try_downcast_ref::<Value>() {
            Ok(parent) => Some(parent),
            Err(_) if is_root => ctx.data::<OperationRoots>()?.get(&self.parent_type),
            Err(_) => None,
        };

        let root_field = self.root_value.get(&self.field.name).filter(|_| is_root);

        let value = match root_field {
            Some(RootField::Value(value)) => value.clone(),
            Some(RootField::Resolver(resolver)) => {
                let source = parent.cloned().unwrap_or(Value::Null);
                let arguments = arguments(&ctx)?;
                let context = ctx.data::<Arc<OperationContext>>()?.clone();

                resolver(source, arguments, context)
                    .await
                    .map_err(|error| async_graphql::Error::new(error.to_string()))?
            }
            None => match parent.and_then(|parent| parent.get(&self.field.name)) {
                Some(value) => value.clone(),
                None => mock_type(&self.model, &self.mocks, &self.field.ty)
                    .map_err(|error| async_graphql::Error::new(error.to_string()))?,
            },
        };

        to_field_value(&self.model, &self.field.ty, value)
    }
}

fn arguments(ctx: &ResolverContext<'_>) -> async_graphql::Result<ResolverArguments> {
    let mut arguments = ResolverArguments::new();

    for (name, value) in ctx.args.iter() {
        arguments.insert(name.to_string(), value.as_value().clone().into_json()?);
    }

    Ok(arguments)
}

/// A placeholder value for any output type.
fn mock_type(model: &SchemaModel, mocks: &Mocks, ty: &Type) -> Result<Value, MockError> {
    match &ty.base {
        BaseType::List(inner) => (0..MOCK_LIST_LENGTH)
            .map(|_| mock_type(model, mocks, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        BaseType::Named(name) => mock_named(model, mocks, name),
    }
}

fn mock_named(model: &SchemaModel, mocks: &Mocks, name: &str) -> Result<Value, MockError> {
    if model.is_abstract(name) {
        return mock_abstract(model, mocks, name);
    }

    if let Some(value) = mocks.mock(name).or_else(|| default_scalar_mock(name)) {
        return Ok(value);
    }

    let mut rng = rand::thread_rng();

    match model.type_named(name).map(|definition| &definition.kind) {
        Some(TypeModelKind::Enum { values }) => values
            .choose(&mut rng)
            .map(|value| Value::String(value.clone()))
            .ok_or_else(|| MockError::MissingMock(name.to_owned())),
        Some(TypeModelKind::Object { .. }) => Ok(Value::Object(Map::new())),
        _ => Err(MockError::MissingMock(name.to_owned())),
    }
}

/// A mock of a random possible type, tagged with its `__typename`.
fn mock_abstract(model: &SchemaModel, mocks: &Mocks, name: &str) -> Result<Value, MockError> {
    let mut value = match mocks.mock(name) {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    };

    if !value.contains_key("__typename") {
        let possible_types = model.possible_types(name);

        let Some(type_name) = possible_types.choose(&mut rand::thread_rng()) else {
            return Err(MockError::MissingMock(name.to_owned()));
        };

        if let Some(Value::Object(object)) = mocks.mock(type_name) {
            value.extend(object);
        }

        value.insert("__typename".to_owned(), Value::String((*type_name).to_owned()));
    }

    Ok(Value::Object(value))
}

fn to_field_value<'a>(model: &SchemaModel, ty: &Type, value: Value) -> async_graphql::Result<Option<FieldValue<'a>>> {
    if value.is_null() {
        return Ok(None);
    }

    match &ty.base {
        BaseType::List(inner) => {
            let Value::Array(items) = value else {
                return Err(async_graphql::Error::new(format!(
                    "Expected a list for a field of type: '{}'.",
                    named_type(ty)
                )));
            };

            let items = items
                .into_iter()
                .map(|item| Ok(to_field_value(model, inner, item)?.unwrap_or(FieldValue::NULL)))
                .collect::<async_graphql::Result<Vec<_>>>()?;

            Ok(Some(FieldValue::list(items)))
        }
        BaseType::Named(name) => {
            let kind = model.type_named(name).map(|definition| &definition.kind);

            let field_value = match kind {
                Some(TypeModelKind::Object { .. }) => FieldValue::owned_any(value),
                Some(TypeModelKind::Interface { .. } | TypeModelKind::Union { .. }) => {
                    let type_name = value
                        .get("__typename")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                        .or_else(|| model.possible_types(name).first().map(|name| (*name).to_owned()))
                        .ok_or_else(|| async_graphql::Error::new(format!("Type: '{name}' has no possible types.")))?;

                    FieldValue::owned_any(value).with_type(type_name)
                }
                Some(TypeModelKind::Enum { .. }) => match value {
                    Value::String(item) => FieldValue::value(ConstValue::Enum(Name::new(item))),
                    other => FieldValue::value(ConstValue::from_json(other)?),
                },
                _ => FieldValue::value(ConstValue::from_json(value)?),
            };

            Ok(Some(field_value))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn model() -> SchemaModel {
        SchemaModel::parse(
            r#"
            type Query { users: [User!]! node: Node color: Color }
            interface Node { id: ID! }
            type User implements Node { id: ID! name: String }
            enum Color { RED GREEN }
            scalar Date
            "#,
        )
        .unwrap()
    }

    fn list_of(name: &str) -> Type {
        Type::new(&format!("[{name}]")).unwrap()
    }

    #[test]
    fn lists_mock_two_items() {
        let value = mock_type(&model(), &Mocks::new(), &list_of("String")).unwrap();

        assert_eq!(value, json!(["Hello World", "Hello World"]));
    }

    #[test]
    fn abstract_types_pick_a_possible_type() {
        let value = mock_named(&model(), &Mocks::new(), "Node").unwrap();

        assert_eq!(value, json!({ "__typename": "User" }));
    }

    #[test]
    fn enums_pick_a_declared_value() {
        let value = mock_named(&model(), &Mocks::new(), "Color").unwrap();

        assert!(value == json!("RED") || value == json!("GREEN"));
    }

    #[test]
    fn custom_scalars_need_a_mock() {
        let mut mocks = Mocks::new();

        let error = mock_named(&model(), &mocks, "Date").unwrap_err();
        assert_eq!(error, MockError::MissingMock("Date".into()));

        mocks.insert("Date", || json!("2017-01-01"));
        assert_eq!(mock_named(&model(), &mocks, "Date").unwrap(), json!("2017-01-01"));
    }

    #[test]
    fn operation_roots_use_the_root_mock() {
        let mut mocks = Mocks::new();
        mocks.insert("Query", || json!({ "color": "RED" }));

        let roots = OperationRoots::new(&model(), &mocks);

        assert_eq!(roots.get("Query"), Some(&json!({ "color": "RED" })));
        assert_eq!(roots.get("Mutation"), None);
    }

    #[test]
    fn type_refs_keep_wrappers() {
        let ty = Type::new("[User!]!").unwrap();

        assert_eq!(type_ref(&ty).to_string(), "[User!]!");
    }
}
