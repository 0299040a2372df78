//! Mock GraphQL servers from annotated SDL.
//!
//! Types and fields of a schema can be annotated with `@mock` to control the generated data,
//! and query fields with `@rest` to fetch their value from an HTTP endpoint. Identical REST
//! requests issued while resolving one operation are executed once.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod annotations;
mod context;
mod error;
mod mocks;
mod schema;

use serde_json::Value;

pub use context::{
    Environment, FieldResolver, GranateContext, OperationContext, ResolverArguments, RootField, RootValue,
};
pub use error::{AnnotationError, GranateError, MockError, ResolverError, RestError, SchemaError};
pub use mocks::{MockFactory, Mocks, TypeMockBuilder};
pub use schema::{FieldModel, GranateSchema, InputValueModel, SchemaModel, TypeModel, TypeModelKind};

use annotations::AnnotationExtractor;

/// Parses the schema, applies its annotations and builds the executable schema.
pub fn build_schema_and_context(schema: &str, context: GranateContext) -> Result<GranateSchema, GranateError> {
    if schema.trim().is_empty() {
        return Err(GranateError::EmptySchema);
    }

    let GranateContext {
        mut root_value,
        mut mocks,
        annotation_factories,
        fetcher,
        environment,
        user_agent,
    } = context;

    let document = async_graphql_parser::parse_schema(schema).map_err(AnnotationError::from)?;
    let model = SchemaModel::from_document(&document)?;

    let annotations = AnnotationExtractor::new(annotation_factories).extract(&document)?;
    let mut operation_context = OperationContext::new(fetcher, environment).with_user_agent(user_agent);

    for annotation in &annotations {
        annotation.apply(&model, &mut mocks, &mut root_value, &mut operation_context)?;
    }

    tracing::debug!(annotations = annotations.len(), "applied schema annotations");

    Ok(schema::build_executable_schema(
        model,
        mocks,
        root_value,
        operation_context,
    )?)
}

/// Runs a query against an annotated schema and returns the GraphQL response.
///
/// Errors raised while executing the query end up in the `errors` of the response, only
/// configuration problems are returned as `Err`.
pub async fn granate(
    schema: &str,
    query: &str,
    variables: Option<Value>,
    context: GranateContext,
) -> Result<Value, GranateError> {
    if query.trim().is_empty() {
        return Err(GranateError::EmptyQuery);
    }

    let schema = build_schema_and_context(schema, context)?;
    let response = schema.execute(query, variables).await;

    Ok(serde_json::to_value(&response)?)
}
