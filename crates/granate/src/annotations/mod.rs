//! Schema annotations: directives attached to types and fields which are turned into
//! runtime behaviour, either mock data generators or REST backed resolvers.

mod arguments;
mod directives;
mod extractor;
pub mod mock;
pub mod rest;
mod value;

use std::fmt;

pub use arguments::{extract_arguments, ArgumentDescriptor, ExtractedArguments};
pub use directives::{extract_directive_contexts, AstNode, DirectiveContext, NodeKind};
pub use extractor::{AnnotationExtractor, SchemaSource};
pub use value::{ArgumentType, ArgumentValue};

use crate::{context::OperationContext, error::AnnotationError, mocks::Mocks, schema::SchemaModel, RootValue};

/// A directive argument with its value already converted.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveArgument {
    pub name: String,
    pub value: ArgumentValue,
}

/// The directive an annotation is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveInfo {
    pub tag: String,
    pub arguments: Vec<DirectiveArgument>,
}

impl DirectiveInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        DirectiveInfo {
            tag: tag.into(),
            arguments: Vec::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.arguments.push(DirectiveArgument {
            name: name.into(),
            value: value.into(),
        });

        self
    }
}

/// Runtime behaviour produced from a single directive occurrence.
///
/// `apply` runs once per schema build, before any operation executes. It may register mocks,
/// install root field resolvers and mutate the request defaults held by the operation context.
pub trait Annotation: Send + Sync + fmt::Debug {
    fn apply(
        &self,
        schema: &SchemaModel,
        mocks: &mut Mocks,
        root_value: &mut RootValue,
        context: &mut OperationContext,
    ) -> Result<(), AnnotationError>;
}

/// Builds annotations for every directive named [`AnnotationFactory::tag`].
pub trait AnnotationFactory: Send + Sync {
    fn tag(&self) -> &str;

    /// Returning `Ok(None)` skips the directive occurrence.
    fn build(
        &self,
        directive: &DirectiveInfo,
        type_name: Option<&str>,
        field_name: Option<&str>,
    ) -> Result<Option<Box<dyn Annotation>>, AnnotationError>;
}

/// The `@mock` and `@rest` factories.
pub fn standard_annotation_factories() -> Vec<Box<dyn AnnotationFactory>> {
    vec![Box::new(mock::MockAnnotationFactory), Box::new(rest::RestAnnotationFactory)]
}

/// Both standard annotations need a type to attach to.
pub(crate) fn required_type_name(tag: &str, type_name: Option<&str>) -> Result<String, AnnotationError> {
    type_name
        .map(str::to_owned)
        .ok_or_else(|| AnnotationError::MissingTypeName(tag.to_owned()))
}
