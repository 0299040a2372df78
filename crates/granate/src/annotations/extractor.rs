use std::collections::HashMap;

use async_graphql_parser::types::ServiceDocument;

use super::{
    directives::{extract_directive_contexts, DirectiveContext},
    Annotation, AnnotationFactory, ArgumentValue, DirectiveArgument, DirectiveInfo,
};
use crate::error::AnnotationError;

/// Either SDL text or an already parsed document.
#[derive(Debug, Clone, Copy)]
pub enum SchemaSource<'a> {
    Text(&'a str),
    Document(&'a ServiceDocument),
}

impl<'a> From<&'a str> for SchemaSource<'a> {
    fn from(text: &'a str) -> Self {
        SchemaSource::Text(text)
    }
}

impl<'a> From<&'a ServiceDocument> for SchemaSource<'a> {
    fn from(document: &'a ServiceDocument) -> Self {
        SchemaSource::Document(document)
    }
}

/// Turns the directives of a schema into annotations, using the factory registered for each
/// directive name. Directives without a factory are left alone.
pub struct AnnotationExtractor {
    factories: HashMap<String, Box<dyn AnnotationFactory>>,
}

impl AnnotationExtractor {
    /// A later factory replaces an earlier one with the same tag.
    pub fn new(factories: Vec<Box<dyn AnnotationFactory>>) -> Self {
        AnnotationExtractor {
            factories: factories
                .into_iter()
                .map(|factory| (factory.tag().to_owned(), factory))
                .collect(),
        }
    }

    pub fn parse<'a>(&self, schema: impl Into<SchemaSource<'a>>) -> Result<Vec<Box<dyn Annotation>>, AnnotationError> {
        match schema.into() {
            SchemaSource::Text(text) => {
                let document = async_graphql_parser::parse_schema(text)?;
                self.extract(&document)
            }
            SchemaSource::Document(document) => self.extract(document),
        }
    }

    /// Annotations come out in document order.
    pub fn extract(&self, document: &ServiceDocument) -> Result<Vec<Box<dyn Annotation>>, AnnotationError> {
        let mut annotations = Vec::new();

        for ctx in extract_directive_contexts(document) {
            let tag = ctx.directive.name.node.as_str();

            let Some(factory) = self.factories.get(tag) else {
                tracing::trace!(tag, "no annotation factory registered, skipping directive");
                continue;
            };

            let directive = directive_info(&ctx)?;
            let (type_name, field_name) = ctx.target_names();

            match factory.build(&directive, type_name, field_name)? {
                Some(annotation) => {
                    tracing::debug!(tag, type_name, field_name, "extracted annotation");
                    annotations.push(annotation);
                }
                None => tracing::trace!(tag, type_name, field_name, "annotation factory skipped directive"),
            }
        }

        Ok(annotations)
    }
}

fn directive_info(ctx: &DirectiveContext<'_>) -> Result<DirectiveInfo, AnnotationError> {
    let arguments = ctx
        .directive
        .arguments
        .iter()
        .map(|(name, value)| {
            Ok(DirectiveArgument {
                name: name.node.to_string(),
                value: ArgumentValue::try_from(&value.node)?,
            })
        })
        .collect::<Result<_, AnnotationError>>()?;

    Ok(DirectiveInfo {
        tag: ctx.directive.name.node.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use indoc::indoc;

    use super::*;
    use crate::{context::OperationContext, mocks::Mocks, schema::SchemaModel, RootValue};

    #[derive(Debug, Clone, PartialEq)]
    struct Built {
        directive: DirectiveInfo,
        type_name: Option<String>,
        field_name: Option<String>,
    }

    #[derive(Debug)]
    struct Recorded;

    impl Annotation for Recorded {
        fn apply(
            &self,
            _: &SchemaModel,
            _: &mut Mocks,
            _: &mut RootValue,
            _: &mut OperationContext,
        ) -> Result<(), AnnotationError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingFactory {
        tag: &'static str,
        skip: bool,
        built: Arc<Mutex<Vec<Built>>>,
    }

    impl RecordingFactory {
        fn new(tag: &'static str) -> Self {
            RecordingFactory {
                tag,
                ..Default::default()
            }
        }

        fn built(&self) -> Vec<Built> {
            self.built.lock().unwrap().clone()
        }
    }

    impl AnnotationFactory for RecordingFactory {
        fn tag(&self) -> &str {
            self.tag
        }

        fn build(
            &self,
            directive: &DirectiveInfo,
            type_name: Option<&str>,
            field_name: Option<&str>,
        ) -> Result<Option<Box<dyn Annotation>>, AnnotationError> {
            self.built.lock().unwrap().push(Built {
                directive: directive.clone(),
                type_name: type_name.map(str::to_owned),
                field_name: field_name.map(str::to_owned),
            });

            Ok((!self.skip).then(|| Box::new(Recorded) as Box<dyn Annotation>))
        }
    }

    #[test]
    fn builds_annotations_for_fields() {
        let factory = RecordingFactory::new("bar");
        let extractor = AnnotationExtractor::new(vec![Box::new(factory.clone())]);

        let annotations = extractor
            .parse(indoc! {r#"
                type Query {
                  foo: String @bar(string: "hello world!", int: 42, float: 32.5, boolean: true)
                }
            "#})
            .unwrap();

        assert_eq!(annotations.len(), 1);
        assert_eq!(
            factory.built(),
            vec![Built {
                directive: DirectiveInfo::new("bar")
                    .argument("string", "hello world!")
                    .argument("int", 42_i64)
                    .argument("float", 32.5)
                    .argument("boolean", true),
                type_name: Some("Query".to_owned()),
                field_name: Some("foo".to_owned()),
            }]
        );
    }

    #[test]
    fn builds_annotations_for_types() {
        let factory = RecordingFactory::new("bar");
        let extractor = AnnotationExtractor::new(vec![Box::new(factory.clone())]);

        extractor
            .parse(indoc! {r#"
                type Query @bar(list: ["a", "b"]) {
                  foo: String
                }
            "#})
            .unwrap();

        assert_eq!(
            factory.built(),
            vec![Built {
                directive: DirectiveInfo::new("bar").argument("list", vec!["a", "b"]),
                type_name: Some("Query".to_owned()),
                field_name: None,
            }]
        );
    }

    #[test]
    fn accepts_parsed_documents() {
        let factory = RecordingFactory::new("bar");
        let extractor = AnnotationExtractor::new(vec![Box::new(factory.clone())]);
        let document = async_graphql_parser::parse_schema("type Query { foo: String @bar }").unwrap();

        let annotations = extractor.parse(&document).unwrap();

        assert_eq!(annotations.len(), 1);
        assert_eq!(factory.built()[0].directive, DirectiveInfo::new("bar"));
    }

    #[test]
    fn skips_unregistered_directives() {
        let factory = RecordingFactory::new("bar");
        let extractor = AnnotationExtractor::new(vec![Box::new(factory.clone())]);

        let annotations = extractor
            .parse(indoc! {r#"
                type Query @other(value: NOT_SUPPORTED) {
                  foo: String @baz
                  bar: String @bar
                }
            "#})
            .unwrap();

        assert_eq!(annotations.len(), 1);
        assert_eq!(factory.built()[0].field_name.as_deref(), Some("bar"));
    }

    #[test]
    fn skips_when_factory_builds_nothing() {
        let factory = RecordingFactory {
            skip: true,
            ..RecordingFactory::new("bar")
        };
        let extractor = AnnotationExtractor::new(vec![Box::new(factory.clone())]);

        let annotations = extractor.parse("type Query { foo: String @bar }").unwrap();

        assert!(annotations.is_empty());
        assert_eq!(factory.built().len(), 1);
    }

    #[test]
    fn unsupported_argument_values_abort_extraction() {
        let extractor = AnnotationExtractor::new(vec![Box::new(RecordingFactory::new("bar"))]);

        let error = extractor
            .parse("type Query { foo: String @bar(value: NOT_SUPPORTED) }")
            .unwrap_err();

        assert_eq!(error.to_string(), "Conversion for values of type: 'EnumValue' not supported.");
    }

    #[test]
    fn syntax_errors_are_reported() {
        let extractor = AnnotationExtractor::new(Vec::new());

        let error = extractor.parse("type Query {").unwrap_err();

        assert!(matches!(error, AnnotationError::Syntax(_)), "{error:?}");
    }
}
