pub mod generators;

use serde_json::Value;

use super::{
    extract_arguments, required_type_name, Annotation, AnnotationFactory, ArgumentDescriptor, ArgumentType,
    DirectiveInfo,
};
use crate::{context::OperationContext, error::AnnotationError, mocks::Mocks, schema::SchemaModel, RootValue};

pub const MOCK_TAG: &str = "mock";

const ARGUMENTS: &[ArgumentDescriptor] = &[
    ArgumentDescriptor::required("value", ArgumentType::String),
    ArgumentDescriptor::optional("args", ArgumentType::String),
];

/// `@mock(value: "first_name", args: "[...]")` on a type or a field.
#[derive(Debug, Clone, PartialEq)]
pub struct MockAnnotation {
    pub value: String,
    pub args: Vec<Value>,
    pub type_name: String,
    pub field_name: Option<String>,
}

impl Annotation for MockAnnotation {
    fn apply(
        &self,
        _schema: &SchemaModel,
        mocks: &mut Mocks,
        _root_value: &mut RootValue,
        _context: &mut OperationContext,
    ) -> Result<(), AnnotationError> {
        if !generators::is_known(&self.value) {
            tracing::debug!(value = %self.value, "unknown mock generator, using the value as a literal");
        }

        let generator = generators::generator(&self.value, self.args.clone());
        let type_mock = mocks.type_mock(self.type_name.as_str());

        match &self.field_name {
            Some(field_name) => type_mock.insert_field(&self.type_name, field_name, generator)?,
            None => type_mock.set_base(generator),
        }

        tracing::debug!(type_name = %self.type_name, field_name = ?self.field_name, value = %self.value, "applied mock annotation");

        Ok(())
    }
}

pub struct MockAnnotationFactory;

impl AnnotationFactory for MockAnnotationFactory {
    fn tag(&self) -> &str {
        MOCK_TAG
    }

    fn build(
        &self,
        directive: &DirectiveInfo,
        type_name: Option<&str>,
        field_name: Option<&str>,
    ) -> Result<Option<Box<dyn Annotation>>, AnnotationError> {
        let arguments = extract_arguments(MOCK_TAG, &directive.arguments, ARGUMENTS)?;
        let type_name = required_type_name(MOCK_TAG, type_name)?;

        let args = match arguments.string("args") {
            Some(args) if !args.trim().is_empty() => parse_args(args.trim())?,
            _ => Vec::new(),
        };

        Ok(Some(Box::new(MockAnnotation {
            value: arguments.string("value").unwrap_or_default(),
            args,
            type_name,
            field_name: field_name.map(str::to_owned),
        })))
    }
}

fn parse_args(args: &str) -> Result<Vec<Value>, AnnotationError> {
    let invalid = |reason: String| AnnotationError::InvalidMockArguments {
        tag: MOCK_TAG.to_owned(),
        reason,
    };

    match serde_json::from_str(args).map_err(|error| invalid(error.to_string()))? {
        Value::Array(values) => Ok(values),
        other => Err(invalid(format!("got '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{context::OperationContext, schema::SchemaModel};

    fn schema() -> SchemaModel {
        SchemaModel::parse("type Query { foo: String bar: String }").unwrap()
    }

    fn apply(annotation: &dyn Annotation, mocks: &mut Mocks) -> Result<(), AnnotationError> {
        annotation.apply(
            &schema(),
            mocks,
            &mut RootValue::default(),
            &mut OperationContext::default(),
        )
    }

    fn build(directive: DirectiveInfo, type_name: Option<&str>, field_name: Option<&str>) -> Box<dyn Annotation> {
        MockAnnotationFactory
            .build(&directive, type_name, field_name)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn requires_a_value() {
        let error = MockAnnotationFactory
            .build(&DirectiveInfo::new("mock"), Some("Query"), None)
            .unwrap_err();

        assert_eq!(error.to_string(), "Missing required argument: 'value' in 'mock' annotation.");
    }

    #[test]
    fn requires_a_type_name() {
        let error = MockAnnotationFactory
            .build(&DirectiveInfo::new("mock").argument("value", "word"), None, None)
            .unwrap_err();

        assert_eq!(error.to_string(), "Type name is required in 'mock' annotation.");
    }

    #[test]
    fn args_must_be_a_json_array() {
        let directive = DirectiveInfo::new("mock")
            .argument("value", "date")
            .argument("args", r#"{"format": "YYYY"}"#);

        let error = MockAnnotationFactory.build(&directive, Some("Query"), None).unwrap_err();

        assert!(
            error
                .to_string()
                .starts_with("Arguments of 'mock' annotation must be a JSON array"),
            "{error}"
        );

        let directive = DirectiveInfo::new("mock")
            .argument("value", "date")
            .argument("args", "not json");

        assert!(MockAnnotationFactory.build(&directive, Some("Query"), None).is_err());
    }

    #[test]
    fn blank_args_mean_no_args() {
        for args in ["", "   "] {
            let directive = DirectiveInfo::new("mock").argument("value", "word").argument("args", args);

            let annotation = MockAnnotationFactory.build(&directive, Some("Query"), None).unwrap().unwrap();

            assert!(format!("{annotation:?}").contains("args: []"), "{annotation:?}");
        }
    }

    #[test]
    fn parses_args() {
        let directive = DirectiveInfo::new("mock")
            .argument("value", "integer")
            .argument("args", "[1, 3]");

        let annotation = MockAnnotationFactory
            .build(&directive, Some("Query"), Some("foo"))
            .unwrap()
            .unwrap();

        assert_eq!(
            format!("{annotation:?}"),
            format!(
                "{:?}",
                MockAnnotation {
                    value: "integer".into(),
                    args: vec![json!(1), json!(3)],
                    type_name: "Query".into(),
                    field_name: Some("foo".into()),
                }
            )
        );
    }

    #[test]
    fn type_level_mock() {
        let mut mocks = Mocks::new();
        let annotation = build(DirectiveInfo::new("mock").argument("value", "FOO"), Some("Foo"), None);

        apply(annotation.as_ref(), &mut mocks).unwrap();

        assert_eq!(mocks.mock("Foo"), Some(json!("FOO")));
    }

    #[test]
    fn field_level_mocks_compose() {
        let mut mocks = Mocks::new();

        for (field, value) in [("foo", "FOO"), ("bar", "BAR")] {
            let annotation = build(DirectiveInfo::new("mock").argument("value", value), Some("Query"), Some(field));
            apply(annotation.as_ref(), &mut mocks).unwrap();
        }

        assert_eq!(mocks.mock("Query"), Some(json!({ "foo": "FOO", "bar": "BAR" })));
    }

    #[test]
    fn type_mock_followed_by_field_mocks() {
        let mut mocks = Mocks::new();

        let annotation = build(
            DirectiveInfo::new("mock").argument("value", "random_element").argument("args", r#"[[{"baz": 1}]]"#),
            Some("Query"),
            None,
        );
        apply(annotation.as_ref(), &mut mocks).unwrap();

        for (field, value) in [("foo", "FOO"), ("bar", "BAR")] {
            let annotation = build(DirectiveInfo::new("mock").argument("value", value), Some("Query"), Some(field));
            apply(annotation.as_ref(), &mut mocks).unwrap();
        }

        assert_eq!(mocks.mock("Query"), Some(json!({ "baz": 1, "foo": "FOO", "bar": "BAR" })));
    }

    #[test]
    fn same_field_twice_fails() {
        let mut mocks = Mocks::new();
        let annotation = build(DirectiveInfo::new("mock").argument("value", "FOO"), Some("Query"), Some("foo"));

        apply(annotation.as_ref(), &mut mocks).unwrap();
        let error = apply(annotation.as_ref(), &mut mocks).unwrap_err();

        assert_eq!(error.to_string(), "Mock for field: 'foo' of type: Query already exists.");
    }
}
