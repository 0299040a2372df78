use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use rand::Rng;
use serde_json::{Map, Value};

use crate::error::MockError;

/// Produces placeholder data for a type or a field.
pub type MockFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// The mock of a single type: an optional base factory plus generators for individual fields.
///
/// Building merges the fields on top of whatever the base produces.
#[derive(Clone, Default)]
pub struct TypeMockBuilder {
    base: Option<MockFactory>,
    fields: IndexMap<String, MockFactory>,
}

impl TypeMockBuilder {
    /// Field generators added before stay in place.
    pub fn set_base(&mut self, factory: MockFactory) {
        self.base = Some(factory);
    }

    pub fn insert_field(&mut self, type_name: &str, field_name: &str, factory: MockFactory) -> Result<(), MockError> {
        let base_has_field = self
            .base
            .as_ref()
            .map(|base| base().get(field_name).is_some_and(|value| !value.is_null()))
            .unwrap_or_default();

        if base_has_field || self.fields.contains_key(field_name) {
            return Err(MockError::FieldExists {
                type_name: type_name.to_owned(),
                field_name: field_name.to_owned(),
            });
        }

        self.fields.insert(field_name.to_owned(), factory);

        Ok(())
    }

    pub fn build(&self) -> MockFactory {
        let base = self.base.clone();
        let fields = self.fields.clone();

        if fields.is_empty() {
            if let Some(base) = base {
                return base;
            }
        }

        Arc::new(move || {
            let mut object = match base.as_ref().map(|base| base()) {
                Some(Value::Object(object)) => object,
                _ => Map::new(),
            };

            for (name, factory) in &fields {
                object.insert(name.clone(), factory());
            }

            Value::Object(object)
        })
    }
}

/// Mocks by type name.
#[derive(Clone, Default)]
pub struct Mocks {
    types: IndexMap<String, TypeMockBuilder>,
}

impl Mocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base mock of a type.
    pub fn insert(&mut self, type_name: impl Into<String>, factory: impl Fn() -> Value + Send + Sync + 'static) {
        self.type_mock(type_name).set_base(Arc::new(factory));
    }

    pub fn type_mock(&mut self, type_name: impl Into<String>) -> &mut TypeMockBuilder {
        self.types.entry(type_name.into()).or_default()
    }

    pub fn factory(&self, type_name: &str) -> Option<MockFactory> {
        self.types.get(type_name).map(TypeMockBuilder::build)
    }

    /// Runs the mock of a type.
    pub fn mock(&self, type_name: &str) -> Option<Value> {
        self.factory(type_name).map(|factory| factory())
    }
}

impl fmt::Debug for Mocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

/// Placeholder values for the built-in scalars.
pub(crate) fn default_scalar_mock(type_name: &str) -> Option<Value> {
    let mut rng = rand::thread_rng();

    let value = match type_name {
        "String" => Value::from("Hello World"),
        "Int" => Value::from(rng.gen_range(-100..=100_i64)),
        "Float" => Value::from(rng.gen_range(-100.0..100.0_f64)),
        "Boolean" => Value::from(rng.gen::<bool>()),
        "ID" => Value::from(uuid::Uuid::new_v4().to_string()),
        _ => return None,
    };

    Some(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn constant(value: Value) -> MockFactory {
        Arc::new(move || value.clone())
    }

    #[test]
    fn field_mocks_compose() {
        let mut mocks = Mocks::new();

        let builder = mocks.type_mock("Query");
        builder.insert_field("Query", "foo", constant(json!("a"))).unwrap();
        builder.insert_field("Query", "bar", constant(json!(1))).unwrap();

        assert_eq!(mocks.mock("Query"), Some(json!({ "foo": "a", "bar": 1 })));
    }

    #[test]
    fn field_mocks_merge_with_type_mock() {
        let mut mocks = Mocks::new();
        mocks.insert("User", || json!({ "name": "Jane" }));
        mocks.type_mock("User").insert_field("User", "age", constant(json!(30))).unwrap();

        assert_eq!(mocks.mock("User"), Some(json!({ "name": "Jane", "age": 30 })));
    }

    #[test]
    fn field_collisions_are_rejected() {
        let mut mocks = Mocks::new();
        mocks.type_mock("Query").insert_field("Query", "foo", constant(json!("a"))).unwrap();

        let error = mocks
            .type_mock("Query")
            .insert_field("Query", "foo", constant(json!("b")))
            .unwrap_err();

        assert_eq!(error.to_string(), "Mock for field: 'foo' of type: Query already exists.");
    }

    #[test]
    fn collisions_with_the_type_mock_are_rejected() {
        let mut mocks = Mocks::new();
        mocks.insert("User", || json!({ "name": "Jane", "age": null }));

        let builder = mocks.type_mock("User");
        assert!(builder.insert_field("User", "name", constant(json!("John"))).is_err());
        assert!(builder.insert_field("User", "age", constant(json!(30))).is_ok());
    }

    #[test]
    fn falsy_type_mock_values_still_collide() {
        let mut mocks = Mocks::new();
        mocks.insert("User", || json!({ "age": 0, "active": false, "name": "" }));

        let builder = mocks.type_mock("User");

        for field in ["age", "active", "name"] {
            let error = builder.insert_field("User", field, constant(json!(1))).unwrap_err();
            assert_eq!(
                error,
                MockError::FieldExists {
                    type_name: "User".into(),
                    field_name: field.into(),
                }
            );
        }
    }

    #[test]
    fn replacing_the_type_mock_keeps_fields() {
        let mut mocks = Mocks::new();
        mocks.type_mock("User").insert_field("User", "age", constant(json!(30))).unwrap();
        mocks.insert("User", || json!({ "name": "Jane" }));

        assert_eq!(mocks.mock("User"), Some(json!({ "name": "Jane", "age": 30 })));
    }

    #[test]
    fn scalar_type_mocks_are_kept_as_is() {
        let mut mocks = Mocks::new();
        mocks.insert("Date", || json!("2017-01-01"));

        assert_eq!(mocks.mock("Date"), Some(json!("2017-01-01")));
    }

    #[test]
    fn default_scalars() {
        assert_eq!(default_scalar_mock("String"), Some(json!("Hello World")));

        let int = default_scalar_mock("Int").and_then(|value| value.as_i64()).unwrap();
        assert!((-100..=100).contains(&int));

        let id = default_scalar_mock("ID").unwrap();
        assert!(uuid::Uuid::parse_str(id.as_str().unwrap()).is_ok());

        assert_eq!(default_scalar_mock("Date"), None);
    }
}
