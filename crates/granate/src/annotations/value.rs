use std::fmt;

use async_graphql_value::ConstValue;

use crate::error::AnnotationError;

/// A literal given as a directive argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    String(String),
    Boolean(bool),
    Int(i64),
    Float(f64),
    List(Vec<ArgumentValue>),
}

/// The declared type of a directive argument. `Any` accepts every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Any,
    String,
    Boolean,
    Int,
    Float,
    List,
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgumentType::Any => "any",
            ArgumentType::String => "string",
            ArgumentType::Boolean => "boolean",
            ArgumentType::Int => "int",
            ArgumentType::Float => "float",
            ArgumentType::List => "list",
        };

        f.write_str(name)
    }
}

impl ArgumentValue {
    pub fn argument_type(&self) -> ArgumentType {
        match self {
            ArgumentValue::String(_) => ArgumentType::String,
            ArgumentValue::Boolean(_) => ArgumentType::Boolean,
            ArgumentValue::Int(_) => ArgumentType::Int,
            ArgumentValue::Float(_) => ArgumentType::Float,
            ArgumentValue::List(_) => ArgumentType::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgumentValue]> {
        match self {
            ArgumentValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl TryFrom<&ConstValue> for ArgumentValue {
    type Error = AnnotationError;

    fn try_from(value: &ConstValue) -> Result<Self, Self::Error> {
        match value {
            ConstValue::String(value) => Ok(ArgumentValue::String(value.clone())),
            ConstValue::Boolean(value) => Ok(ArgumentValue::Boolean(*value)),
            ConstValue::Number(number) => match number.as_i64() {
                Some(value) => Ok(ArgumentValue::Int(value)),
                None => number
                    .as_f64()
                    .map(ArgumentValue::Float)
                    .ok_or(AnnotationError::UnsupportedValue("FloatValue")),
            },
            ConstValue::List(values) => values
                .iter()
                .map(ArgumentValue::try_from)
                .collect::<Result<_, _>>()
                .map(ArgumentValue::List),
            ConstValue::Null => Err(AnnotationError::UnsupportedValue("NullValue")),
            ConstValue::Enum(_) => Err(AnnotationError::UnsupportedValue("EnumValue")),
            ConstValue::Object(_) => Err(AnnotationError::UnsupportedValue("ObjectValue")),
            ConstValue::Binary(_) => Err(AnnotationError::UnsupportedValue("BinaryValue")),
        }
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_owned())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Int(value)
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        ArgumentValue::Float(value)
    }
}

impl<T: Into<ArgumentValue>> From<Vec<T>> for ArgumentValue {
    fn from(values: Vec<T>) -> Self {
        ArgumentValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::{Name, Number};
    use indexmap::IndexMap;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ConstValue::String("hello".into()), ArgumentValue::from("hello"))]
    #[case(ConstValue::Boolean(true), ArgumentValue::Boolean(true))]
    #[case(ConstValue::Number(42.into()), ArgumentValue::Int(42))]
    #[case(ConstValue::Number(Number::from_f64(32.5).unwrap()), ArgumentValue::Float(32.5))]
    #[case(
        ConstValue::List(vec![ConstValue::String("a".into()), ConstValue::String("b".into())]),
        ArgumentValue::from(vec!["a", "b"])
    )]
    fn converts_literals(#[case] literal: ConstValue, #[case] expected: ArgumentValue) {
        assert_eq!(ArgumentValue::try_from(&literal).unwrap(), expected);
    }

    #[rstest]
    #[case(ConstValue::Enum(Name::new("NOT_SUPPORTED")), "EnumValue")]
    #[case(ConstValue::Object(IndexMap::new()), "ObjectValue")]
    #[case(ConstValue::Null, "NullValue")]
    #[case(ConstValue::List(vec![ConstValue::Null]), "NullValue")]
    fn rejects_other_literals(#[case] literal: ConstValue, #[case] kind: &str) {
        let error = ArgumentValue::try_from(&literal).unwrap_err();

        assert_eq!(
            error.to_string(),
            format!("Conversion for values of type: '{kind}' not supported.")
        );
    }
}
