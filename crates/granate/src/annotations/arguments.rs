use indexmap::IndexMap;

use super::{ArgumentType, ArgumentValue, DirectiveArgument};
use crate::error::AnnotationError;

/// The declared shape of one directive argument.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentDescriptor {
    pub name: &'static str,
    pub ty: ArgumentType,
    pub required: bool,
}

impl ArgumentDescriptor {
    pub const fn required(name: &'static str, ty: ArgumentType) -> Self {
        ArgumentDescriptor {
            name,
            ty,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, ty: ArgumentType) -> Self {
        ArgumentDescriptor {
            name,
            ty,
            required: false,
        }
    }
}

/// Arguments which passed validation, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedArguments(IndexMap<String, ArgumentValue>);

impl ExtractedArguments {
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.0.get(name)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(ArgumentValue::as_str).map(str::to_owned)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A list argument whose items must all be strings.
    pub fn string_list(&self, tag: &str, name: &str) -> Result<Option<Vec<String>>, AnnotationError> {
        let Some(values) = self.get(name).and_then(ArgumentValue::as_list) else {
            return Ok(None);
        };

        values
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| AnnotationError::InvalidListItem {
                        name: name.to_owned(),
                        tag: tag.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Validates the raw directive arguments against `descriptors`. Undeclared arguments are ignored.
pub fn extract_arguments(
    tag: &str,
    arguments: &[DirectiveArgument],
    descriptors: &[ArgumentDescriptor],
) -> Result<ExtractedArguments, AnnotationError> {
    let mut extracted = IndexMap::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let Some(argument) = arguments.iter().find(|argument| argument.name == descriptor.name) else {
            if descriptor.required {
                return Err(AnnotationError::MissingArgument {
                    name: descriptor.name.to_owned(),
                    tag: tag.to_owned(),
                });
            }

            continue;
        };

        let actual = argument.value.argument_type();

        if descriptor.ty != ArgumentType::Any && descriptor.ty != actual {
            return Err(AnnotationError::InvalidArgumentType {
                name: descriptor.name.to_owned(),
                tag: tag.to_owned(),
                expected: descriptor.ty,
                actual,
            });
        }

        extracted.insert(descriptor.name.to_owned(), argument.value.clone());
    }

    Ok(ExtractedArguments(extracted))
}
