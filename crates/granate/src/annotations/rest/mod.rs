//! `@rest`: resolves root fields with HTTP calls.
//!
//! On a type the annotation only sets request defaults (base url, authorization, headers). On a
//! field of the query type it also installs a root resolver which builds a request from the url
//! template and the call arguments and hands it to the operation's [`CoalescingLoader`].

mod loader;
mod request;
mod template;

use std::{collections::BTreeMap, sync::Arc};

pub use loader::CoalescingLoader;
pub use request::{RequestDefaults, RequestDescriptor, DEFAULT_USER_AGENT};
use serde_json::Value;

use super::{
    extract_arguments, required_type_name, Annotation, AnnotationFactory, ArgumentDescriptor, ArgumentType,
    DirectiveInfo, ExtractedArguments,
};
use crate::{
    context::{Environment, OperationContext, ResolverArguments},
    error::{AnnotationError, RestError},
    mocks::Mocks,
    schema::SchemaModel,
    RootValue,
};

pub const REST_TAG: &str = "rest";

const ARGUMENTS: &[ArgumentDescriptor] = &[
    ArgumentDescriptor::optional("baseUrl", ArgumentType::String),
    ArgumentDescriptor::optional("url", ArgumentType::String),
    ArgumentDescriptor::optional("parameters", ArgumentType::List),
    ArgumentDescriptor::optional("method", ArgumentType::String),
    ArgumentDescriptor::optional("resultField", ArgumentType::String),
    ArgumentDescriptor::optional("basicAuthorization", ArgumentType::String),
    ArgumentDescriptor::optional("tokenAuthorization", ArgumentType::String),
    ArgumentDescriptor::optional("customHeaders", ArgumentType::List),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    Basic(String),
    Token(String),
}

impl Authorization {
    fn header_value(&self, environment: &Environment) -> Result<String, AnnotationError> {
        Ok(match self {
            Authorization::Basic(value) => format!("Basic {}", template::resolve_environment(value, environment)?),
            Authorization::Token(value) => format!("Token {}", template::resolve_environment(value, environment)?),
        })
    }
}

/// A `Name: value` header. The value may reference environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomHeader {
    pub name: String,
    pub value: String,
}

impl CustomHeader {
    fn parse(header: &str) -> Result<Self, AnnotationError> {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| AnnotationError::InvalidHeader(header.to_owned()))?;

        let name = name.trim();

        if name.is_empty() {
            return Err(AnnotationError::InvalidHeader(header.to_owned()));
        }

        Ok(CustomHeader {
            name: name.to_owned(),
            value: value.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestArguments {
    pub base_url: Option<String>,
    pub url: Option<String>,
    pub parameters: Option<Vec<String>>,
    pub method: Option<String>,
    pub result_field: Option<String>,
    pub authorization: Option<Authorization>,
    pub custom_headers: Vec<CustomHeader>,
}

impl RestArguments {
    fn from_extracted(arguments: &ExtractedArguments) -> Result<Self, AnnotationError> {
        let authorization = match (
            arguments.string("basicAuthorization"),
            arguments.string("tokenAuthorization"),
        ) {
            (Some(_), Some(_)) => return Err(AnnotationError::ConflictingAuthorization(REST_TAG.to_owned())),
            (Some(basic), None) => Some(Authorization::Basic(basic)),
            (None, Some(token)) => Some(Authorization::Token(token)),
            (None, None) => None,
        };

        let custom_headers = arguments
            .string_list(REST_TAG, "customHeaders")?
            .unwrap_or_default()
            .iter()
            .map(|header| CustomHeader::parse(header))
            .collect::<Result<_, _>>()?;

        Ok(RestArguments {
            base_url: arguments.string("baseUrl"),
            url: arguments.string("url"),
            parameters: arguments.string_list(REST_TAG, "parameters")?,
            method: arguments.string("method"),
            result_field: arguments.string("resultField"),
            authorization,
            custom_headers,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestAnnotation {
    pub type_name: String,
    pub field_name: Option<String>,
    pub arguments: RestArguments,
}

impl Annotation for RestAnnotation {
    fn apply(
        &self,
        schema: &SchemaModel,
        _mocks: &mut Mocks,
        root_value: &mut RootValue,
        context: &mut OperationContext,
    ) -> Result<(), AnnotationError> {
        let authorization = self
            .arguments
            .authorization
            .as_ref()
            .map(|authorization| authorization.header_value(context.environment()))
            .transpose()?;

        let custom_headers = self
            .arguments
            .custom_headers
            .iter()
            .map(|header| {
                template::resolve_environment(&header.value, context.environment())
                    .map(|value| (header.name.clone(), value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let base_url = self
            .arguments
            .base_url
            .as_ref()
            .map(|base_url| template::resolve_environment(base_url, context.environment()))
            .transpose()?;

        let defaults = context.request_defaults_mut(&self.type_name);

        if let Some(base_url) = &base_url {
            defaults.base_url = Some(base_url.clone());
        }

        if let Some(authorization) = authorization {
            defaults.headers.insert("Authorization".to_owned(), authorization);
        }

        defaults.headers.extend(custom_headers);

        let Some(field_name) = &self.field_name else {
            tracing::debug!(type_name = %self.type_name, "applied rest defaults");
            return Ok(());
        };

        if schema.query_type() != self.type_name {
            return Err(AnnotationError::UnsupportedTarget);
        }

        let url = self.arguments.url.clone().ok_or(AnnotationError::MissingUrl)?;

        let field = Arc::new(RestField {
            type_name: self.type_name.clone(),
            url,
            parameters: self.arguments.parameters.clone(),
            method: self.arguments.method.clone(),
            base_url,
            result_field: self.arguments.result_field.clone(),
        });

        root_value.insert_resolver(field_name.clone(), move |_source, arguments, context| {
            let field = field.clone();

            Box::pin(async move {
                let descriptor = field.descriptor(arguments, &context)?;
                let value = context.rest_loader().load(descriptor).await?;

                Ok(value.as_ref().clone())
            })
        });

        tracing::debug!(type_name = %self.type_name, field_name = %field_name, "installed rest resolver");

        Ok(())
    }
}

/// What a field resolver needs to build its requests.
#[derive(Debug)]
struct RestField {
    type_name: String,
    url: String,
    parameters: Option<Vec<String>>,
    method: Option<String>,
    base_url: Option<String>,
    result_field: Option<String>,
}

impl RestField {
    fn descriptor(
        &self,
        mut arguments: ResolverArguments,
        context: &OperationContext,
    ) -> Result<RequestDescriptor, RestError> {
        let defaults = context
            .request_defaults(&self.type_name)
            .cloned()
            .unwrap_or_else(|| RequestDefaults::new(context.user_agent()));

        let url = template::expand_url(&self.url, &mut arguments)?;

        let parameters: BTreeMap<String, Value> = match &self.parameters {
            Some(allowed) => allowed
                .iter()
                .filter_map(|name| arguments.remove(name).map(|value| (name.clone(), value)))
                .collect(),
            None => arguments.into_iter().collect(),
        };

        let base_url = if template::is_absolute_url(&url) {
            None
        } else {
            self.base_url.clone().or(defaults.base_url)
        };

        Ok(RequestDescriptor {
            method: self.method.clone().unwrap_or(defaults.method),
            base_url,
            path: self.url.clone(),
            url,
            parameters,
            headers: defaults.headers,
            json: defaults.json,
            jar: defaults.jar,
            result_field: self.result_field.clone(),
        })
    }
}

pub struct RestAnnotationFactory;

impl AnnotationFactory for RestAnnotationFactory {
    fn tag(&self) -> &str {
        REST_TAG
    }

    fn build(
        &self,
        directive: &DirectiveInfo,
        type_name: Option<&str>,
        field_name: Option<&str>,
    ) -> Result<Option<Box<dyn Annotation>>, AnnotationError> {
        let arguments = extract_arguments(REST_TAG, &directive.arguments, ARGUMENTS)?;
        let type_name = required_type_name(REST_TAG, type_name)?;

        Ok(Some(Box::new(RestAnnotation {
            type_name,
            field_name: field_name.map(str::to_owned),
            arguments: RestArguments::from_extracted(&arguments)?,
        })))
    }
}
