use crate::annotations::ArgumentType;

/// Raised while extracting annotations from a schema or applying them.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("Syntax Error: {0}")]
    Syntax(#[from] async_graphql_parser::Error),
    #[error("Conversion for values of type: '{0}' not supported.")]
    UnsupportedValue(&'static str),
    #[error("Missing required argument: '{name}' in '{tag}' annotation.")]
    MissingArgument { name: String, tag: String },
    #[error("Argument: '{name}' in '{tag}' annotation should be of type: '{expected}' but is of type: '{actual}'.")]
    InvalidArgumentType {
        name: String,
        tag: String,
        expected: ArgumentType,
        actual: ArgumentType,
    },
    #[error("Argument: '{name}' in '{tag}' annotation should only contain values of type: 'string'.")]
    InvalidListItem { name: String, tag: String },
    #[error("Type name is required in '{0}' annotation.")]
    MissingTypeName(String),
    #[error("Arguments of '{tag}' annotation must be a JSON array: {reason}")]
    InvalidMockArguments { tag: String, reason: String },
    #[error("Annotation argument: 'url' is required when annotating a field.")]
    MissingUrl,
    #[error("Only annotation of query fields is supported.")]
    UnsupportedTarget,
    #[error("Only one of 'basicAuthorization' and 'tokenAuthorization' can be given in '{0}' annotation.")]
    ConflictingAuthorization(String),
    #[error("Custom header: '{0}' must have the form 'Name: value'.")]
    InvalidHeader(String),
    #[error("Environment variable: '{0}' is not defined.")]
    MissingEnvironmentVariable(String),
    #[error(transparent)]
    Mock(#[from] MockError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MockError {
    #[error("Mock for field: '{field_name}' of type: {type_name} already exists.")]
    FieldExists { type_name: String, field_name: String },
    #[error("No mock defined for type: '{0}'.")]
    MissingMock(String),
}

/// Raised while resolving a REST backed field. Cloneable so a single failure can be handed
/// to every caller waiting on the same request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RestError {
    #[error("Replacement value for url argument: '{0}' not found.")]
    MissingUrlArgument(String),
    #[error("Invalid HTTP method: '{0}'.")]
    InvalidMethod(String),
    #[error("Invalid header: '{0}'.")]
    InvalidHeader(String),
    #[error(transparent)]
    Fetch(#[from] runtime::fetch::FetchError),
}

/// The error type of root field resolvers.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error(transparent)]
    Rest(#[from] RestError),
    #[error("{0}")]
    Message(String),
}

impl ResolverError {
    pub fn message(error: impl ToString) -> Self {
        ResolverError::Message(error.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Must provide schema definition with query type or a type named Query.")]
    MissingQueryType,
    #[error("{0} fields must be an object with field names.")]
    EmptyFields(String),
    #[error("Cannot extend type: '{0}' because it is not defined.")]
    UnknownExtension(String),
    #[error("Cannot extend type: '{0}' with a different kind of type.")]
    ExtensionKindMismatch(String),
    #[error("Type: '{0}' is defined more than once.")]
    DuplicateType(String),
    #[error("Could not build the executable schema: {0}")]
    Executable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GranateError {
    #[error("Schema must be a non-empty string.")]
    EmptySchema,
    #[error("Query must be a non empty string.")]
    EmptyQuery,
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
