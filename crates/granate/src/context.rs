use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use runtime::fetch::Fetcher;
use runtime_noop::fetch::NoopFetcher;
use serde_json::{Map, Value};

use crate::{
    annotations::{
        rest::{CoalescingLoader, RequestDefaults, DEFAULT_USER_AGENT},
        standard_annotation_factories, AnnotationFactory,
    },
    error::ResolverError,
    mocks::Mocks,
};

/// Variables available to `{{name}}` templates in annotation arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment(HashMap<String, String>);

impl Environment {
    /// A snapshot of the process environment.
    pub fn from_process() -> Self {
        Environment(std::env::vars().collect())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Environment(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Environment {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

/// State owned by a single operation: the request defaults written by annotations and the
/// loader deduplicating REST calls.
pub struct OperationContext {
    request_defaults: HashMap<String, RequestDefaults>,
    rest_loader: OnceLock<CoalescingLoader>,
    fetcher: Fetcher,
    environment: Environment,
    user_agent: String,
}

impl OperationContext {
    pub fn new(fetcher: Fetcher, environment: Environment) -> Self {
        OperationContext {
            request_defaults: HashMap::new(),
            rest_loader: OnceLock::new(),
            fetcher,
            environment,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The defaults of a type, created on first access.
    pub fn request_defaults_mut(&mut self, type_name: &str) -> &mut RequestDefaults {
        let user_agent = &self.user_agent;

        self.request_defaults
            .entry(type_name.to_owned())
            .or_insert_with(|| RequestDefaults::new(user_agent))
    }

    pub fn request_defaults(&self, type_name: &str) -> Option<&RequestDefaults> {
        self.request_defaults.get(type_name)
    }

    /// Created on first REST field access.
    pub fn rest_loader(&self) -> &CoalescingLoader {
        self.rest_loader
            .get_or_init(|| CoalescingLoader::new(self.fetcher.clone()))
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// A context for a new operation: same defaults, empty request cache.
    pub fn fork(&self) -> Self {
        OperationContext {
            request_defaults: self.request_defaults.clone(),
            rest_loader: OnceLock::new(),
            fetcher: self.fetcher.clone(),
            environment: self.environment.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new(NoopFetcher::runtime_fetcher(), Environment::default())
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("request_defaults", &self.request_defaults)
            .field("rest_loader", &self.rest_loader.get())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

pub type ResolverArguments = Map<String, Value>;

/// Resolves a root field: `(source, arguments, context)`.
pub type FieldResolver = Arc<
    dyn Fn(Value, ResolverArguments, Arc<OperationContext>) -> BoxFuture<'static, Result<Value, ResolverError>>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub enum RootField {
    Value(Value),
    Resolver(FieldResolver),
}

impl fmt::Debug for RootField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootField::Value(value) => f.debug_tuple("Value").field(value).finish(),
            RootField::Resolver(_) => f.write_str("Resolver"),
        }
    }
}

/// Values and resolvers for the fields of the root operation types.
#[derive(Debug, Clone, Default)]
pub struct RootValue {
    fields: IndexMap<String, RootField>,
}

impl RootValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_value(&mut self, field_name: impl Into<String>, value: Value) {
        self.fields.insert(field_name.into(), RootField::Value(value));
    }

    pub fn insert_resolver<F>(&mut self, field_name: impl Into<String>, resolver: F)
    where
        F: Fn(Value, ResolverArguments, Arc<OperationContext>) -> BoxFuture<'static, Result<Value, ResolverError>>
            + Send
            + Sync
            + 'static,
    {
        self.fields
            .insert(field_name.into(), RootField::Resolver(Arc::new(resolver)));
    }

    pub fn get(&self, field_name: &str) -> Option<&RootField> {
        self.fields.get(field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.fields.contains_key(field_name)
    }
}

/// Everything a schema build starts from.
pub struct GranateContext {
    pub root_value: RootValue,
    pub mocks: Mocks,
    pub annotation_factories: Vec<Box<dyn AnnotationFactory>>,
    pub fetcher: Fetcher,
    pub environment: Environment,
    pub user_agent: String,
}

impl Default for GranateContext {
    fn default() -> Self {
        GranateContext {
            root_value: RootValue::default(),
            mocks: Mocks::default(),
            annotation_factories: standard_annotation_factories(),
            fetcher: NoopFetcher::runtime_fetcher(),
            environment: Environment::from_process(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl GranateContext {
    pub fn with_root_value(mut self, root_value: RootValue) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn with_mocks(mut self, mocks: Mocks) -> Self {
        self.mocks = mocks;
        self
    }

    pub fn with_annotation_factories(mut self, factories: Vec<Box<dyn AnnotationFactory>>) -> Self {
        self.annotation_factories = factories;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
