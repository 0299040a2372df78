use std::{collections::HashMap, sync::OnceLock};

use regex::{Captures, Regex};
use runtime::fetch::parameter_to_string;
use serde_json::{Map, Value};

use crate::{context::Environment, error::AnnotationError, error::RestError};

fn template_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("must be valid"))
}

fn absolute_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").expect("must be valid"))
}

/// `scheme://...`
pub(crate) fn is_absolute_url(url: &str) -> bool {
    absolute_url_regex().is_match(url)
}

/// Replaces every `{{name}}` with the environment variable `name`. Values without a template
/// are returned as is.
pub(crate) fn resolve_environment(value: &str, environment: &Environment) -> Result<String, AnnotationError> {
    let mut missing = None;

    let resolved = template_regex().replace_all(value, |captures: &Captures<'_>| {
        let name = &captures[1];

        match environment.get(name) {
            Some(value) => value.to_owned(),
            None => {
                missing.get_or_insert_with(|| name.to_owned());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(AnnotationError::MissingEnvironmentVariable(name)),
        None => Ok(resolved.into_owned()),
    }
}

/// Substitutes the `{{name}}` tokens of a url with call arguments. Every argument used is
/// removed from `arguments`.
pub(crate) fn expand_url(url: &str, arguments: &mut Map<String, Value>) -> Result<String, RestError> {
    let mut substituted = HashMap::new();

    for captures in template_regex().captures_iter(url) {
        let name = &captures[1];

        if substituted.contains_key(name) {
            continue;
        }

        let value = arguments
            .remove(name)
            .ok_or_else(|| RestError::MissingUrlArgument(name.to_owned()))?;

        substituted.insert(name.to_owned(), parameter_to_string(&value));
    }

    let expanded = template_regex().replace_all(url, |captures: &Captures<'_>| {
        substituted.get(&captures[1]).cloned().unwrap_or_default()
    });

    Ok(expanded.into_owned())
}
