use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
use runtime::fetch::{FetchRequest, HeaderMap, Method};
use serde_json::Value;

use crate::error::RestError;

pub const DEFAULT_USER_AGENT: &str = "granate";

/// Request settings shared by every REST field of a type. Type level annotations write them,
/// field resolvers read them.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    pub json: bool,
    pub jar: bool,
    pub method: String,
    pub base_url: Option<String>,
    pub headers: IndexMap<String, String>,
}

impl RequestDefaults {
    pub fn new(user_agent: &str) -> Self {
        RequestDefaults {
            json: true,
            jar: true,
            method: "get".to_owned(),
            base_url: None,
            headers: IndexMap::from([("User-Agent".to_owned(), user_agent.to_owned())]),
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

/// A fully resolved outbound request.
///
/// Two descriptors are the same request when method, base url, url, parameters and result
/// field match. Headers and flags come from the type defaults and are not compared.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: String,
    pub base_url: Option<String>,
    /// The url template before substitution.
    pub path: String,
    pub url: String,
    pub parameters: BTreeMap<String, Value>,
    pub headers: IndexMap<String, String>,
    pub json: bool,
    pub jar: bool,
    pub result_field: Option<String>,
}

impl RequestDescriptor {
    /// `method:baseUrl:url:k=v:...:resultField` with parameters sorted by name.
    pub fn cache_key(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(":");

        format!(
            "{}:{}:{}:{parameters}:{}",
            self.method,
            self.base_url.as_deref().unwrap_or_default(),
            self.url,
            self.result_field.as_deref().unwrap_or_default()
        )
    }

    pub fn to_fetch_request(&self) -> Result<FetchRequest, RestError> {
        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())
            .map_err(|_| RestError::InvalidMethod(self.method.clone()))?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());

        for (name, value) in &self.headers {
            let invalid = || RestError::InvalidHeader(name.clone());

            headers.insert(
                http::HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?,
                http::HeaderValue::from_str(value).map_err(|_| invalid())?,
            );
        }

        Ok(FetchRequest {
            method,
            base_url: self.base_url.clone(),
            url: self.url.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            headers,
            json: self.json,
            cookies: self.jar,
        })
    }
}

impl PartialEq for RequestDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.base_url == other.base_url
            && self.url == other.url
            && self.parameters == other.parameters
            && self.result_field == other.result_field
    }
}

impl Eq for RequestDescriptor {}

impl Hash for RequestDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cache_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn descriptor(parameters: Value) -> RequestDescriptor {
        RequestDescriptor {
            method: "get".into(),
            base_url: Some("http://example.com".into()),
            path: "users/{{id}}".into(),
            url: "users/1".into(),
            parameters: serde_json::from_value(parameters).unwrap(),
            headers: RequestDefaults::default().headers,
            json: true,
            jar: true,
            result_field: Some("data".into()),
        }
    }

    #[test]
    fn cache_key_sorts_parameters() {
        let descriptor = descriptor(json!({ "b": "x", "a": 1 }));

        assert_eq!(descriptor.cache_key(), r#"get:http://example.com:users/1:a=1:b="x":data"#);
    }

    #[test]
    fn cache_key_without_optional_parts() {
        let descriptor = RequestDescriptor {
            base_url: None,
            result_field: None,
            ..descriptor(json!({}))
        };

        assert_eq!(descriptor.cache_key(), "get::users/1::");
    }

    #[test]
    fn distinct_parameters_are_distinct_requests() {
        let first = descriptor(json!({ "a": 1 }));
        let second = descriptor(json!({ "a": 2 }));

        assert_ne!(first.cache_key(), second.cache_key());
        assert_ne!(first, second);
        assert_eq!(first, descriptor(json!({ "a": 1 })));
    }

    #[test]
    fn headers_do_not_take_part_in_equality() {
        let mut other = descriptor(json!({}));
        other.headers.insert("Authorization".into(), "Basic abc".into());

        assert_eq!(descriptor(json!({})), other);
    }

    #[test]
    fn converts_to_fetch_request() {
        let mut descriptor = descriptor(json!({ "limit": 2 }));
        descriptor.method = "post".into();

        let request = descriptor.to_fetch_request().unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers["user-agent"], "granate");
        assert_eq!(request.parameters["limit"], json!(2));
        assert_eq!(request.resolved_url().unwrap().as_str(), "http://example.com/users/1");
    }

    #[test]
    fn invalid_method() {
        let mut descriptor = descriptor(json!({}));
        descriptor.method = "no method".into();

        let error = descriptor.to_fetch_request().unwrap_err();

        assert_eq!(error.to_string(), "Invalid HTTP method: 'no method'.");
    }
}
