use std::sync::Arc;

use serde_json::{Map, Value};

pub use http::{HeaderMap, Method, StatusCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    AnyError(String),
    #[error("Invalid request url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The upstream answered with anything but `200 OK`. The message is the status reason phrase.
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl FetchError {
    pub fn any(error: impl ToString) -> Self {
        FetchError::AnyError(error.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// A single outbound HTTP call.
///
/// For `GET` requests the parameters are sent as the query string, for every other method they
/// make up the request body.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: http::Method,
    pub base_url: Option<String>,
    pub url: String,
    pub parameters: Map<String, Value>,
    pub headers: http::HeaderMap,
    /// Encode the body as JSON and decode the response as JSON.
    pub json: bool,
    /// Keep cookies between requests.
    pub cookies: bool,
}

impl FetchRequest {
    /// Joins the base url and the url. An absolute url should come without a base url.
    pub fn resolved_url(&self) -> FetchResult<url::Url> {
        let joined = match &self.base_url {
            Some(base_url) => format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                self.url.trim_start_matches('/')
            ),
            None => self.url.clone(),
        };

        url::Url::parse(&joined).map_err(|error| FetchError::InvalidUrl {
            url: joined,
            reason: error.to_string(),
        })
    }

    /// Query string pairs built from the parameters.
    pub fn query_pairs(&self) -> Vec<(&str, String)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), parameter_to_string(value)))
            .collect()
    }
}

/// Strings are used as is, everything else is rendered as JSON.
pub fn parameter_to_string(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: http::StatusCode,
    pub body: Value,
}

#[async_trait::async_trait]
pub trait FetcherInner: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<FetchResponse>;
}

#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<dyn FetcherInner>,
}

impl Fetcher {
    pub fn new(fetcher: impl FetcherInner + 'static) -> Fetcher {
        Fetcher {
            inner: Arc::new(fetcher),
        }
    }
}

impl std::ops::Deref for Fetcher {
    type Target = dyn FetcherInner;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(base_url: Option<&str>, url: &str) -> FetchRequest {
        FetchRequest {
            method: http::Method::GET,
            base_url: base_url.map(str::to_owned),
            url: url.to_owned(),
            parameters: Map::new(),
            headers: http::HeaderMap::new(),
            json: true,
            cookies: true,
        }
    }

    #[test]
    fn joins_base_url_and_url() {
        let url = request(Some("http://example.com/api/"), "/users/1").resolved_url().unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/users/1");

        let url = request(Some("http://example.com"), "users").resolved_url().unwrap();
        assert_eq!(url.as_str(), "http://example.com/users");
    }

    #[test]
    fn absolute_url_without_base() {
        let url = request(None, "https://example.com/a?b=c").resolved_url().unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?b=c");
    }

    #[test]
    fn relative_url_without_base_is_rejected() {
        let error = request(None, "users/1").resolved_url().unwrap_err();
        assert!(matches!(error, FetchError::InvalidUrl { .. }), "{error:?}");
    }

    #[test]
    fn query_pairs_render_non_strings_as_json() {
        let mut request = request(Some("http://example.com"), "search");
        request.parameters.insert("q".into(), Value::from("rust"));
        request.parameters.insert("limit".into(), Value::from(10));
        request.parameters.insert("exact".into(), Value::from(true));

        assert_eq!(
            request.query_pairs(),
            vec![("q", "rust".to_owned()), ("limit", "10".to_owned()), ("exact", "true".to_owned())]
        );
    }
}
