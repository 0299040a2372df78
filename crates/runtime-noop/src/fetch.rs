use runtime::fetch::{FetchError, FetchRequest, FetchResponse, FetchResult, Fetcher, FetcherInner};

#[derive(thiserror::Error, Debug)]
pub enum NoopError {
    #[error("No HTTP transport is configured, cannot fetch '{0}'")]
    FetchNotAvailable(String),
}

/// Used when no transport was configured. Every request fails.
pub struct NoopFetcher;

impl NoopFetcher {
    pub fn runtime_fetcher() -> Fetcher {
        Fetcher::new(NoopFetcher)
    }
}

#[async_trait::async_trait]
impl FetcherInner for NoopFetcher {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<FetchResponse> {
        Err(FetchError::any(NoopError::FetchNotAvailable(request.url)))
    }
}

#[cfg(test)]
mod tests {
    use runtime::fetch::Method;

    use super::*;

    #[tokio::test]
    async fn every_fetch_fails() {
        let fetcher = NoopFetcher::runtime_fetcher();

        let error = fetcher
            .fetch(FetchRequest {
                method: Method::GET,
                base_url: None,
                url: "http://example.com".into(),
                parameters: Default::default(),
                headers: Default::default(),
                json: true,
                cookies: true,
            })
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "No HTTP transport is configured, cannot fetch 'http://example.com'"
        );
    }
}
