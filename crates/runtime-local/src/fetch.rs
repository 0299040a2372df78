use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT};
use runtime::fetch::{FetchError, FetchRequest, FetchResponse, FetchResult, Fetcher, FetcherInner, Method, StatusCode};

pub struct NativeFetcher {
    client: reqwest::Client,
    cookieless_client: reqwest::Client,
}

impl NativeFetcher {
    pub fn new(timeout: Option<Duration>) -> FetchResult<Self> {
        let builder = || {
            let builder = reqwest::Client::builder();

            match timeout {
                Some(timeout) => builder.timeout(timeout),
                None => builder,
            }
        };

        Ok(NativeFetcher {
            client: builder().cookie_store(true).build().map_err(FetchError::any)?,
            cookieless_client: builder().build().map_err(FetchError::any)?,
        })
    }

    pub fn runtime_fetcher(timeout: Option<Duration>) -> FetchResult<Fetcher> {
        Ok(Fetcher::new(Self::new(timeout)?))
    }
}

#[async_trait::async_trait]
impl FetcherInner for NativeFetcher {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<FetchResponse> {
        let url = request.resolved_url()?;

        tracing::debug!(method = %request.method, %url, "sending request");

        let client = if request.cookies {
            &self.client
        } else {
            &self.cookieless_client
        };

        let mut builder = client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if request.method == Method::GET {
            if !request.parameters.is_empty() {
                builder = builder.query(&request.query_pairs());
            }
        } else if request.json {
            builder = builder.json(&request.parameters);
        } else {
            builder = builder.form(&request.query_pairs());
        }

        if request.json {
            builder = builder.header(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let response = builder.send().await.map_err(FetchError::any)?;
        let status = response.status();

        if status != StatusCode::OK {
            tracing::debug!(%status, "upstream answered with a non successful status");

            return Err(FetchError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or(status.as_str()).to_owned(),
            });
        }

        let bytes = response.bytes().await.map_err(FetchError::any)?;

        let body = if request.json {
            serde_json::from_slice(&bytes).map_err(FetchError::any)?
        } else {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(FetchResponse { status, body })
    }
}
