use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::fetch::{FetchRequest, FetchResponse, FetchResult, Fetcher, FetcherInner};

type Responder = dyn Fn(&FetchRequest) -> FetchResult<Value> + Send + Sync;

/// A fetcher which keeps every request it receives and answers with a canned body.
#[derive(Clone)]
pub struct RecordingFetcher {
    requests: Arc<Mutex<Vec<FetchRequest>>>,
    responder: Arc<Responder>,
}

impl RecordingFetcher {
    pub fn new(responder: impl Fn(&FetchRequest) -> FetchResult<Value> + Send + Sync + 'static) -> Self {
        RecordingFetcher {
            requests: Default::default(),
            responder: Arc::new(responder),
        }
    }

    /// Always answers with the same JSON body.
    pub fn with_body(body: Value) -> Self {
        Self::new(move |_| Ok(body.clone()))
    }

    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new(self.clone())
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait::async_trait]
impl FetcherInner for RecordingFetcher {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<FetchResponse> {
        let body = (self.responder)(&request);

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Ok(FetchResponse {
            status: http::StatusCode::OK,
            body: body?,
        })
    }
}
