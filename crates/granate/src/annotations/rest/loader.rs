use std::{
    collections::{hash_map::Entry, HashMap},
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use futures_util::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use runtime::fetch::Fetcher;
use serde_json::Value;
use tracing::Instrument;

use super::request::RequestDescriptor;
use crate::error::RestError;

type SharedResponse = Shared<BoxFuture<'static, Result<Arc<Value>, RestError>>>;

/// Deduplicates the REST requests of one operation.
///
/// The first submission of a request starts the call; every later submission of an equal request
/// waits on the same call and gets the same result. Entries are never evicted, the loader lives as
/// long as the operation.
pub struct CoalescingLoader {
    fetcher: Fetcher,
    requests: Mutex<HashMap<RequestDescriptor, SharedResponse>>,
}

impl CoalescingLoader {
    pub fn new(fetcher: Fetcher) -> Self {
        CoalescingLoader {
            fetcher,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// The request is registered immediately, before the returned future is polled.
    pub fn load(&self, descriptor: RequestDescriptor) -> impl Future<Output = Result<Arc<Value>, RestError>> {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);

        match requests.entry(descriptor) {
            Entry::Occupied(entry) => {
                tracing::trace!(key = %entry.key().cache_key(), "coalescing with a pending request");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let response = execute(self.fetcher.clone(), entry.key().clone()).boxed().shared();
                entry.insert(response.clone());
                response
            }
        }
    }

    /// The number of distinct requests seen so far.
    pub fn len(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CoalescingLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoalescingLoader").field("requests", &self.len()).finish()
    }
}

async fn execute(fetcher: Fetcher, descriptor: RequestDescriptor) -> Result<Arc<Value>, RestError> {
    let key = descriptor.cache_key();
    let span = tracing::debug_span!("rest-request", %key);

    async move {
        let request = descriptor.to_fetch_request()?;

        tracing::debug!(method = %request.method, url = %request.url, "executing request");

        let response = fetcher.fetch(request).await.map_err(|error| {
            tracing::warn!(%error, "request failed");
            RestError::from(error)
        })?;

        let body = match &descriptor.result_field {
            Some(field) => response.body.get(field).cloned().unwrap_or(Value::Null),
            None => response.body,
        };

        Ok(Arc::new(body))
    }
    .instrument(span)
    .await
}
