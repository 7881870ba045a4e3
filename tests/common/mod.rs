use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use remote_config_server::{AppContext, RemoteConfigError, Result, ServerTemplateData, TemplateFetcher};
use serde_json::Value;

/// Serves queued template JSON documents, one per fetch. An empty queue
/// answers with a 503.
pub struct MockFetcher {
    responses: Mutex<Vec<Value>>,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new(responses: Vec<Value>) -> Arc<Self> {
        Arc::new(MockFetcher {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    pub fn slow(delay: Duration, response: Value) -> Arc<Self> {
        Arc::new(MockFetcher {
            responses: Mutex::new(vec![response]),
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TemplateFetcher for MockFetcher {
    async fn fetch_template(&self) -> Result<ServerTemplateData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            Some(json) => ServerTemplateData::from_json(&json.to_string()),
            None => Err(RemoteConfigError::FetchStatus {
                status: http::StatusCode::SERVICE_UNAVAILABLE,
                body: "backend unavailable".to_string(),
            }),
        }
    }
}

pub fn app_with(fetcher: Arc<MockFetcher>) -> AppContext {
    AppContext::with_fetcher(fetcher)
}
