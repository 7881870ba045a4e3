use std::sync::Arc;

use super::internal::{RemoteConfigNetwork, TemplateFetcher};
use super::remote_config_error::Result;
use super::remote_config_options::RemoteConfigOptions;

/// Handles a `ServerTemplate` needs from its host application. Built by the
/// caller and passed in explicitly.
#[derive(Clone)]
pub struct AppContext {
    fetcher: Arc<dyn TemplateFetcher>,
}

impl AppContext {
    /// Context backed by the Remote Config REST API.
    pub fn new(project_id: &str, access_token: &str, options: RemoteConfigOptions) -> Result<Self> {
        let network = RemoteConfigNetwork::new(project_id, access_token, &options)?;
        Ok(AppContext {
            fetcher: Arc::new(network),
        })
    }

    pub fn with_fetcher(fetcher: Arc<dyn TemplateFetcher>) -> Self {
        AppContext { fetcher }
    }

    pub(crate) fn fetcher(&self) -> Arc<dyn TemplateFetcher> {
        self.fetcher.clone()
    }
}
