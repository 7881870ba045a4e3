use async_trait::async_trait;

use crate::remote_config::remote_config_error::Result;

use super::data_types::ServerTemplateData;

/// Source of server templates. One call is one fetch: no retries, no
/// caching.
#[async_trait]
pub trait TemplateFetcher: Send + Sync {
    async fn fetch_template(&self) -> Result<ServerTemplateData>;
}
