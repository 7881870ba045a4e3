use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::app_context::AppContext;
use super::evaluation_context::EvaluationContext;
use super::internal::{
    ConditionEvaluator, ParameterResolver, ServerTemplateData, TemplateFetcher, TemplateStore,
};
use super::remote_config_error::{RemoteConfigError, Result};
use super::server_config::ServerConfig;

/// A cached server template plus the caller defaults used when evaluating
/// it. Empty until `load` or `set` succeeds.
pub struct ServerTemplate {
    fetcher: Arc<dyn TemplateFetcher>,
    default_config: HashMap<String, String>,
    store: TemplateStore,
}

impl ServerTemplate {
    pub fn new(app: &AppContext, default_config: Option<HashMap<String, String>>) -> Self {
        ServerTemplate {
            fetcher: app.fetcher(),
            default_config: default_config.unwrap_or_default(),
            store: TemplateStore::new(),
        }
    }

    /// Fetches a fresh template and replaces the cache. On error the
    /// previous cache is kept.
    pub async fn load(&self) -> Result<()> {
        let template = self.fetcher.fetch_template().await?;
        self.replace_cache(template);
        Ok(())
    }

    pub async fn load_with_timeout(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.fetcher.fetch_template()).await {
            Ok(template) => {
                self.replace_cache(template?);
                Ok(())
            }
            Err(_) => Err(RemoteConfigError::FetchTimeout(timeout.as_millis())),
        }
    }

    pub fn set(&self, template: ServerTemplateData) {
        self.replace_cache(template);
    }

    /// Parses template JSON and caches it. Malformed input leaves the cache
    /// untouched.
    pub fn set_json(&self, json: &str) -> Result<()> {
        let template = ServerTemplateData::from_json(json)?;
        self.replace_cache(template);
        Ok(())
    }

    pub fn evaluate(&self, context: &EvaluationContext) -> Result<ServerConfig> {
        let template = self.store.load().ok_or(RemoteConfigError::NotLoaded)?;

        let evaluator = ConditionEvaluator::new(context);
        let condition_results = evaluator.evaluate_all(template.conditions());
        let config_values =
            ParameterResolver::new(&condition_results, &self.default_config).resolve_all(&template);

        tracing::debug!(
            conditions = condition_results.len(),
            predicates = evaluator.leaf_evaluations(),
            values = config_values.len(),
            "Evaluated server template"
        );

        Ok(ServerConfig::new(config_values))
    }

    pub fn cache(&self) -> Option<Arc<ServerTemplateData>> {
        self.store.load()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn etag(&self) -> Option<String> {
        self.store.load()?.etag().map(|etag| etag.to_string())
    }

    pub fn to_json(&self) -> Result<String> {
        self.store.load().ok_or(RemoteConfigError::NotLoaded)?.to_json()
    }

    fn replace_cache(&self, template: ServerTemplateData) {
        tracing::info!(
            etag = template.etag().unwrap_or_default(),
            version = template
                .version()
                .and_then(|v| v.version_number.as_deref())
                .unwrap_or_default(),
            parameters = template.parameters().len(),
            conditions = template.conditions().len(),
            "Caching server template"
        );
        self.store.store(template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UnreachableFetcher;

    #[async_trait]
    impl TemplateFetcher for UnreachableFetcher {
        async fn fetch_template(&self) -> Result<ServerTemplateData> {
            Err(RemoteConfigError::FetchTimeout(0))
        }
    }

    fn server_template(defaults: Option<HashMap<String, String>>) -> ServerTemplate {
        ServerTemplate::new(&AppContext::with_fetcher(Arc::new(UnreachableFetcher)), defaults)
    }

    #[test]
    fn test_evaluate_before_load_fails() {
        let template = server_template(None);
        assert!(!template.is_loaded());
        assert!(matches!(
            template.evaluate(&EvaluationContext::new()),
            Err(RemoteConfigError::NotLoaded)
        ));
        assert!(matches!(template.to_json(), Err(RemoteConfigError::NotLoaded)));
        assert!(template.etag().is_none());
    }

    #[test]
    fn test_set_json_rejects_malformed_input_and_keeps_cache() {
        let template = server_template(None);
        template
            .set_json(r#"{"parameters": {"a": {"defaultValue": {"value": "1"}}}, "etag": "e1"}"#)
            .unwrap();

        let err = template.set_json(r#"{"conditions": "nope"}"#).unwrap_err();
        assert!(matches!(err, RemoteConfigError::MalformedTemplate(_)));
        assert_eq!(template.etag().as_deref(), Some("e1"));
    }

    #[test]
    fn test_welcome_message_scenario() {
        let template = server_template(None);
        template
            .set_json(r#"{"parameters": {"welcome_msg": {"defaultValue": {"value": "hi"}}}, "conditions": []}"#)
            .unwrap();
        let config = template.evaluate(&EvaluationContext::new()).unwrap();
        assert_eq!(config.get_string("welcome_msg").unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_cache() {
        let template = server_template(None);
        template.set_json(r#"{"parameters": {}, "etag": "kept"}"#).unwrap();
        assert!(template.load().await.is_err());
        assert_eq!(template.etag().as_deref(), Some("kept"));
    }
}
