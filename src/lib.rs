mod macros;
mod remote_config;

// re-export public objects to top level
pub use remote_config::app_context::AppContext;
pub use remote_config::evaluation_context::{EvaluationContext, RANDOMIZATION_ID_KEY};
pub use remote_config::internal::{
    evaluate_condition, ConditionEvaluator, ConditionList, ConditionNode, CustomSignalCondition,
    CustomSignalOperator, EmptyCondition, MicroPercentRange, NamedCondition, ParameterGroup,
    ParameterResolver, ParameterValue, ParameterValueType, PercentCondition,
    PercentConditionOperator, RemoteConfigNetwork, RemoteConfigParameter, ServerTemplateData,
    TemplateFetcher, TemplateVersion, MAX_CONDITION_RECURSION_DEPTH,
};
pub use remote_config::remote_config_error::{RemoteConfigError, Result};
pub use remote_config::remote_config_options::RemoteConfigOptions;
pub use remote_config::server_config::{ServerConfig, Value, ValueSource};
pub use remote_config::server_template::ServerTemplate;

use std::collections::HashMap;

/// Creates a `ServerTemplate` and loads it from the backend.
pub async fn get_server_template(
    app: &AppContext,
    default_config: Option<HashMap<String, String>>,
) -> Result<ServerTemplate> {
    let template = init_server_template(app, default_config, None);
    template.load().await?;
    Ok(template)
}

/// Creates a `ServerTemplate`, optionally seeded with template data. No
/// network access.
pub fn init_server_template(
    app: &AppContext,
    default_config: Option<HashMap<String, String>>,
    template_data: Option<ServerTemplateData>,
) -> ServerTemplate {
    let template = ServerTemplate::new(app, default_config);
    if let Some(data) = template_data {
        template.set(data);
    }
    template
}
