pub use conditions::{
    ConditionList, ConditionNode, CustomSignalCondition, CustomSignalOperator, EmptyCondition,
    MicroPercentRange, PercentCondition, PercentConditionOperator, MAX_CONDITION_RECURSION_DEPTH,
};
pub use data_types::{
    NamedCondition, ParameterGroup, ParameterValue, ParameterValueType, RemoteConfigParameter,
    ServerTemplateData, TemplateVersion,
};
pub use evaluation::{evaluate_condition, ConditionEvaluator, ParameterResolver};
pub use remote_config_network::RemoteConfigNetwork;
pub use template_fetcher::TemplateFetcher;
pub use template_store::TemplateStore;

mod conditions;
mod data_types;
mod evaluation;
mod helpers;
mod remote_config_network;
mod template_fetcher;
mod template_store;
