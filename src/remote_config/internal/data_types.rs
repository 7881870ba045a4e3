use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use http::header::ETAG;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::remote_config::remote_config_error::{RemoteConfigError, Result};

use super::conditions::{ConditionNode, CustomSignalOperator, MAX_CONDITION_RECURSION_DEPTH};
use super::helpers::{deserialize_ordered_map, deserialize_scalar_string, serialize_ordered_map};

/// A parameter value as stored in the template: either a concrete string or
/// the marker telling the client to fall back to its own default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ParameterValue {
    Explicit {
        #[serde(deserialize_with = "deserialize_scalar_string")]
        value: String,
    },
    InAppDefault {
        #[serde(rename = "useInAppDefault")]
        use_in_app_default: bool,
    },
}

impl ParameterValue {
    pub fn explicit(value: impl Into<String>) -> Self {
        ParameterValue::Explicit { value: value.into() }
    }

    pub fn in_app_default() -> Self {
        ParameterValue::InAppDefault { use_in_app_default: true }
    }

    pub fn as_explicit(&self) -> Option<&str> {
        match self {
            ParameterValue::Explicit { value } => Some(value),
            ParameterValue::InAppDefault { .. } => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterValueType {
    String,
    Boolean,
    Number,
    Json,
    #[serde(other)]
    ParameterValueTypeUnspecified,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfigParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParameterValue>,
    /// Overrides keyed by condition name. Order is precedence: the first
    /// entry whose condition holds wins.
    #[serde(
        default,
        deserialize_with = "deserialize_ordered_map",
        serialize_with = "serialize_ordered_map",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub conditional_values: Vec<(String, ParameterValue)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ParameterValueType>,
}

impl RemoteConfigParameter {
    pub fn with_default(value: ParameterValue) -> Self {
        RemoteConfigParameter {
            default_value: Some(value),
            ..Self::default()
        }
    }

    pub fn with_conditional_value(mut self, condition_name: impl Into<String>, value: ParameterValue) -> Self {
        self.conditional_values.push((condition_name.into(), value));
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, RemoteConfigParameter>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NamedCondition {
    pub name: String,
    #[serde(alias = "expression")]
    pub condition: ConditionNode,
}

impl NamedCondition {
    pub fn new(name: impl Into<String>, condition: ConditionNode) -> Self {
        NamedCondition { name: name.into(), condition }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_legacy: Option<bool>,
}

impl TemplateVersion {
    pub fn parsed_update_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.update_time.as_ref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|time| time.with_timezone(&Utc))
    }
}

/// Wire shape of a server template.
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct APIServerTemplate {
    pub parameters: HashMap<String, RemoteConfigParameter>,
    #[serde(default)]
    pub conditions: Vec<NamedCondition>,
    #[serde(default)]
    pub parameter_groups: HashMap<String, ParameterGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<TemplateVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// A validated, immutable server template. A refresh produces a new value;
/// nothing mutates one in place.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "APIServerTemplate", into = "APIServerTemplate")]
pub struct ServerTemplateData {
    parameters: HashMap<String, RemoteConfigParameter>,
    conditions: Vec<NamedCondition>,
    parameter_groups: HashMap<String, ParameterGroup>,
    version: Option<TemplateVersion>,
    etag: Option<String>,
}

impl ServerTemplateData {
    pub fn new(
        parameters: HashMap<String, RemoteConfigParameter>,
        conditions: Vec<NamedCondition>,
        parameter_groups: HashMap<String, ParameterGroup>,
        version: Option<TemplateVersion>,
        etag: Option<String>,
    ) -> Result<Self> {
        validate_conditions(&conditions)?;
        validate_parameters(parameters.iter())?;
        for group in parameter_groups.values() {
            validate_parameters(group.parameters.iter())?;
        }
        Ok(ServerTemplateData {
            parameters,
            conditions,
            parameter_groups,
            version,
            etag,
        })
    }

    /// Builds template data from a fetch response: the JSON body plus the
    /// `ETag` header.
    pub fn from_response(headers: &HeaderMap, body: &[u8]) -> Result<Self> {
        let mut template: APIServerTemplate = serde_json::from_slice(body)?;
        template.etag = headers
            .get(ETAG)
            .and_then(|etag| etag.to_str().ok())
            .map(|etag| etag.to_string());
        ServerTemplateData::try_from(template)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parameters(&self) -> &HashMap<String, RemoteConfigParameter> {
        &self.parameters
    }

    pub fn conditions(&self) -> &[NamedCondition] {
        &self.conditions
    }

    pub fn parameter_groups(&self) -> &HashMap<String, ParameterGroup> {
        &self.parameter_groups
    }

    pub fn version(&self) -> Option<&TemplateVersion> {
        self.version.as_ref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

impl TryFrom<APIServerTemplate> for ServerTemplateData {
    type Error = RemoteConfigError;

    fn try_from(template: APIServerTemplate) -> Result<Self> {
        ServerTemplateData::new(
            template.parameters,
            template.conditions,
            template.parameter_groups,
            template.version,
            template.etag,
        )
    }
}

impl From<ServerTemplateData> for APIServerTemplate {
    fn from(data: ServerTemplateData) -> Self {
        APIServerTemplate {
            parameters: data.parameters,
            conditions: data.conditions,
            parameter_groups: data.parameter_groups,
            version: data.version,
            etag: data.etag,
        }
    }
}

fn validate_conditions(conditions: &[NamedCondition]) -> Result<()> {
    let mut seen = HashSet::new();
    for named in conditions {
        if named.name.is_empty() {
            return Err(RemoteConfigError::malformed("condition name must not be empty"));
        }
        if !seen.insert(named.name.as_str()) {
            return Err(RemoteConfigError::malformed(format!(
                "duplicate condition name '{}'",
                named.name
            )));
        }
        let depth = named.condition.depth();
        if depth > MAX_CONDITION_RECURSION_DEPTH {
            return Err(RemoteConfigError::malformed(format!(
                "condition '{}' nests {} levels deep, the limit is {}",
                named.name, depth, MAX_CONDITION_RECURSION_DEPTH
            )));
        }
        compile_patterns(&named.condition);
    }
    Ok(())
}

fn compile_patterns(node: &ConditionNode) {
    match node {
        ConditionNode::And(list) | ConditionNode::Or(list) => {
            list.conditions.iter().for_each(compile_patterns)
        }
        ConditionNode::CustomSignal(condition)
            if condition.custom_signal_operator == CustomSignalOperator::StringContainsRegex =>
        {
            condition.patterns();
        }
        _ => {}
    }
}

// `{"useInAppDefault": false}` carries no value at all.
fn validate_parameters<'a>(
    parameters: impl Iterator<Item = (&'a String, &'a RemoteConfigParameter)>,
) -> Result<()> {
    for (key, parameter) in parameters {
        let values = parameter
            .default_value
            .iter()
            .chain(parameter.conditional_values.iter().map(|(_, value)| value));
        for value in values {
            if let ParameterValue::InAppDefault { use_in_app_default: false } = value {
                return Err(RemoteConfigError::malformed(format!(
                    "parameter '{}' has useInAppDefault set to false without a value",
                    key
                )));
            }
        }
    }
    Ok(())
}
