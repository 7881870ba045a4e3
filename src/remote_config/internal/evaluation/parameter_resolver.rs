use std::collections::HashMap;

use crate::remote_config::server_config::{Value, ValueSource};

use super::super::data_types::{ParameterValue, RemoteConfigParameter, ServerTemplateData};

/// Picks one value per parameter from precomputed condition results.
pub struct ParameterResolver<'a> {
    condition_results: &'a HashMap<String, bool>,
    default_config: &'a HashMap<String, String>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(
        condition_results: &'a HashMap<String, bool>,
        default_config: &'a HashMap<String, String>,
    ) -> Self {
        ParameterResolver {
            condition_results,
            default_config,
        }
    }

    /// Precedence: first conditional value whose condition holds, then the
    /// template default, then the caller default. `useInAppDefault` at either
    /// template step defers to the caller default. `None` means the key is
    /// left out of the config.
    pub fn resolve(&self, key: &str, parameter: &RemoteConfigParameter) -> Option<Value> {
        let selected = parameter
            .conditional_values
            .iter()
            .find(|(condition_name, _)| self.condition_passed(condition_name))
            .map(|(_, value)| value)
            .or(parameter.default_value.as_ref());

        if let Some(value) = selected.and_then(ParameterValue::as_explicit) {
            return Some(Value::new(ValueSource::Remote, value));
        }

        self.default_config
            .get(key)
            .map(|value| Value::new(ValueSource::Default, value.as_str()))
    }

    /// Resolves every template parameter. Caller defaults for keys the
    /// template does not define are carried through unchanged.
    pub fn resolve_all(&self, template: &ServerTemplateData) -> HashMap<String, Value> {
        let mut values: HashMap<String, Value> = self
            .default_config
            .iter()
            .filter(|(key, _)| !template.parameters().contains_key(*key))
            .map(|(key, value)| (key.clone(), Value::new(ValueSource::Default, value.as_str())))
            .collect();

        for (key, parameter) in template.parameters() {
            if let Some(value) = self.resolve(key, parameter) {
                values.insert(key.clone(), value);
            }
        }

        values
    }

    fn condition_passed(&self, condition_name: &str) -> bool {
        self.condition_results
            .get(condition_name)
            .copied()
            .unwrap_or(false)
    }
}
