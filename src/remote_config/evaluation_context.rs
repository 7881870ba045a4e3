use std::collections::HashMap;

use serde_json::Value;

pub const RANDOMIZATION_ID_KEY: &str = "randomizationId";

/// Runtime attributes read by condition predicates. Evaluation only ever
/// borrows the context.
#[derive(Clone, Debug, Default)]
pub struct EvaluationContext {
    pub values: HashMap<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_randomization_id(randomization_id: impl Into<String>) -> Self {
        Self::new().with(RANDOMIZATION_ID_KEY, Value::String(randomization_id.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_randomization_id(&self) -> Option<String> {
        match self.values.get(RANDOMIZATION_ID_KEY)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<HashMap<String, Value>> for EvaluationContext {
    fn from(values: HashMap<String, Value>) -> Self {
        EvaluationContext { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_randomization_id_accepts_strings_and_numbers() {
        let ctx = EvaluationContext::with_randomization_id("user-1");
        assert_eq!(ctx.get_randomization_id(), Some("user-1".to_string()));

        let ctx = EvaluationContext::new().with(RANDOMIZATION_ID_KEY, 42);
        assert_eq!(ctx.get_randomization_id(), Some("42".to_string()));

        let ctx = EvaluationContext::new().with(RANDOMIZATION_ID_KEY, json!(["a"]));
        assert_eq!(ctx.get_randomization_id(), None);
    }

    #[test]
    fn test_builder_and_lookup() {
        let mut ctx = EvaluationContext::new().with("country", "NZ");
        ctx.insert("tier", 3);
        assert_eq!(ctx.get("country"), Some(&json!("NZ")));
        assert_eq!(ctx.get("tier"), Some(&json!(3)));
        assert_eq!(ctx.get("missing"), None);
    }
}
