use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Nesting limit for condition trees. A tree whose root sits at level 0 may
/// hold nodes down to level `MAX_CONDITION_RECURSION_DEPTH - 1`.
pub const MAX_CONDITION_RECURSION_DEPTH: usize = 10;

/// A boolean expression over the evaluation context. On the wire every node
/// is a single-key object such as `{"orCondition": {...}}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ConditionNode {
    #[serde(rename = "true")]
    True(EmptyCondition),
    #[serde(rename = "false")]
    False(EmptyCondition),
    #[serde(rename = "andCondition")]
    And(ConditionList),
    #[serde(rename = "orCondition")]
    Or(ConditionList),
    #[serde(rename = "percent")]
    Percent(PercentCondition),
    #[serde(rename = "customSignal")]
    CustomSignal(CustomSignalCondition),
}

impl ConditionNode {
    pub fn constant(value: bool) -> Self {
        match value {
            true => ConditionNode::True(EmptyCondition {}),
            false => ConditionNode::False(EmptyCondition {}),
        }
    }

    pub fn and(conditions: Vec<ConditionNode>) -> Self {
        ConditionNode::And(ConditionList { conditions })
    }

    pub fn or(conditions: Vec<ConditionNode>) -> Self {
        ConditionNode::Or(ConditionList { conditions })
    }

    /// Number of node levels from this node down to its deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            ConditionNode::And(list) | ConditionNode::Or(list) => {
                1 + list.conditions.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EmptyCondition {}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConditionList {
    #[serde(default)]
    pub conditions: Vec<ConditionNode>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PercentCondition {
    #[serde(default)]
    pub percent_operator: PercentConditionOperator,
    #[serde(default)]
    pub seed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_percent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_percent_range: Option<MicroPercentRange>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MicroPercentRange {
    #[serde(default)]
    pub micro_percent_lower_bound: u64,
    #[serde(default)]
    pub micro_percent_upper_bound: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PercentConditionOperator {
    LessOrEqual,
    GreaterThan,
    Between,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomSignalCondition {
    #[serde(default)]
    pub custom_signal_operator: CustomSignalOperator,
    #[serde(default)]
    pub custom_signal_key: String,
    #[serde(default)]
    pub target_custom_signal_values: Vec<String>,
    #[serde(skip)]
    compiled_patterns: CompiledPatterns,
}

impl CustomSignalCondition {
    pub fn new(operator: CustomSignalOperator, key: impl Into<String>, targets: Vec<String>) -> Self {
        CustomSignalCondition {
            custom_signal_operator: operator,
            custom_signal_key: key.into(),
            target_custom_signal_values: targets,
            compiled_patterns: CompiledPatterns::default(),
        }
    }

    /// Target values compiled as regular expressions, built on first use and
    /// kept for the life of the condition. Invalid patterns are `None`.
    pub fn patterns(&self) -> &[Option<Regex>] {
        self.compiled_patterns.0.get_or_init(|| {
            self.target_custom_signal_values
                .iter()
                .map(|pattern| match Regex::new(pattern) {
                    Ok(regex) => Some(regex),
                    Err(_) => {
                        tracing::warn!(%pattern, "Invalid regular expression in customSignal condition, it will never match");
                        None
                    }
                })
                .collect()
        })
    }

    pub(crate) fn patterns_compiled(&self) -> bool {
        self.compiled_patterns.0.get().is_some()
    }
}

#[derive(Clone, Debug, Default)]
struct CompiledPatterns(OnceLock<Vec<Option<Regex>>>);

// Derived from the target values, so it never decides equality.
impl PartialEq for CompiledPatterns {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomSignalOperator {
    StringContains,
    StringDoesNotContain,
    StringExactlyMatches,
    StringContainsRegex,
    NumericLessThan,
    NumericLessEqual,
    NumericEqual,
    NumericNotEqual,
    NumericGreaterThan,
    NumericGreaterEqual,
    SemanticVersionLessThan,
    SemanticVersionLessEqual,
    SemanticVersionEqual,
    SemanticVersionNotEqual,
    SemanticVersionGreaterThan,
    SemanticVersionGreaterEqual,
    #[default]
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_nested_condition() {
        let node: ConditionNode = serde_json::from_value(json!({
            "orCondition": {
                "conditions": [{
                    "andCondition": {
                        "conditions": [
                            { "true": {} },
                            {
                                "percent": {
                                    "percentOperator": "BETWEEN",
                                    "seed": "abc",
                                    "microPercentRange": {
                                        "microPercentLowerBound": 10,
                                        "microPercentUpperBound": 500000
                                    }
                                }
                            },
                            {
                                "customSignal": {
                                    "customSignalOperator": "STRING_CONTAINS_REGEX",
                                    "customSignalKey": "email",
                                    "targetCustomSignalValues": [".*@example\\.com"]
                                }
                            }
                        ]
                    }
                }]
            }
        }))
        .unwrap();

        assert_eq!(node.depth(), 3);
        let ConditionNode::Or(or) = &node else {
            panic!("expected orCondition");
        };
        let ConditionNode::And(and) = &or.conditions[0] else {
            panic!("expected andCondition");
        };
        assert_eq!(and.conditions[0], ConditionNode::constant(true));
        match &and.conditions[1] {
            ConditionNode::Percent(p) => {
                assert_eq!(p.percent_operator, PercentConditionOperator::Between);
                assert_eq!(p.micro_percent_range.as_ref().unwrap().micro_percent_upper_bound, 500000);
            }
            _ => panic!("expected percent"),
        }
        match &and.conditions[2] {
            ConditionNode::CustomSignal(c) => {
                assert_eq!(c.custom_signal_operator, CustomSignalOperator::StringContainsRegex);
                assert_eq!(c.custom_signal_key, "email");
            }
            _ => panic!("expected customSignal"),
        }
    }

    #[test]
    fn test_unknown_operators_parse_as_unknown() {
        let node: ConditionNode = serde_json::from_value(json!({
            "customSignal": { "customSignalOperator": "GEO_FENCE", "customSignalKey": "x" }
        }))
        .unwrap();
        match node {
            ConditionNode::CustomSignal(c) => {
                assert_eq!(c.custom_signal_operator, CustomSignalOperator::Unknown)
            }
            _ => panic!("expected customSignal"),
        }
    }

    #[test]
    fn test_unknown_node_kind_is_rejected() {
        let parsed = serde_json::from_value::<ConditionNode>(json!({ "segment": {} }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let node = ConditionNode::and(vec![ConditionNode::constant(false)]);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({ "andCondition": { "conditions": [{ "false": {} }] } })
        );
    }

    #[test]
    fn test_depth_of_empty_combinator() {
        assert_eq!(ConditionNode::or(vec![]).depth(), 1);
        assert_eq!(ConditionNode::constant(true).depth(), 1);
    }
}
