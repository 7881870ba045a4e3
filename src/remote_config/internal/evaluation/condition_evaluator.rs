use std::cell::Cell;
use std::collections::HashMap;

use crate::remote_config::evaluation_context::EvaluationContext;
use crate::unwrap_or_return;

use super::super::conditions::{
    ConditionNode, CustomSignalCondition, CustomSignalOperator, PercentCondition,
    PercentConditionOperator, MAX_CONDITION_RECURSION_DEPTH,
};
use super::super::data_types::NamedCondition;
use super::eval_helpers::{
    compare_numbers, compare_semantic_versions, compare_strings, compute_micro_percentile,
    matches_any_pattern, seeded_randomization_id, value_to_string,
};

/// Evaluates condition trees against one context. Total: missing fields,
/// type mismatches and unknown operators all evaluate to `false`.
pub struct ConditionEvaluator<'a> {
    context: &'a EvaluationContext,
    leaf_evaluations: Cell<usize>,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(context: &'a EvaluationContext) -> Self {
        ConditionEvaluator {
            context,
            leaf_evaluations: Cell::new(0),
        }
    }

    /// Evaluates every named condition once.
    pub fn evaluate_all(&self, conditions: &[NamedCondition]) -> HashMap<String, bool> {
        conditions
            .iter()
            .map(|named| (named.name.clone(), self.evaluate_condition(&named.condition)))
            .collect()
    }

    pub fn evaluate_condition(&self, node: &ConditionNode) -> bool {
        self.eval_node(node, 0)
    }

    /// Number of percent and customSignal predicates run so far.
    pub fn leaf_evaluations(&self) -> usize {
        self.leaf_evaluations.get()
    }

    fn eval_node(&self, node: &ConditionNode, nesting_level: usize) -> bool {
        if nesting_level >= MAX_CONDITION_RECURSION_DEPTH {
            tracing::warn!(
                max_depth = MAX_CONDITION_RECURSION_DEPTH,
                "Condition tree exceeds the maximum depth, evaluating as false"
            );
            return false;
        }

        match node {
            ConditionNode::True(_) => true,
            ConditionNode::False(_) => false,
            ConditionNode::And(list) => list
                .conditions
                .iter()
                .all(|child| self.eval_node(child, nesting_level + 1)),
            ConditionNode::Or(list) => list
                .conditions
                .iter()
                .any(|child| self.eval_node(child, nesting_level + 1)),
            ConditionNode::Percent(condition) => self.eval_percent(condition),
            ConditionNode::CustomSignal(condition) => self.eval_custom_signal(condition),
        }
    }

    fn eval_percent(&self, condition: &PercentCondition) -> bool {
        self.leaf_evaluations.set(self.leaf_evaluations.get() + 1);

        let randomization_id = unwrap_or_return!(self.context.get_randomization_id(), false);
        let bucket = compute_micro_percentile(&seeded_randomization_id(&condition.seed, &randomization_id));

        match condition.percent_operator {
            PercentConditionOperator::LessOrEqual => bucket <= condition.micro_percent.unwrap_or(0),
            PercentConditionOperator::GreaterThan => bucket > condition.micro_percent.unwrap_or(0),
            PercentConditionOperator::Between => {
                let range = unwrap_or_return!(&condition.micro_percent_range, false);
                range.micro_percent_lower_bound < bucket && bucket <= range.micro_percent_upper_bound
            }
            PercentConditionOperator::Unknown => {
                tracing::warn!("Unknown percentOperator in percent condition, evaluating as false");
                false
            }
        }
    }

    fn eval_custom_signal(&self, condition: &CustomSignalCondition) -> bool {
        self.leaf_evaluations.set(self.leaf_evaluations.get() + 1);

        let targets = &condition.target_custom_signal_values;
        if condition.custom_signal_key.is_empty() || targets.is_empty() {
            return false;
        }

        let actual = unwrap_or_return!(
            self.context
                .get(&condition.custom_signal_key)
                .and_then(value_to_string),
            false
        );

        let op = condition.custom_signal_operator;
        let result = match op {
            CustomSignalOperator::StringContains
            | CustomSignalOperator::StringDoesNotContain
            | CustomSignalOperator::StringExactlyMatches => compare_strings(&actual, targets, op),
            CustomSignalOperator::StringContainsRegex => {
                Some(matches_any_pattern(&actual, condition.patterns()))
            }

            CustomSignalOperator::NumericLessThan
            | CustomSignalOperator::NumericLessEqual
            | CustomSignalOperator::NumericEqual
            | CustomSignalOperator::NumericNotEqual
            | CustomSignalOperator::NumericGreaterThan
            | CustomSignalOperator::NumericGreaterEqual => compare_numbers(&actual, &targets[0], op),

            CustomSignalOperator::SemanticVersionLessThan
            | CustomSignalOperator::SemanticVersionLessEqual
            | CustomSignalOperator::SemanticVersionEqual
            | CustomSignalOperator::SemanticVersionNotEqual
            | CustomSignalOperator::SemanticVersionGreaterThan
            | CustomSignalOperator::SemanticVersionGreaterEqual => {
                compare_semantic_versions(&actual, &targets[0], op)
            }

            CustomSignalOperator::Unknown => {
                tracing::warn!(
                    key = %condition.custom_signal_key,
                    "Unknown customSignalOperator, evaluating as false"
                );
                None
            }
        };

        result.unwrap_or(false)
    }
}

/// One-off evaluation of a single tree.
pub fn evaluate_condition(node: &ConditionNode, context: &EvaluationContext) -> bool {
    ConditionEvaluator::new(context).evaluate_condition(node)
}
