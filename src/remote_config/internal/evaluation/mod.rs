pub use condition_evaluator::{evaluate_condition, ConditionEvaluator};
pub use parameter_resolver::ParameterResolver;

mod condition_evaluator;
mod eval_helpers;
mod parameter_resolver;
