use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::remote_config::internal::conditions::CustomSignalOperator;

/// Percent conditions bucket into micro-percents: 100% == 100_000_000.
pub const MICRO_PERCENT_SCALE: u64 = 100 * 1_000_000;

const MAX_SEMANTIC_VERSION_SEGMENTS: usize = 5;

/// SHA-256 of `value`, read as a big-endian unsigned integer, modulo
/// `MICRO_PERCENT_SCALE`.
pub fn compute_micro_percentile(value: &str) -> u64 {
    let mut sha256 = Sha256::new();
    sha256.update(value.as_bytes());
    let digest = sha256.finalize();

    let modulus = MICRO_PERCENT_SCALE as u128;
    let remainder = digest
        .iter()
        .fold(0u128, |acc, byte| (acc * 256 + *byte as u128) % modulus);
    remainder as u64
}

pub fn seeded_randomization_id(seed: &str, randomization_id: &str) -> String {
    match seed.is_empty() {
        true => randomization_id.to_string(),
        false => format!("{}.{}", seed, randomization_id),
    }
}

pub fn compare_strings(actual: &str, targets: &[String], op: CustomSignalOperator) -> Option<bool> {
    let any = match op {
        CustomSignalOperator::StringContains | CustomSignalOperator::StringDoesNotContain => {
            targets.iter().any(|target| actual.contains(target.as_str()))
        }
        CustomSignalOperator::StringExactlyMatches => targets.iter().any(|target| actual == target.as_str()),
        _ => return None,
    };

    match op {
        CustomSignalOperator::StringDoesNotContain => Some(!any),
        _ => Some(any),
    }
}

/// Invalid patterns (`None`) never match.
pub fn matches_any_pattern(actual: &str, patterns: &[Option<Regex>]) -> bool {
    patterns.iter().flatten().any(|regex| regex.is_match(actual))
}

pub fn compare_numbers(actual: &str, target: &str, op: CustomSignalOperator) -> Option<bool> {
    let left: f64 = actual.trim().parse().ok()?;
    let right: f64 = target.trim().parse().ok()?;
    match op {
        CustomSignalOperator::NumericLessThan => Some(left < right),
        CustomSignalOperator::NumericLessEqual => Some(left <= right),
        CustomSignalOperator::NumericEqual => Some(left == right),
        CustomSignalOperator::NumericNotEqual => Some(left != right),
        CustomSignalOperator::NumericGreaterThan => Some(left > right),
        CustomSignalOperator::NumericGreaterEqual => Some(left >= right),
        _ => None,
    }
}

pub fn compare_semantic_versions(actual: &str, target: &str, op: CustomSignalOperator) -> Option<bool> {
    fn segments(version: &str) -> Option<Vec<u64>> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() > MAX_SEMANTIC_VERSION_SEGMENTS {
            return None;
        }
        parts.iter().map(|part| part.parse().ok()).collect()
    }

    let left = segments(actual)?;
    let right = segments(target)?;

    let mut ordering = Ordering::Equal;
    for i in 0..MAX_SEMANTIC_VERSION_SEGMENTS {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        ordering = l.cmp(&r);
        if ordering != Ordering::Equal {
            break;
        }
    }

    match op {
        CustomSignalOperator::SemanticVersionLessThan => Some(ordering == Ordering::Less),
        CustomSignalOperator::SemanticVersionLessEqual => Some(ordering != Ordering::Greater),
        CustomSignalOperator::SemanticVersionEqual => Some(ordering == Ordering::Equal),
        CustomSignalOperator::SemanticVersionNotEqual => Some(ordering != Ordering::Equal),
        CustomSignalOperator::SemanticVersionGreaterThan => Some(ordering == Ordering::Greater),
        CustomSignalOperator::SemanticVersionGreaterEqual => Some(ordering != Ordering::Less),
        _ => None,
    }
}

/// Scalars compare as their string form. Arrays, objects and null do not
/// compare at all.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::remote_config::internal::conditions::CustomSignalOperator::*;

    #[test]
    fn test_micro_percentile_known_values() {
        assert_eq!(compute_micro_percentile("seed.user-1"), 44552431);
        assert_eq!(compute_micro_percentile("seed.user-2"), 79627740);
        assert_eq!(compute_micro_percentile("user-1"), 24996379);
    }

    #[test]
    fn test_micro_percentile_is_in_range() {
        for i in 0..200 {
            let bucket = compute_micro_percentile(&format!("salt.{}", i));
            assert!(bucket < MICRO_PERCENT_SCALE);
        }
    }

    #[test]
    fn test_seeded_randomization_id() {
        assert_eq!(seeded_randomization_id("seed", "user-1"), "seed.user-1");
        assert_eq!(seeded_randomization_id("", "user-1"), "user-1");
    }

    #[test]
    fn test_string_operators() {
        let targets = vec!["foo".to_string(), "bar".to_string()];
        assert_eq!(compare_strings("xxbarxx", &targets, StringContains), Some(true));
        assert_eq!(compare_strings("xxbazxx", &targets, StringContains), Some(false));
        assert_eq!(compare_strings("xxbazxx", &targets, StringDoesNotContain), Some(true));
        assert_eq!(compare_strings("xxfooxx", &targets, StringDoesNotContain), Some(false));
        assert_eq!(compare_strings("foo", &targets, StringExactlyMatches), Some(true));
        assert_eq!(compare_strings("foo ", &targets, StringExactlyMatches), Some(false));
        assert_eq!(compare_strings("anything", &[], StringContains), Some(false));
        assert_eq!(compare_strings("anything", &targets, NumericEqual), None);
    }

    #[test]
    fn test_regex_matching_skips_invalid_patterns() {
        let patterns = vec![Regex::new("^ab+c$").ok(), None];
        assert!(matches_any_pattern("abbbc", &patterns));
        assert!(!matches_any_pattern("ac", &patterns));
        assert!(!matches_any_pattern("abc", &[None]));
        assert_eq!(compare_strings("abc", &["abc".to_string()], StringContainsRegex), None);
    }

    #[test]
    fn test_numeric_operators() {
        assert_eq!(compare_numbers("5", "10", NumericLessThan), Some(true));
        assert_eq!(compare_numbers("10", "10", NumericLessEqual), Some(true));
        assert_eq!(compare_numbers("10.0", "10", NumericEqual), Some(true));
        assert_eq!(compare_numbers("10", "11", NumericNotEqual), Some(true));
        assert_eq!(compare_numbers(" 12 ", "11", NumericGreaterThan), Some(true));
        assert_eq!(compare_numbers("11", "11", NumericGreaterEqual), Some(true));
        assert_eq!(compare_numbers("abc", "11", NumericGreaterEqual), None);
    }

    #[test]
    fn test_semantic_version_operators() {
        assert_eq!(compare_semantic_versions("1.2.3", "1.10.0", SemanticVersionLessThan), Some(true));
        assert_eq!(compare_semantic_versions("1.2", "1.2.0", SemanticVersionEqual), Some(true));
        assert_eq!(compare_semantic_versions("2.0.0", "1.9.9", SemanticVersionGreaterThan), Some(true));
        assert_eq!(compare_semantic_versions("2.0.0", "2.0", SemanticVersionGreaterEqual), Some(true));
        assert_eq!(compare_semantic_versions("2.0.1", "2.0", SemanticVersionNotEqual), Some(true));
        assert_eq!(compare_semantic_versions("1.9", "2", SemanticVersionLessEqual), Some(true));
        assert_eq!(compare_semantic_versions("1.2.x", "1.2.0", SemanticVersionEqual), None);
        assert_eq!(compare_semantic_versions("1.2.3.4.5.6", "1", SemanticVersionGreaterThan), None);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("a")), Some("a".to_string()));
        assert_eq!(value_to_string(&json!(3)), Some("3".to_string()));
        assert_eq!(value_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_string(&json!([1])), None);
    }
}
