//! Type-coercing comparison primitives for condition leaves.
//!
//! Documents and fork rules both carry arbitrary JSON scalars, so a field
//! may hold the number `500` while the rule says `"500"`. Comparison is
//! total: operand combinations that cannot be coerced to a common type are
//! non-matches, never errors.

use crate::condition::Operator;
use crate::value::Value;

/// Compares a present document field against a rule value under `operator`.
///
/// Numeric comparison applies whenever both operands are numbers or fully
/// numeric-looking strings, regardless of JSON representation. Ordering
/// operators on non-numeric operands are `false`; `eq`/`neq` fall back to
/// comparing canonical string forms. The substring operators always coerce
/// both operands to strings.
///
/// `exists` is resolved by the caller (it is a presence check); a present
/// field compares `true` here.
#[must_use]
pub fn compare(operator: Operator, field: &Value, rule: &Value) -> bool {
    match operator {
        Operator::Eq
        | Operator::Neq
        | Operator::Gte
        | Operator::Gt
        | Operator::Lte
        | Operator::Lt => {
            if let (Some(a), Some(b)) = (as_numeric(field), as_numeric(rule)) {
                compare_numeric(operator, a, b)
            } else {
                compare_lexical(operator, field, rule)
            }
        }
        Operator::Contains => field.to_string().contains(&rule.to_string()),
        Operator::StartsWith => field.to_string().starts_with(&rule.to_string()),
        Operator::EndsWith => field.to_string().ends_with(&rule.to_string()),
        Operator::Exists => true,
    }
}

fn compare_numeric(operator: Operator, a: f64, b: f64) -> bool {
    match operator {
        Operator::Eq => a == b,
        Operator::Neq => a != b,
        Operator::Gte => a >= b,
        Operator::Gt => a > b,
        Operator::Lte => a <= b,
        Operator::Lt => a < b,
        _ => false,
    }
}

fn compare_lexical(operator: Operator, field: &Value, rule: &Value) -> bool {
    match operator {
        Operator::Eq => field.to_string() == rule.to_string(),
        Operator::Neq => field.to_string() != rule.to_string(),
        // Ordering is undefined without a common numeric type.
        _ => false,
    }
}

/// Numeric view of a scalar, coercing numeric-looking strings.
fn as_numeric(value: &Value) -> Option<f64> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => parse_numeric(s),
        Value::Bool(_) | Value::Null => None,
    }
}

/// Parses a fully numeric-looking string as a base-10 number.
///
/// After discarding an optional leading sign and at most one decimal point,
/// every remaining character must be a decimal digit; partial parses (e.g.
/// `"500ms"`) are rejected.
fn parse_numeric(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    if unsigned.is_empty() {
        return None;
    }

    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in unsigned.chars() {
        if c == '.' {
            dots += 1;
            if dots > 1 {
                return None;
            }
        } else if c.is_ascii_digit() {
            digits += 1;
        } else {
            return None;
        }
    }
    if digits == 0 {
        return None;
    }

    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_across_representations() {
        // String/string, number/string, string/number, number/number.
        assert!(compare(
            Operator::Gte,
            &Value::String("500".into()),
            &Value::String("500".into())
        ));
        assert!(compare(
            Operator::Gte,
            &Value::Int(500),
            &Value::String("500".into())
        ));
        assert!(compare(
            Operator::Gte,
            &Value::String("501".into()),
            &Value::Int(500)
        ));
        assert!(compare(Operator::Gte, &Value::Int(500), &Value::Int(500)));
        assert!(!compare(
            Operator::Gte,
            &Value::String("499".into()),
            &Value::Int(500)
        ));
    }

    #[test]
    fn lte_numeric_comparison() {
        assert!(compare(
            Operator::Lte,
            &Value::Int(500),
            &Value::String("500".into())
        ));
        assert!(compare(
            Operator::Lte,
            &Value::String("499".into()),
            &Value::Int(500)
        ));
        assert!(!compare(
            Operator::Lte,
            &Value::Int(501),
            &Value::String("500".into())
        ));
    }

    #[test]
    fn numeric_eq_ignores_representation() {
        assert!(compare(
            Operator::Eq,
            &Value::String("500".into()),
            &Value::Int(500)
        ));
        assert!(compare(
            Operator::Eq,
            &Value::Float(500.0),
            &Value::String("500".into())
        ));
        assert!(!compare(
            Operator::Neq,
            &Value::String("500".into()),
            &Value::Int(500)
        ));
    }

    #[test]
    fn ordering_undefined_for_non_numeric() {
        assert!(!compare(
            Operator::Gte,
            &Value::String("high".into()),
            &Value::Int(500)
        ));
        assert!(!compare(
            Operator::Lt,
            &Value::String("abc".into()),
            &Value::String("abd".into())
        ));
    }

    #[test]
    fn lexical_fallback_for_eq_neq() {
        assert!(compare(
            Operator::Eq,
            &Value::String("nginx".into()),
            &Value::String("nginx".into())
        ));
        assert!(compare(
            Operator::Neq,
            &Value::String("nginx".into()),
            &Value::String("apache".into())
        ));
        assert!(!compare(
            Operator::Eq,
            &Value::String("nginx".into()),
            &Value::String("apache".into())
        ));
    }

    #[test]
    fn substring_operators_coerce_to_string() {
        assert!(compare(
            Operator::Contains,
            &Value::String("status_code: 500".into()),
            &Value::Int(500)
        ));
        assert!(compare(
            Operator::Contains,
            &Value::String("status_code: 500".into()),
            &Value::String("500".into())
        ));
        assert!(compare(
            Operator::StartsWith,
            &Value::String("nginx-access".into()),
            &Value::String("nginx".into())
        ));
        assert!(compare(
            Operator::EndsWith,
            &Value::Int(500),
            &Value::String("00".into())
        ));
        assert!(!compare(
            Operator::Contains,
            &Value::String("status_code: 500".into()),
            &Value::Int(400)
        ));
    }

    #[test]
    fn numeric_looking_rejects_partial_parses() {
        assert_eq!(parse_numeric("500"), Some(500.0));
        assert_eq!(parse_numeric("-4.5"), Some(-4.5));
        assert_eq!(parse_numeric("+12"), Some(12.0));
        assert_eq!(parse_numeric("500ms"), None);
        assert_eq!(parse_numeric("1.2.3"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("."), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("1e3"), None);
    }

    #[test]
    fn null_and_bool_are_not_numeric() {
        assert!(!compare(Operator::Gte, &Value::Null, &Value::Int(0)));
        assert!(!compare(Operator::Gt, &Value::Bool(true), &Value::Int(0)));
        // eq still falls back to the lexical form.
        assert!(compare(
            Operator::Eq,
            &Value::Bool(true),
            &Value::String("true".into())
        ));
    }
}
