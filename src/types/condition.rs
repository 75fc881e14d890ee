//! Policy conditions and operator reversal.
//!
//! A [`Condition`] is one `operator -> key -> values` entry of a statement's
//! `Condition` block. Keys and operators compare case-insensitively, values
//! compare exactly and keep their order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PolicyError;

/// A statement's raw condition block: `operator -> key -> values`.
pub type RawConditionCollection = BTreeMap<String, BTreeMap<String, Vec<String>>>;

const IF_EXISTS: &str = "IfExists";

/// Operator pairs that negate one another.
const OPERATOR_PAIRS: &[(&str, &str)] = &[
    ("StringEquals", "StringNotEquals"),
    ("StringEqualsIgnoreCase", "StringNotEqualsIgnoreCase"),
    ("StringLike", "StringNotLike"),
    ("NumericEquals", "NumericNotEquals"),
    ("NumericLessThan", "NumericGreaterThanEquals"),
    ("NumericLessThanEquals", "NumericGreaterThan"),
    ("DateEquals", "DateNotEquals"),
    ("DateLessThan", "DateGreaterThanEquals"),
    ("DateLessThanEquals", "DateGreaterThan"),
    ("IpAddress", "NotIpAddress"),
    ("ArnEquals", "ArnNotEquals"),
    ("ArnLike", "ArnNotLike"),
];

/// Lower-cased operator -> canonical name of its negation.
static REVERSED_OPERATORS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    OPERATOR_PAIRS
        .iter()
        .flat_map(|(a, b)| [(a.to_lowercase(), *b), (b.to_lowercase(), *a)])
        .collect()
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Condition {
    key: String,
    operator: String,
    values: Vec<String>,
}

impl Condition {
    pub fn new<K, O, V>(key: K, operator: O, values: V) -> Self
    where
        K: Into<String>,
        O: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Condition {
            key: key.into(),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Expand a raw condition block into individual conditions.
    pub fn from_collection(raw: &RawConditionCollection) -> BTreeSet<Condition> {
        raw.iter()
            .flat_map(|(operator, keys)| {
                keys.iter()
                    .map(move |(key, values)| Condition::new(key, operator, values.clone()))
            })
            .collect()
    }

    fn split_if_exists(&self) -> (String, bool) {
        let lowered = self.operator.to_lowercase();
        if let Some(base) = lowered.strip_suffix(&IF_EXISTS.to_lowercase()) {
            return (base.to_string(), true);
        }
        (lowered, false)
    }

    pub fn is_reversible(&self) -> bool {
        REVERSED_OPERATORS.contains_key(&self.split_if_exists().0)
    }

    /// The negation of this condition: same key and values, opposite
    /// operator. An `IfExists` suffix is preserved.
    pub fn reverse(&self) -> Result<Condition, PolicyError> {
        let (base, if_exists) = self.split_if_exists();
        let reversed = REVERSED_OPERATORS
            .get(&base)
            .ok_or_else(|| PolicyError::NotReversible(self.operator.clone()))?;
        let operator = if if_exists {
            format!("{reversed}{IF_EXISTS}")
        } else {
            (*reversed).to_string()
        };
        Ok(Condition {
            key: self.key.clone(),
            operator,
            values: self.values.clone(),
        })
    }

    fn identity(&self) -> (String, String, &[String]) {
        (
            self.key.to_lowercase(),
            self.operator.to_lowercase(),
            &self.values,
        )
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} {} [{}]",
            self.key,
            self.operator,
            self.values.iter().map(|v| format!("'{v}'")).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn assert_reverses_to(operator: &str, expected: &str) {
        let condition = Condition::new("aws:PrincipalOrgId", operator, ["o-123"]);
        assert!(condition.is_reversible(), "{operator} should be reversible");
        let reversed = condition.reverse().unwrap();
        assert_eq!(reversed.operator(), expected);
        assert_eq!(reversed.key(), "aws:PrincipalOrgId");
        assert_eq!(reversed.values(), ["o-123".to_string()]);
        assert_eq!(reversed.reverse().unwrap(), condition);
    }

    #[test]
    fn test_every_operator_pair_reverses_both_ways() {
        assert_eq!(REVERSED_OPERATORS.len(), OPERATOR_PAIRS.len() * 2);
        for (operator, negation) in OPERATOR_PAIRS {
            assert_reverses_to(operator, negation);
            assert_reverses_to(negation, operator);
            assert_reverses_to(
                &format!("{operator}{IF_EXISTS}"),
                &format!("{negation}{IF_EXISTS}"),
            );
            assert_reverses_to(
                &format!("{negation}{IF_EXISTS}"),
                &format!("{operator}{IF_EXISTS}"),
            );
        }
    }

    #[parameterized(
        lower_case_operator = { "stringequals", "StringNotEquals" },
        lower_case_if_exists = { "numericlessthanifexists", "NumericGreaterThanEqualsIfExists" },
        date_less_than_equals = { "DateLessThanEquals", "DateGreaterThan" },
        arn_like = { "ArnLike", "ArnNotLike" },
    )]
    fn test_condition_reverse(operator: &str, expected: &str) {
        assert_reverses_to(operator, expected);
    }

    #[parameterized(
        binary_equals = { "BinaryEquals" },
        bool_operator = { "Bool" },
        null_check = { "Null" },
    )]
    fn test_condition_not_reversible(operator: &str) {
        let condition = Condition::new("key", operator, ["QmluYXJ5VmFsdWVJbkJhc2U2NA=="]);
        assert!(!condition.is_reversible());
        let err = condition.reverse().unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("cannot reverse conditions with operator {operator}")
        );
    }

    #[test]
    fn test_condition_equality() {
        let a = Condition::new("AWS:PrincipalOrgId", "StringEquals", ["o-123"]);
        let b = Condition::new("aws:principalorgid", "stringequals", ["o-123"]);
        let c = Condition::new("aws:principalorgid", "stringequals", ["O-123"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let reordered = Condition::new("k", "StringEquals", ["b", "a"]);
        assert_ne!(reordered, Condition::new("k", "StringEquals", ["a", "b"]));
    }

    #[test]
    fn test_condition_from_collection() {
        let raw: RawConditionCollection = serde_json::from_value(serde_json::json!({
            "StringNotEquals": {
                "s3:x-amz-server-side-encryption": ["AES256"],
                "aws:PrincipalOrgId": ["o-123456"]
            },
            "BinaryEquals": {"key": ["QmluYXJ5"]}
        }))
        .unwrap();
        let conditions = Condition::from_collection(&raw);
        assert_eq!(conditions.len(), 3);
        assert!(conditions.contains(&Condition::new(
            "s3:x-amz-server-side-encryption",
            "StringNotEquals",
            ["AES256"]
        )));
    }

    #[test]
    fn test_condition_display() {
        let condition = Condition::new("s3:x-amz-server-side-encryption", "StringNotEquals", ["AES256", "aws:kms"]);
        assert_eq!(
            condition.to_string(),
            "s3:x-amz-server-side-encryption StringNotEquals ['AES256', 'aws:kms']"
        );
    }
}
