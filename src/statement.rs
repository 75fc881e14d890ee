//! IAM policy documents and their expansion into shards.
//!
//! Every list-valued field accepts a single value or a list, the principal
//! block accepts a bare `"*"`, and condition values may be strings, numbers
//! or booleans.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::slice;
use std::str::FromStr;

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effective_arp::{EffectiveArp, EffectivePrincipal};
use crate::effective_condition::EffectiveCondition;
use crate::error::PolicyError;
use crate::policy_shard::PolicyShard;
use crate::traits::Arp;
use crate::types::{Action, Condition, Effect, Principal, RawConditionCollection, Resource};

pub const DEFAULT_POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

/// A `Principal` or `NotPrincipal` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrincipalCollection {
    /// `"Principal": "*"`
    Wildcard(String),
    /// `"Principal": {"AWS": [...], "Service": "..."}`
    Typed(BTreeMap<String, OneOrMany<String>>),
}

impl PrincipalCollection {
    /// The principals named by this block. A bare string is an AWS principal.
    pub fn principals(&self) -> Vec<Principal> {
        match self {
            PrincipalCollection::Wildcard(value) => vec![Principal::new("AWS", value.as_str())],
            PrincipalCollection::Typed(typed) => typed
                .iter()
                .flat_map(|(principal_type, values)| {
                    values
                        .as_slice()
                        .iter()
                        .map(move |value| Principal::new(principal_type.as_str(), value.as_str()))
                })
                .collect(),
        }
    }
}

/// A single condition value. Lists never match here, so a JSON array
/// always lands in [`OneOrMany::Many`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Display for ConditionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConditionValue::String(s) => write!(f, "{s}"),
            ConditionValue::Number(n) => write!(f, "{n}"),
            ConditionValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

pub type ConditionBlock = BTreeMap<String, BTreeMap<String, OneOrMany<ConditionValue>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_action: Option<OneOrMany<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_resource: Option<OneOrMany<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<PrincipalCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_principal: Option<PrincipalCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionBlock>,
}

/// Effective values for one dimension: one per listed value, or the
/// wildcard minus the `Not*` values, or the bare wildcard.
///
/// A `Not*` list that covers the wildcard leaves nothing, and yields no
/// values rather than an error.
fn expand<T: Arp>(
    field: &str,
    included: Option<&OneOrMany<T>>,
    excluded: Option<&OneOrMany<T>>,
    wildcard: T,
) -> Result<Vec<EffectiveArp<T>>, PolicyError> {
    match (included, excluded) {
        (Some(_), Some(_)) => Err(PolicyError::ParseError(format!(
            "statement cannot have both {field} and Not{field}"
        ))),
        (Some(values), None) => Ok(values
            .as_slice()
            .iter()
            .cloned()
            .map(EffectiveArp::from_inclusion)
            .collect()),
        (None, Some(values)) => {
            Ok(EffectiveArp::factory(wildcard, values.as_slice().iter().cloned())
                .into_iter()
                .collect())
        }
        (None, None) => Ok(vec![EffectiveArp::from_inclusion(wildcard)]),
    }
}

impl Statement {
    pub fn raw_conditions(&self) -> RawConditionCollection {
        self.condition
            .iter()
            .flatten()
            .map(|(operator, keys)| {
                let keys: BTreeMap<String, Vec<String>> = keys
                    .iter()
                    .map(|(key, values)| {
                        (
                            key.clone(),
                            values.as_slice().iter().map(ToString::to_string).collect(),
                        )
                    })
                    .collect();
                (operator.clone(), keys)
            })
            .collect()
    }

    pub fn effective_condition(&self) -> EffectiveCondition {
        EffectiveCondition::new(Condition::from_collection(&self.raw_conditions()), [])
    }

    fn effective_principals(&self) -> Result<Vec<EffectivePrincipal>, PolicyError> {
        match (&self.principal, &self.not_principal) {
            (Some(_), Some(_)) => Err(PolicyError::ParseError(
                "statement cannot have both Principal and NotPrincipal".to_string(),
            )),
            (Some(principal), None) => Ok(principal
                .principals()
                .into_iter()
                .map(EffectiveArp::from_inclusion)
                .collect()),
            (None, Some(not_principal)) => {
                let mut by_type: BTreeMap<String, Vec<Principal>> = BTreeMap::new();
                for principal in not_principal.principals() {
                    by_type
                        .entry(principal.principal_type().to_string())
                        .or_default()
                        .push(principal);
                }
                Ok(by_type
                    .into_iter()
                    .filter_map(|(principal_type, excluded)| {
                        EffectiveArp::factory(Principal::new(principal_type, "*"), excluded)
                    })
                    .collect())
            }
            (None, None) => Ok(vec![EffectiveArp::from_inclusion(Principal::any_aws())]),
        }
    }

    /// Expand into one shard per (action, resource, principal) combination,
    /// ordered by action, then resource, then principal.
    pub fn policy_shards(&self) -> Result<Vec<PolicyShard>, PolicyError> {
        let actions = expand(
            "Action",
            self.action.as_ref(),
            self.not_action.as_ref(),
            Action::new("*"),
        )?;
        let resources = expand(
            "Resource",
            self.resource.as_ref(),
            self.not_resource.as_ref(),
            Resource::new("*"),
        )?;
        let principals = self.effective_principals()?;
        let condition = self.effective_condition();

        let shards: Vec<PolicyShard> = iproduct!(&actions, &resources, &principals)
            .map(|(action, resource, principal)| {
                PolicyShard::new(
                    self.effect,
                    action.clone(),
                    resource.clone(),
                    principal.clone(),
                    condition.clone(),
                )
            })
            .collect();

        debug!(
            event = "Expand",
            sid = self.sid.as_deref().unwrap_or(""),
            effect = %self.effect,
            shards = shards.len(),
        );
        Ok(shards)
    }
}

fn default_version() -> String {
    DEFAULT_POLICY_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    #[serde(default = "default_version")]
    pub version: String,
    pub statement: OneOrMany<Statement>,
}

impl Policy {
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn statements(&self) -> &[Statement] {
        self.statement.as_slice()
    }

    /// The shards of every statement, in statement order.
    pub fn policy_shards(&self) -> Result<Vec<PolicyShard>, PolicyError> {
        let mut shards = Vec::new();
        for statement in self.statements() {
            shards.extend(statement.policy_shards()?);
        }
        Ok(shards)
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::from_json(s)
    }
}
