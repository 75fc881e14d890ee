//! JSON and plain-English renderings of policy shards.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::effective_arp::EffectiveArp;
use crate::effective_condition::EffectiveCondition;
use crate::error::PolicyError;
use crate::policy_shard::PolicyShard;
use crate::traits::Arp;
use crate::types::{Condition, Effect, Principal};

/// Options for [`policy_shards_to_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenderOptions {
    /// Omit empty exclusion and condition arrays instead of rendering `[]`
    pub exclude_defaults: bool,
}

/// Languages [`PolicyShard::explain_in`] can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Language {
    #[strum(serialize = "en")]
    English,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EffectiveValueDocument {
    pub inclusion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EffectivePrincipalDocument {
    pub inclusion: Principal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<Principal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EffectiveConditionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusions: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<Condition>>,
}

/// The serialized form of one [`PolicyShard`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PolicyShardDocument {
    pub effect: Effect,
    pub effective_action: EffectiveValueDocument,
    pub effective_resource: EffectiveValueDocument,
    pub effective_principal: EffectivePrincipalDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_condition: Option<EffectiveConditionDocument>,
}

fn optional<T>(values: Vec<T>, options: &RenderOptions) -> Option<Vec<T>> {
    if options.exclude_defaults && values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn value_document<T: Arp>(value: &EffectiveArp<T>, options: &RenderOptions) -> EffectiveValueDocument {
    EffectiveValueDocument {
        inclusion: value.inclusion().to_string(),
        exclusions: optional(
            value.exclusions().iter().map(ToString::to_string).collect(),
            options,
        ),
    }
}

fn condition_document(
    condition: &EffectiveCondition,
    options: &RenderOptions,
) -> Option<EffectiveConditionDocument> {
    if options.exclude_defaults && condition.is_empty() {
        return None;
    }
    Some(EffectiveConditionDocument {
        inclusions: optional(condition.inclusions().iter().cloned().collect(), options),
        exclusions: optional(condition.exclusions().iter().cloned().collect(), options),
    })
}

impl PolicyShardDocument {
    pub fn from_shard(shard: &PolicyShard, options: &RenderOptions) -> Self {
        let principal = shard.effective_principal();
        PolicyShardDocument {
            effect: shard.effect(),
            effective_action: value_document(shard.effective_action(), options),
            effective_resource: value_document(shard.effective_resource(), options),
            effective_principal: EffectivePrincipalDocument {
                inclusion: principal.inclusion().clone(),
                exclusions: optional(principal.exclusions().iter().cloned().collect(), options),
            },
            effective_condition: condition_document(shard.effective_condition(), options),
        }
    }
}

/// Render shards as a pretty-printed JSON array.
pub fn policy_shards_to_json(
    shards: &[PolicyShard],
    options: &RenderOptions,
) -> Result<String, PolicyError> {
    let documents: Vec<PolicyShardDocument> = shards
        .iter()
        .map(|shard| PolicyShardDocument::from_shard(shard, options))
        .collect();
    serde_json::to_string_pretty(&documents).map_err(|e| PolicyError::RenderError(e.to_string()))
}

fn explain_english(shard: &PolicyShard) -> String {
    let principal = shard.effective_principal();
    let mut text = format!(
        "{} action {} on resource {} with principal {}",
        shard.effect(),
        shard.effective_action(),
        shard.effective_resource(),
        principal.inclusion(),
    );
    if !principal.exclusions().is_empty() {
        text.push_str(&format!(
            " (except principals {})",
            principal.exclusions().iter().join(", ")
        ));
    }
    text.push('.');

    let condition = shard.effective_condition();
    if !condition.inclusions().is_empty() {
        text.push_str(&format!(
            " Provided conditions {} are met.",
            condition.inclusions().iter().join(" and ")
        ));
    }
    if !condition.exclusions().is_empty() {
        text.push_str(&format!(
            " Unless conditions {} are met.",
            condition.exclusions().iter().join(" and ")
        ));
    }
    text
}

impl PolicyShard {
    /// A plain-English description of what this shard grants or denies.
    pub fn explain(&self) -> String {
        explain_english(self)
    }

    /// [`PolicyShard::explain`] in the requested language. Only `en` is
    /// available.
    pub fn explain_in(&self, language: &str) -> Result<String, PolicyError> {
        let language: Language = language
            .parse()
            .map_err(|_| PolicyError::UnsupportedLanguage(language.to_string()))?;
        match language {
            Language::English => Ok(explain_english(self)),
        }
    }
}
