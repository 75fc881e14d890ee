//! A policy shard: one effect over one effective action, resource and
//! principal, under one effective condition.
//!
//! Statements expand into shards and every reduction works on shards. Two
//! shards with different conditions are never merged; the condition only
//! ever narrows what a shard covers.

use itertools::{Itertools, iproduct};
use tracing::trace;

use crate::effective_arp::{EffectiveAction, EffectivePrincipal, EffectiveResource};
use crate::effective_condition::EffectiveCondition;
use crate::error::PolicyError;
use crate::types::Effect;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolicyShard {
    effect: Effect,
    effective_action: EffectiveAction,
    effective_resource: EffectiveResource,
    effective_principal: EffectivePrincipal,
    effective_condition: EffectiveCondition,
}

/// One or two candidates for a dimension, without repeats.
fn choices<T: Clone + PartialEq>(own: &T, overlap: &T) -> Vec<T> {
    if own == overlap {
        vec![own.clone()]
    } else {
        vec![own.clone(), overlap.clone()]
    }
}

impl PolicyShard {
    pub fn new(
        effect: Effect,
        effective_action: EffectiveAction,
        effective_resource: EffectiveResource,
        effective_principal: EffectivePrincipal,
        effective_condition: EffectiveCondition,
    ) -> Self {
        PolicyShard {
            effect,
            effective_action,
            effective_resource,
            effective_principal,
            effective_condition,
        }
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn effective_action(&self) -> &EffectiveAction {
        &self.effective_action
    }

    pub fn effective_resource(&self) -> &EffectiveResource {
        &self.effective_resource
    }

    pub fn effective_principal(&self) -> &EffectivePrincipal {
        &self.effective_principal
    }

    pub fn effective_condition(&self) -> &EffectiveCondition {
        &self.effective_condition
    }

    fn with_arp(
        &self,
        effective_action: EffectiveAction,
        effective_resource: EffectiveResource,
        effective_principal: EffectivePrincipal,
        effective_condition: EffectiveCondition,
    ) -> Self {
        PolicyShard::new(
            self.effect,
            effective_action,
            effective_resource,
            effective_principal,
            effective_condition,
        )
    }

    fn check_operation(&self, other: &Self, operation: &str) -> Result<(), PolicyError> {
        if self.effect == Effect::Deny && other.effect == Effect::Allow {
            return Err(PolicyError::UndefinedOperation {
                operation: operation.to_string(),
                lhs: self.effect.to_string(),
                rhs: other.effect.to_string(),
            });
        }
        Ok(())
    }

    /// True if action, resource and principal are each subsets of
    /// `other`'s, ignoring effect and condition.
    pub fn arp_issubset(&self, other: &Self) -> bool {
        self.effective_action.issubset(&other.effective_action)
            && self.effective_resource.issubset(&other.effective_resource)
            && self.effective_principal.issubset(&other.effective_principal)
    }

    /// True if `other` covers every request `self` covers: same effect,
    /// wider or equal values, and no condition beyond what `self` requires.
    pub fn issubset(&self, other: &Self) -> bool {
        self.effect == other.effect
            && self.arp_issubset(other)
            && self.effective_condition.issubset(&other.effective_condition)
    }

    pub fn union(&self, other: &Self) -> Vec<Self> {
        if self.effect != other.effect {
            return vec![self.clone(), other.clone()];
        }
        if self.issubset(other) {
            return vec![other.clone()];
        }
        if other.issubset(self) {
            return vec![self.clone()];
        }
        if self.effective_condition != other.effective_condition {
            return vec![self.clone(), other.clone()];
        }

        // The product of per-dimension unions is only exact when at most
        // one dimension differs.
        let differing = [
            self.effective_action != other.effective_action,
            self.effective_resource != other.effective_resource,
            self.effective_principal != other.effective_principal,
        ]
        .iter()
        .filter(|d| **d)
        .count();
        if differing > 1 {
            return vec![self.clone(), other.clone()];
        }

        iproduct!(
            self.effective_action.union(&other.effective_action),
            self.effective_resource.union(&other.effective_resource),
            self.effective_principal.union(&other.effective_principal)
        )
        .map(|(action, resource, principal)| {
            self.with_arp(action, resource, principal, self.effective_condition.clone())
        })
        .collect()
    }

    /// The requests both shards cover, carrying `self`'s effect and
    /// condition.
    ///
    /// Fails for a Deny `self` against an Allow `other`.
    pub fn intersection(&self, other: &Self) -> Result<Option<Self>, PolicyError> {
        self.check_operation(other, "intersection")?;

        let Some(action) = self.effective_action.intersection(&other.effective_action) else {
            return Ok(None);
        };
        let Some(resource) = self.effective_resource.intersection(&other.effective_resource) else {
            return Ok(None);
        };
        let Some(principal) = self
            .effective_principal
            .intersection(&other.effective_principal)
        else {
            return Ok(None);
        };

        if self.effect == other.effect
            && self
                .effective_condition
                .is_mutually_exclusive(&other.effective_condition)
        {
            return Ok(None);
        }

        Ok(Some(self.with_arp(
            action,
            resource,
            principal,
            self.effective_condition.clone(),
        )))
    }

    /// The requests `self` covers that `other` does not.
    ///
    /// Each dimension's difference is paired with `self`'s and the overlap's
    /// values in the other two dimensions. When `other` is conditional, the
    /// overlap survives under the condition that `other`'s condition fails
    /// (effects differ) or under `self`'s own condition (effects match).
    pub fn difference(&self, other: &Self) -> Result<Vec<Self>, PolicyError> {
        self.check_operation(other, "difference")?;

        let Some(overlap) = self.intersection(other)? else {
            return Ok(vec![self.clone()]);
        };

        let actions = choices(&self.effective_action, &overlap.effective_action);
        let resources = choices(&self.effective_resource, &overlap.effective_resource);
        let principals = choices(&self.effective_principal, &overlap.effective_principal);
        let condition = &self.effective_condition;

        let mut result: Vec<Self> = Vec::new();
        for action in self.effective_action.difference(&other.effective_action) {
            for (resource, principal) in iproduct!(&resources, &principals) {
                result.push(self.with_arp(
                    action.clone(),
                    resource.clone(),
                    principal.clone(),
                    condition.clone(),
                ));
            }
        }
        for resource in self.effective_resource.difference(&other.effective_resource) {
            for (action, principal) in iproduct!(&actions, &principals) {
                result.push(self.with_arp(
                    action.clone(),
                    resource.clone(),
                    principal.clone(),
                    condition.clone(),
                ));
            }
        }
        for principal in self.effective_principal.difference(&other.effective_principal) {
            for (action, resource) in iproduct!(&actions, &resources) {
                result.push(self.with_arp(
                    action.clone(),
                    resource.clone(),
                    principal.clone(),
                    condition.clone(),
                ));
            }
        }

        if !other.effective_condition.is_empty()
            && self.effective_condition != other.effective_condition
        {
            let residual_condition = if self.effect != other.effect {
                condition.union(&other.effective_condition.reverse())
            } else {
                condition.clone()
            };
            result.push(self.with_arp(
                overlap.effective_action,
                overlap.effective_resource,
                overlap.effective_principal,
                residual_condition,
            ));
        }

        let result: Vec<Self> = result.into_iter().unique().collect();
        trace!(
            event = "Difference",
            lhs = %self.effect,
            rhs = %other.effect,
            pieces = result.len(),
        );
        Ok(result)
    }
}
