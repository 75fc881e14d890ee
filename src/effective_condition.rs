//! Conditions that must hold (inclusions) and conditions that must not
//! hold (exclusions) for a shard to apply.
//!
//! Exclusions with a reversible operator are rewritten as the reversed
//! inclusion on construction, so only true negations remain as exclusions.

use std::collections::BTreeSet;

use tracing::trace;

use crate::types::Condition;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectiveCondition {
    inclusions: BTreeSet<Condition>,
    exclusions: BTreeSet<Condition>,
}

impl EffectiveCondition {
    pub fn new<I, E>(inclusions: I, exclusions: E) -> Self
    where
        I: IntoIterator<Item = Condition>,
        E: IntoIterator<Item = Condition>,
    {
        let mut effective = EffectiveCondition {
            inclusions: inclusions.into_iter().collect(),
            exclusions: BTreeSet::new(),
        };
        for exclusion in exclusions {
            match exclusion.reverse() {
                Ok(reversed) => {
                    effective.inclusions.insert(reversed);
                }
                Err(_) => {
                    trace!(
                        event = "Condition",
                        condition = %exclusion,
                        "Keeping non-reversible condition as an exclusion"
                    );
                    effective.exclusions.insert(exclusion);
                }
            }
        }
        effective
    }

    pub fn inclusions(&self) -> &BTreeSet<Condition> {
        &self.inclusions
    }

    pub fn exclusions(&self) -> &BTreeSet<Condition> {
        &self.exclusions
    }

    /// True when there is nothing to satisfy.
    pub fn is_empty(&self) -> bool {
        self.inclusions.is_empty() && self.exclusions.is_empty()
    }

    /// Swap sides: every inclusion becomes its negation (reversed where the
    /// operator allows it, otherwise kept verbatim as an exclusion) and every
    /// exclusion becomes an inclusion.
    pub fn reverse(&self) -> Self {
        let mut inclusions: BTreeSet<Condition> = self.exclusions.clone();
        let mut exclusions = BTreeSet::new();
        for inclusion in &self.inclusions {
            match inclusion.reverse() {
                Ok(reversed) => {
                    inclusions.insert(reversed);
                }
                Err(_) => {
                    exclusions.insert(inclusion.clone());
                }
            }
        }
        EffectiveCondition {
            inclusions,
            exclusions,
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        EffectiveCondition::new(
            self.inclusions.union(&other.inclusions).cloned(),
            self.exclusions.union(&other.exclusions).cloned(),
        )
    }

    pub fn intersection(&self, other: &Self) -> Self {
        EffectiveCondition::new(
            self.inclusions.intersection(&other.inclusions).cloned(),
            self.exclusions.intersection(&other.exclusions).cloned(),
        )
    }

    pub fn difference(&self, other: &Self) -> Self {
        EffectiveCondition::new(
            self.inclusions.difference(&other.inclusions).cloned(),
            self.exclusions.difference(&other.exclusions).cloned(),
        )
    }

    /// True if `self` is at least as restrictive as `other`: every condition
    /// `other` requires is also required by `self`.
    pub fn issubset(&self, other: &Self) -> bool {
        other.inclusions.is_subset(&self.inclusions) && other.exclusions.is_subset(&self.exclusions)
    }

    /// True if the two can never hold at once: both require something and
    /// share no requirement, or one requires what the other rules out.
    pub fn is_mutually_exclusive(&self, other: &Self) -> bool {
        if !self.inclusions.is_empty()
            && !other.inclusions.is_empty()
            && self.inclusions.is_disjoint(&other.inclusions)
        {
            return true;
        }
        !self.inclusions.is_disjoint(&other.exclusions)
            || !other.inclusions.is_disjoint(&self.exclusions)
    }
}
