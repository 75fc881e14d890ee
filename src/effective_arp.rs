//! A single inclusion minus a set of exclusions.
//!
//! `EffectiveArp<Action>` with inclusion `s3:*` and exclusion `s3:Get*`
//! means "every S3 action that is not a Get". Each exclusion must be a
//! proper subset of the inclusion and exclusions that sit inside another
//! exclusion are dropped, so structural equality is meaningful.
//!
//! Glob patterns cannot express every region, so the operations here
//! approximate when an exclusion only partially overlaps a value: such
//! exclusions are dropped from intersections and from carved-out pieces.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::once;

use itertools::Itertools;

use crate::error::PolicyError;
use crate::traits::Arp;
use crate::types::{Action, Principal, Resource};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectiveArp<T: Arp> {
    inclusion: T,
    exclusions: BTreeSet<T>,
}

pub type EffectiveAction = EffectiveArp<Action>;
pub type EffectiveResource = EffectiveArp<Resource>;
pub type EffectivePrincipal = EffectiveArp<Principal>;

/// Drop exclusions already covered by a strictly wider exclusion.
fn prune_nested<T: Arp>(exclusions: BTreeSet<T>) -> BTreeSet<T> {
    exclusions
        .iter()
        .filter(|e| {
            !exclusions
                .iter()
                .any(|wider| e.is_strict_subset(wider) && !wider.issubset(e))
        })
        .cloned()
        .collect()
}

impl<T: Arp> EffectiveArp<T> {
    /// Build a value, rejecting any exclusion that is not a proper subset of
    /// the inclusion.
    pub fn new<I: IntoIterator<Item = T>>(inclusion: T, exclusions: I) -> Result<Self, PolicyError> {
        let exclusions: BTreeSet<T> = exclusions.into_iter().collect();
        if let Some(bad) = exclusions.iter().find(|e| !e.is_strict_subset(&inclusion)) {
            return Err(PolicyError::InvalidExclusion {
                inclusion: inclusion.to_string(),
                exclusion: bad.to_string(),
            });
        }
        Ok(EffectiveArp {
            exclusions: prune_nested(exclusions),
            inclusion,
        })
    }

    /// Like [`EffectiveArp::new`], but an invalid combination yields `None`.
    pub fn factory<I: IntoIterator<Item = T>>(inclusion: T, exclusions: I) -> Option<Self> {
        Self::new(inclusion, exclusions).ok()
    }

    pub fn from_inclusion(inclusion: T) -> Self {
        EffectiveArp {
            inclusion,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn inclusion(&self) -> &T {
        &self.inclusion
    }

    pub fn exclusions(&self) -> &BTreeSet<T> {
        &self.exclusions
    }

    /// True if `value` falls entirely inside one of the exclusions.
    pub fn in_exclusions(&self, value: &T) -> bool {
        self.exclusions.iter().any(|e| value.issubset(e))
    }

    /// True if everything `self` matches is matched by `other`.
    pub fn issubset(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        if !self.inclusion.issubset(&other.inclusion) || other.in_exclusions(&self.inclusion) {
            return false;
        }
        other
            .exclusions
            .iter()
            .filter(|e| e.issubset(&self.inclusion))
            .all(|e| self.in_exclusions(e))
    }

    pub fn is_strict_subset(&self, other: &Self) -> bool {
        self != other && self.issubset(other)
    }

    /// The part of `region` that `self` still matches, when expressible.
    fn carve(&self, region: &T) -> Option<Self> {
        if !region.issubset(&self.inclusion) || self.in_exclusions(region) {
            return None;
        }
        let exclusions = self
            .exclusions
            .iter()
            .filter(|e| e.is_strict_subset(region))
            .cloned();
        Self::factory(region.clone(), exclusions)
    }

    /// One value when either side covers the other, otherwise both.
    pub fn union(&self, other: &Self) -> Vec<Self> {
        if self.issubset(other) {
            vec![other.clone()]
        } else if other.issubset(self) {
            vec![self.clone()]
        } else {
            vec![self.clone(), other.clone()]
        }
    }

    /// The overlap of two values, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let (narrow, wide) = if self.inclusion.issubset(&other.inclusion) {
            (self, other)
        } else if other.inclusion.issubset(&self.inclusion) {
            (other, self)
        } else {
            return None;
        };
        if wide.in_exclusions(&narrow.inclusion) {
            return None;
        }
        let exclusions = self
            .exclusions
            .iter()
            .chain(other.exclusions.iter())
            .filter(|e| e.is_strict_subset(&narrow.inclusion))
            .cloned();
        Self::factory(narrow.inclusion.clone(), exclusions)
    }

    /// What `self` matches that `other` does not, as zero or more values.
    pub fn difference(&self, other: &Self) -> Vec<Self> {
        if self.inclusion.issubset(&other.inclusion) {
            if other.in_exclusions(&self.inclusion) {
                return vec![self.clone()];
            }
            // Only the holes punched in `other` survive.
            return other
                .exclusions
                .iter()
                .filter_map(|e| self.carve(e))
                .collect();
        }
        if !other.inclusion.issubset(&self.inclusion) || self.in_exclusions(&other.inclusion) {
            return vec![self.clone()];
        }

        let exclusions = self
            .exclusions
            .iter()
            .filter(|e| !e.issubset(&other.inclusion))
            .cloned()
            .chain(once(other.inclusion.clone()));
        let mut result: Vec<Self> = Self::factory(self.inclusion.clone(), exclusions)
            .into_iter()
            .collect();
        result.extend(other.exclusions.iter().filter_map(|e| self.carve(e)));
        result
    }
}

impl<T: Arp> From<T> for EffectiveArp<T> {
    fn from(inclusion: T) -> Self {
        EffectiveArp::from_inclusion(inclusion)
    }
}

impl<T: Arp> Display for EffectiveArp<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.inclusion)?;
        if !self.exclusions.is_empty() {
            write!(f, " (except for {})", self.exclusions.iter().join(", "))?;
        }
        Ok(())
    }
}
