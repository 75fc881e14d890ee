use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::types::ArpType;

/// A single action, resource or principal value that can be compared by
/// the set of concrete values it matches.
///
/// Implementors define `issubset`; equality comes from `Eq` and the strict
/// ordering is derived from the two.
pub trait Arp: Clone + Debug + Display + Eq + Ord + Hash {
    /// The kind of value ("Action", "Resource", "Principal").
    fn arp_type() -> ArpType;

    /// True if every concrete value matched by `self` is matched by `other`.
    fn issubset(&self, other: &Self) -> bool;

    /// Subset but not equal.
    fn is_strict_subset(&self, other: &Self) -> bool {
        self != other && self.issubset(other)
    }
}
