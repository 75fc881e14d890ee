use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::PolicyError;
use crate::traits::Arp;

use super::{Action, ArpType, Principal, Resource};

/// An action, resource or principal whose kind is only known at runtime.
///
/// Typed code compares values of one kind directly through [`Arp`]; this
/// wrapper is for callers that hold mixed values and must reject
/// comparisons across kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArpValue {
    Action(Action),
    Resource(Resource),
    Principal(Principal),
}

impl ArpValue {
    /// Build a value from a kind name and its text.
    ///
    /// Principals are written as in their display form, `TYPE value`.
    pub fn parse(kind: &str, value: &str) -> Result<ArpValue, PolicyError> {
        match kind.parse::<ArpType>()? {
            ArpType::Action => Ok(ArpValue::Action(Action::new(value))),
            ArpType::Resource => Ok(ArpValue::Resource(Resource::new(value))),
            ArpType::Principal => {
                let (principal_type, principal) = value
                    .split_once(' ')
                    .filter(|(t, v)| !t.is_empty() && !v.is_empty())
                    .ok_or_else(|| {
                        PolicyError::InvalidFormat(format!(
                            "Principal must be written as 'TYPE value': {value}"
                        ))
                    })?;
                Ok(ArpValue::Principal(Principal::new(principal_type, principal)))
            }
        }
    }

    pub fn arp_type(&self) -> ArpType {
        match self {
            ArpValue::Action(_) => Action::arp_type(),
            ArpValue::Resource(_) => Resource::arp_type(),
            ArpValue::Principal(_) => Principal::arp_type(),
        }
    }

    fn mismatch(&self, other: &ArpValue) -> PolicyError {
        PolicyError::TypeMismatch {
            left: self.arp_type().to_string(),
            right: other.arp_type().to_string(),
        }
    }

    pub fn issubset(&self, other: &ArpValue) -> Result<bool, PolicyError> {
        match (self, other) {
            (ArpValue::Action(a), ArpValue::Action(b)) => Ok(a.issubset(b)),
            (ArpValue::Resource(a), ArpValue::Resource(b)) => Ok(a.issubset(b)),
            (ArpValue::Principal(a), ArpValue::Principal(b)) => Ok(a.issubset(b)),
            _ => Err(self.mismatch(other)),
        }
    }

    pub fn is_strict_subset(&self, other: &ArpValue) -> Result<bool, PolicyError> {
        Ok(self != other && self.issubset(other)?)
    }
}

impl Display for ArpValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ArpValue::Action(a) => write!(f, "{a}"),
            ArpValue::Resource(r) => write!(f, "{r}"),
            ArpValue::Principal(p) => write!(f, "{p}"),
        }
    }
}

impl From<Action> for ArpValue {
    fn from(value: Action) -> Self {
        ArpValue::Action(value)
    }
}

impl From<Resource> for ArpValue {
    fn from(value: Resource) -> Self {
        ArpValue::Resource(value)
    }
}

impl From<Principal> for ArpValue {
    fn from(value: Principal) -> Self {
        ArpValue::Principal(value)
    }
}
