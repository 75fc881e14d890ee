//! Names of the value kinds that make up a policy shard.

use crate::error::PolicyError;

/// The kinds of value a shard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArpType {
    /// An API action such as `s3:GetObject`
    Action,
    /// A resource ARN such as `arn:aws:s3:::bucket/*`
    Resource,
    /// A principal such as `AWS arn:aws:iam::123456789012:root`
    Principal,
}

impl AsRef<str> for ArpType {
    fn as_ref(&self) -> &str {
        match self {
            Self::Action => "Action",
            Self::Resource => "Resource",
            Self::Principal => "Principal",
        }
    }
}

impl std::str::FromStr for ArpType {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Action" => Ok(Self::Action),
            "Resource" => Ok(Self::Resource),
            "Principal" => Ok(Self::Principal),
            _ => Err(PolicyError::InvalidFormat(format!("Unknown value type: {s}"))),
        }
    }
}

impl std::fmt::Display for ArpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
