//! API actions, e.g. `s3:GetObject` or `s3:Get*`.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::glob::glob_match;
use crate::traits::Arp;

use super::arp_type::ArpType;

/// An action name, possibly containing wildcards.
///
/// Actions are case-insensitive: `S3:GetObject` and `s3:getobject` are the
/// same action. The original spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Action(String);

impl Action {
    pub fn new<T: Into<String>>(action: T) -> Self {
        Action(action.into())
    }

    /// The action as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Action::new(value)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0) || self.folded() == other.folded()
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
    }
}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(&other.folded())
    }
}

impl Arp for Action {
    fn arp_type() -> ArpType {
        ArpType::Action
    }

    fn issubset(&self, other: &Self) -> bool {
        glob_match(&self.folded(), &other.folded())
    }
}
