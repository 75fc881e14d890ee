//! Resource ARNs, e.g. `arn:aws:s3:::bucket/*`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::glob::glob_match;
use crate::traits::Arp;

use super::arp_type::ArpType;

/// Number of colon-separated segments in an ARN.
const ARN_SEGMENTS: usize = 6;

/// A resource ARN, possibly containing wildcards. Case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub struct Resource(String);

impl Resource {
    pub fn new<T: Into<String>>(resource: T) -> Self {
        Resource(resource.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The six ARN segments (`arn`, partition, service, region, account,
    /// resource). Blank or missing segments are `*`, and a bare `*` expands
    /// to six wildcards. The resource segment keeps any further colons.
    pub fn arn_elements(&self) -> Vec<String> {
        let mut elements: Vec<String> = self
            .0
            .splitn(ARN_SEGMENTS, ':')
            .map(|segment| {
                if segment.is_empty() {
                    "*".to_string()
                } else {
                    segment.to_string()
                }
            })
            .collect();
        elements.resize(ARN_SEGMENTS, "*".to_string());
        elements
    }
}

impl From<&str> for Resource {
    fn from(value: &str) -> Self {
        Resource::new(value)
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl Arp for Resource {
    fn arp_type() -> ArpType {
        ArpType::Resource
    }

    fn issubset(&self, other: &Self) -> bool {
        if self == other || other.0 == "*" {
            return true;
        }
        self.arn_elements()
            .iter()
            .zip(other.arn_elements().iter())
            .all(|(mine, theirs)| glob_match(mine, theirs))
    }
}
