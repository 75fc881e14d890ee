//! Value types that make up a policy shard.
//!
//! Canonical string forms:
//! - Action: `s3:GetObject`, wildcards allowed (`s3:Get*`), case-insensitive
//! - Resource: `arn:aws:s3:::bucket/*` or `*`, case-sensitive
//! - Principal: `AWS arn:aws:iam::123456789012:root` (type then value)
//! - Condition: `aws:PrincipalOrgId StringEquals ['o-123456']`

mod action;
mod arp_type;
mod arp_value;
mod condition;
mod effect;
mod principal;
mod resource;

pub use action::Action;
pub use arp_type::ArpType;
pub use arp_value::ArpValue;
pub use condition::{Condition, RawConditionCollection};
pub use effect::Effect;
pub use principal::Principal;
pub use resource::Resource;
