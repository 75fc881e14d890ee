// src/lib.rs
pub use config::ReductionConfig;
pub use effective_arp::{EffectiveAction, EffectiveArp, EffectivePrincipal, EffectiveResource};
pub use effective_condition::EffectiveCondition;
pub use error::PolicyError;
pub use policy_shard::PolicyShard;
pub use reducer::{ShardReducer, dedupe_policy_shards, policy_shards_effect};
pub use render::{
    EffectiveConditionDocument, EffectivePrincipalDocument, EffectiveValueDocument, Language,
    PolicyShardDocument, RenderOptions, policy_shards_to_json,
};
pub use statement::{
    ConditionBlock, ConditionValue, OneOrMany, Policy, PrincipalCollection, Statement,
};
pub use traits::Arp;
pub use types::{
    Action, ArpType, ArpValue, Condition, Effect, Principal, RawConditionCollection, Resource,
};

pub mod glob;
pub mod metrics;

mod config;
mod effective_arp;
mod effective_condition;
mod error;
mod policy_shard;
mod reducer;
mod render;
mod statement;
mod timers;
mod traits;
mod types;
