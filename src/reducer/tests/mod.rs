use super::*;
use crate::effective_arp::EffectiveArp;
use crate::effective_condition::EffectiveCondition;
use crate::types::{Action, Condition, Principal, Resource};


pub(super) const BUCKET: &str = "arn:aws:s3:::DOC-EXAMPLE-BUCKET/*";

pub(super) fn shard(
    effect: Effect,
    action: (&str, &[&str]),
    resource: (&str, &[&str]),
    condition: EffectiveCondition,
) -> PolicyShard {
    PolicyShard::new(
        effect,
        EffectiveArp::new(Action::new(action.0), action.1.iter().map(|a| Action::new(*a))).unwrap(),
        EffectiveArp::new(
            Resource::new(resource.0),
            resource.1.iter().map(|r| Resource::new(*r)),
        )
        .unwrap(),
        EffectiveArp::from_inclusion(Principal::any_aws()),
        condition,
    )
}

pub(super) fn allow(action: &str, resource: &str) -> PolicyShard {
    shard(Effect::Allow, (action, &[]), (resource, &[]), EffectiveCondition::default())
}

pub(super) fn deny(action: &str, resource: &str) -> PolicyShard {
    shard(Effect::Deny, (action, &[]), (resource, &[]), EffectiveCondition::default())
}

pub(super) fn org() -> Condition {
    Condition::new("aws:PrincipalOrgId", "StringNotEquals", ["o-123456"])
}

pub(super) fn sse() -> Condition {
    Condition::new("s3:x-amz-server-side-encryption", "StringNotEquals", ["AES256"])
}

pub(super) fn when(conditions: &[Condition]) -> EffectiveCondition {
    EffectiveCondition::new(conditions.iter().cloned(), [])
}

/// Allow on one bucket, a conditional Allow on everything and a
/// conditional Deny on everything outside the bucket.
pub(super) const EXCEPTION_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Effect": "Allow",
            "Action": "s3:GetObject",
            "Resource": "arn:aws:s3:::DOC-EXAMPLE-BUCKET/*"
        },
        {
            "Effect": "Allow",
            "Action": "s3:*",
            "Resource": "*",
            "Condition": {"StringNotEquals": {"aws:PrincipalOrgId": "o-123456"}}
        },
        {
            "Effect": "Deny",
            "Action": "s3:*",
            "NotResource": "arn:aws:s3:::DOC-EXAMPLE-BUCKET/*",
            "Condition": {"StringNotEquals": {"s3:x-amz-server-side-encryption": "AES256"}}
        }
    ]
}"#;

#[test]
fn test_effective_permissions_end_to_end() {
    let policy = Policy::from_json(EXCEPTION_POLICY).unwrap();
    let result = ShardReducer::default().effective_permissions(&policy).unwrap();

    assert_eq!(
        result,
        vec![
            allow("s3:GetObject", BUCKET),
            shard(Effect::Allow, ("s3:*", &["s3:GetObject"]), (BUCKET, &[]), when(&[org()])),
            shard(
                Effect::Allow,
                ("s3:*", &[]),
                ("*", &[BUCKET]),
                EffectiveCondition::new([org()], [sse()]),
            ),
        ]
    );
}

#[test]
fn test_shard_limit_in_effect() {
    let reducer = ShardReducer::new(ReductionConfig::default().with_max_shards(2));
    let shards = vec![allow("s3:*", "*"), allow("ec2:*", "*"), deny("s3:Get*", "*")];
    let err = reducer.effect(&shards).unwrap_err();
    assert_eq!(
        err,
        PolicyError::ShardLimitExceeded {
            limit: 2,
            phase: "effect".to_string(),
        }
    );
}

#[test]
fn test_shard_limit_while_carving() {
    // One allow split by a deny that punches holes in two dimensions.
    let reducer = ShardReducer::new(ReductionConfig::default().with_max_shards(2));
    let shards = vec![allow("*", "*"), deny("s3:*", BUCKET)];
    assert!(matches!(
        reducer.effect(&shards),
        Err(PolicyError::ShardLimitExceeded { .. })
    ));
}

#[test]
fn test_pass_limit_in_dedupe() {
    let reducer = ShardReducer::new(ReductionConfig::default().with_max_passes(1));
    let shards = vec![allow("s3:*", "*"), allow("s3:*", "*")];
    assert_eq!(
        reducer.dedupe(&shards).unwrap_err(),
        PolicyError::DidNotConverge(1)
    );
}

#[test]
fn test_free_functions_use_defaults() {
    let shards = vec![allow("s3:*", "*"), deny("s3:Get*", "*")];
    assert_eq!(
        policy_shards_effect(&shards).unwrap(),
        ShardReducer::default().effect(&shards).unwrap()
    );
    assert_eq!(
        dedupe_policy_shards(&shards).unwrap(),
        ShardReducer::default().dedupe(&shards).unwrap()
    );
}
