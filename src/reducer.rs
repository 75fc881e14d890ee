//! Reductions over lists of policy shards.
//!
//! [`ShardReducer::effect`] subtracts every Deny from every Allow, and
//! [`ShardReducer::dedupe`] removes shards covered by others and splits
//! overlapping shards with differing conditions until nothing changes.

use std::time::Duration;

use tracing::debug;

use crate::config::ReductionConfig;
use crate::error::PolicyError;
use crate::metrics::{ReductionKind, ReductionStats, record_reduction};
use crate::policy_shard::PolicyShard;
use crate::statement::Policy;
use crate::timers::PhaseTimer;
use crate::types::Effect;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Default)]
pub struct ShardReducer {
    config: ReductionConfig,
}

/// Drop every shard that is a subset of another, scanning in the given
/// direction. The surviving shards keep their relative order.
fn prune_subsets(shards: &[PolicyShard], reverse: bool) -> (Vec<PolicyShard>, bool) {
    let ordered: Vec<&PolicyShard> = if reverse {
        shards.iter().rev().collect()
    } else {
        shards.iter().collect()
    };

    let mut kept: Vec<PolicyShard> = Vec::with_capacity(shards.len());
    let mut changed = false;
    for shard in ordered {
        if kept.iter().any(|k| shard.issubset(k)) {
            changed = true;
            continue;
        }
        let before = kept.len();
        kept.retain(|k| !k.issubset(shard));
        changed |= kept.len() != before;
        kept.push(shard.clone());
    }

    if reverse {
        kept.reverse();
    }
    (kept, changed)
}

/// True if `shard` overlaps `other` under a condition at least as strict
/// as `other`'s, so the overlap is already covered by `other`.
fn overlaps_broader(shard: &PolicyShard, other: &PolicyShard) -> Result<bool, PolicyError> {
    if shard.effect() != other.effect()
        || shard.effective_condition() == other.effective_condition()
        || !shard
            .effective_condition()
            .issubset(other.effective_condition())
        || shard.issubset(other)
        || other.issubset(shard)
    {
        return Ok(false);
    }
    Ok(shard.intersection(other)?.is_some())
}

/// The parts of `shard` outside `other` that are proper subsets of `shard`.
fn residual_pieces(
    shard: &PolicyShard,
    other: &PolicyShard,
) -> Result<Vec<PolicyShard>, PolicyError> {
    let mut pieces = Vec::new();
    for piece in shard.difference(other)? {
        if piece == *shard || !piece.issubset(shard) {
            continue;
        }
        if piece.intersection(other)?.is_none() {
            pieces.push(piece);
        }
    }
    Ok(pieces)
}

impl ShardReducer {
    pub fn new(config: ReductionConfig) -> Self {
        ShardReducer { config }
    }

    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    fn check_limit(&self, shards: usize, phase: &str) -> Result<(), PolicyError> {
        if shards > self.config.max_shards {
            return Err(PolicyError::ShardLimitExceeded {
                limit: self.config.max_shards,
                phase: phase.to_string(),
            });
        }
        Ok(())
    }

    /// The Allow shards that remain once every Deny shard has been
    /// subtracted from them.
    ///
    /// Deny shards are used as given and are not part of the result.
    pub fn effect(&self, shards: &[PolicyShard]) -> Result<Vec<PolicyShard>, PolicyError> {
        let mut duration = Duration::ZERO;
        let result = {
            let _timer = PhaseTimer::new(&mut duration);
            self.check_limit(shards.len(), "effect")?;

            let (allows, denies): (Vec<&PolicyShard>, Vec<&PolicyShard>) =
                shards.iter().partition(|s| s.effect() == Effect::Allow);

            let mut result = Vec::new();
            for allow in allows {
                let mut remaining = vec![allow.clone()];
                for deny in &denies {
                    let mut next = Vec::new();
                    for candidate in &remaining {
                        next.extend(candidate.difference(deny)?);
                    }
                    self.check_limit(result.len() + next.len(), "effect")?;
                    remaining = next;
                    if remaining.is_empty() {
                        break;
                    }
                }
                result.extend(remaining);
            }

            debug!(
                event = "Reduce",
                phase = "Effect",
                input = shards.len(),
                denies = denies.len(),
                output = result.len(),
            );
            result
        };

        record_reduction(ReductionStats {
            kind: ReductionKind::Effect,
            input_shards: shards.len(),
            output_shards: result.len(),
            passes: 1,
            duration,
        });
        Ok(result)
    }

    /// Replace each shard that overlaps a shard with a broader condition by
    /// its residual pieces outside that shard.
    fn delineate(&self, shards: &[PolicyShard]) -> Result<(Vec<PolicyShard>, bool), PolicyError> {
        let mut result = Vec::with_capacity(shards.len());
        let mut changed = false;

        for (i, shard) in shards.iter().enumerate() {
            let mut broader = None;
            for (j, other) in shards.iter().enumerate() {
                if i != j && overlaps_broader(shard, other)? {
                    broader = Some(other);
                    break;
                }
            }

            match broader {
                Some(other) => {
                    let pieces = residual_pieces(shard, other)?;
                    debug!(
                        event = "Reduce",
                        phase = "Residual",
                        index = i,
                        pieces = pieces.len(),
                    );
                    result.extend(pieces);
                    changed = true;
                }
                None => result.push(shard.clone()),
            }
        }

        Ok((result, changed))
    }

    /// Remove redundant shards and split overlapping ones until a fixed
    /// point is reached.
    ///
    /// Running this on its own output returns the same list.
    pub fn dedupe(&self, shards: &[PolicyShard]) -> Result<Vec<PolicyShard>, PolicyError> {
        let mut duration = Duration::ZERO;
        let mut passes = 0;
        let result = {
            let _timer = PhaseTimer::new(&mut duration);
            self.check_limit(shards.len(), "dedupe")?;
            debug!(event = "Reduce", phase = "Start", shards = shards.len());

            let mut current = shards.to_vec();
            loop {
                if passes >= self.config.max_passes {
                    return Err(PolicyError::DidNotConverge(passes));
                }
                passes += 1;

                let (pruned, mut changed) = prune_subsets(&current, false);
                let pruned = if self.config.check_reverse {
                    let (pruned, reverse_changed) = prune_subsets(&pruned, true);
                    changed |= reverse_changed;
                    pruned
                } else {
                    pruned
                };
                let (delineated, split) = self.delineate(&pruned)?;
                changed |= split;
                self.check_limit(delineated.len(), "dedupe")?;

                debug!(
                    event = "Reduce",
                    phase = "Pass",
                    pass = passes,
                    shards = delineated.len(),
                    changed = changed,
                );
                current = delineated;
                if !changed {
                    break;
                }
            }

            debug!(event = "Reduce", phase = "Converged", passes = passes, shards = current.len());
            current
        };

        record_reduction(ReductionStats {
            kind: ReductionKind::Dedupe,
            input_shards: shards.len(),
            output_shards: result.len(),
            passes,
            duration,
        });
        Ok(result)
    }

    /// Expand a policy, subtract its denies from its allows and dedupe the
    /// result.
    pub fn effective_permissions(&self, policy: &Policy) -> Result<Vec<PolicyShard>, PolicyError> {
        let shards = policy.policy_shards()?;
        let allowed = self.effect(&shards)?;
        self.dedupe(&allowed)
    }
}

/// [`ShardReducer::effect`] with the default configuration.
pub fn policy_shards_effect(shards: &[PolicyShard]) -> Result<Vec<PolicyShard>, PolicyError> {
    ShardReducer::default().effect(shards)
}

/// [`ShardReducer::dedupe`] with the default configuration.
pub fn dedupe_policy_shards(shards: &[PolicyShard]) -> Result<Vec<PolicyShard>, PolicyError> {
    ShardReducer::default().dedupe(shards)
}
