//! Limits and switches for shard reduction.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default ceiling on the number of shards held during a reduction.
pub const DEFAULT_MAX_SHARDS: usize = 10_000;

/// Default ceiling on dedupe passes before giving up on a fixed point.
pub const DEFAULT_MAX_PASSES: usize = 256;

/// Configuration for [`crate::ShardReducer`].
///
/// Every field has a default, so a partial document such as
/// `{"max_shards": 500}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReductionConfig {
    /// Largest working shard list allowed in effect computation or dedupe
    pub max_shards: usize,
    /// Largest number of dedupe passes allowed
    pub max_passes: usize,
    /// Also scan in reverse order on each dedupe pass
    pub check_reverse: bool,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            max_shards: DEFAULT_MAX_SHARDS,
            max_passes: DEFAULT_MAX_PASSES,
            check_reverse: true,
        }
    }
}

impl ReductionConfig {
    pub fn with_max_shards(mut self, max_shards: usize) -> Self {
        self.max_shards = max_shards;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_check_reverse(mut self, check_reverse: bool) -> Self {
        self.check_reverse = check_reverse;
        self
    }
}
