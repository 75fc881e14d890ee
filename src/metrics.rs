//! Reduction metrics via a pluggable sink.
//!
//! The library reports the size and duration of every effect computation
//! and dedupe to a global [`MetricsSink`]. Nothing is reported anywhere
//! until a sink is installed with [`set_sink`].
//!
//! ```ignore
//! use policyshard_core::metrics::{MetricsSink, ReductionStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct PassCounter(AtomicU64);
//!
//! impl MetricsSink for PassCounter {
//!     fn on_reduction(&self, stats: &ReductionStats) {
//!         self.0.fetch_add(stats.passes as u64, Ordering::Relaxed);
//!     }
//! }
//!
//! policyshard_core::metrics::set_sink(Arc::new(PassCounter(AtomicU64::new(0))));
//! ```

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use tracing::warn;

/// Which reduction produced a [`ReductionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum ReductionKind {
    /// Allow shards with Deny shards subtracted
    Effect,
    /// Subset removal and delineation to a fixed point
    Dedupe,
}

/// Snapshot of one reduction, passed to [`MetricsSink::on_reduction`].
#[derive(Debug, Clone, Serialize)]
pub struct ReductionStats {
    pub kind: ReductionKind,
    /// Shards handed to the reduction
    pub input_shards: usize,
    /// Shards returned
    pub output_shards: usize,
    /// Dedupe passes until the fixed point; always 1 for effect computation
    pub passes: usize,
    /// Wall-clock time spent
    pub duration: Duration,
}

/// Consumer of reduction metrics.
///
/// Called synchronously at the end of each reduction, so implementations
/// must be thread-safe and should return quickly.
pub trait MetricsSink: Send + Sync {
    fn on_reduction(&self, stats: &ReductionStats);
}

struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_reduction(&self, _stats: &ReductionStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

fn sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Set the global metrics sink.
///
/// The sink can only be set once, and only before the first reduction
/// reports; later calls are ignored with a warning.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            "Metrics sink was already initialized. Ignoring subsequent set_sink call. Set the sink before the first reduction."
        );
    }
}

pub(crate) fn record_reduction(stats: ReductionStats) {
    sink().on_reduction(&stats);
}
