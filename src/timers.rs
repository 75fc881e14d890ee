//! Timing for reductions.

use std::time::{Duration, Instant};

/// RAII timer that adds the elapsed time to a slot when dropped, including
/// when a reduction bails out early with an error.
///
/// ```rust,ignore
/// let mut total = Duration::ZERO;
/// {
///     let _timer = PhaseTimer::new(&mut total);
///     // reduction work
/// }
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phase_timer_accumulates_across_scopes() {
        let mut duration = Duration::ZERO;
        for _ in 0..2 {
            let _timer = PhaseTimer::new(&mut duration);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(duration.as_millis() >= 10);
    }

    #[test]
    fn test_phase_timer_records_on_early_return() {
        fn failing(slot: &mut Duration) -> Result<(), ()> {
            let _timer = PhaseTimer::new(slot);
            thread::sleep(Duration::from_millis(2));
            Err(())
        }
        let mut duration = Duration::ZERO;
        assert!(failing(&mut duration).is_err());
        assert!(duration.as_millis() >= 2);
    }
}
