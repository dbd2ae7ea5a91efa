//! Host timestamps to tick deltas

use std::time::Duration;

use crate::combat::constants::MAX_TICK_DELTA_MS;

/// Converts monotonic-ish host timestamps (milliseconds) into clamped deltas
///
/// A clock that moves backwards yields a zero delta and resynchronizes on
/// the new timestamp; a long stall yields at most `max_delta`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(MAX_TICK_DELTA_MS))
    }
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last_ms: None,
            max_delta,
        }
    }

    /// Delta since the previous call; the first call returns zero
    pub fn advance(&mut self, now_ms: f64) -> Duration {
        if !now_ms.is_finite() {
            return Duration::ZERO;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return Duration::ZERO;
        };

        let delta_ms = now_ms - last;
        if delta_ms <= 0.0 {
            if delta_ms < 0.0 {
                tracing::debug!(delta_ms, "clock moved backwards, resyncing");
            }
            return Duration::ZERO;
        }
        if delta_ms >= self.max_delta.as_secs_f64() * 1000.0 {
            return self.max_delta;
        }
        Duration::from_nanos((delta_ms * 1_000_000.0).round() as u64)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(5000.0), Duration::ZERO);
        assert_eq!(clock.advance(5016.0), Duration::from_millis(16));
    }

    #[test]
    fn test_backwards_clock_resyncs() {
        let mut clock = FrameClock::default();
        clock.advance(1000.0);
        assert_eq!(clock.advance(400.0), Duration::ZERO);
        assert_eq!(clock.advance(500.0), Duration::from_millis(100));
    }

    #[test]
    fn test_stall_clamped() {
        let mut clock = FrameClock::default();
        clock.advance(0.0);
        assert_eq!(clock.advance(60_000.0), Duration::from_secs(1));
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut clock = FrameClock::default();
        clock.advance(100.0);
        assert_eq!(clock.advance(f64::NAN), Duration::ZERO);
        assert_eq!(clock.advance(200.0), Duration::from_millis(100));
    }
}
