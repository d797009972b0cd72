use std::time::Duration;

/// Interval timer advanced by tick events rather than wall-clock reads, so
/// scripted runs stay deterministic.
#[derive(Debug, Clone)]
pub struct TelemetryTimer {
    interval: Duration,
    elapsed: Duration,
    armed: bool,
}

impl TelemetryTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    pub fn arm(&mut self) {
        self.armed = true;
        self.elapsed = Duration::ZERO;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advance by `elapsed`; true when at least one interval completed.
    /// Missed intervals collapse into a single fire.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.armed || self.interval.is_zero() {
            return false;
        }
        self.elapsed += elapsed;
        if self.elapsed < self.interval {
            return false;
        }
        let interval_nanos = self.interval.as_nanos();
        let remainder = self.elapsed.as_nanos() % interval_nanos;
        self.elapsed = Duration::from_nanos(remainder as u64);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut timer = TelemetryTimer::new(Duration::from_millis(100));
        timer.arm();
        assert!(!timer.advance(Duration::from_millis(60)));
        assert!(timer.advance(Duration::from_millis(60)));
        assert!(!timer.advance(Duration::from_millis(60)));
        assert!(timer.advance(Duration::from_millis(250)));
    }

    #[test]
    fn disarmed_or_zero_interval_never_fires() {
        let mut timer = TelemetryTimer::new(Duration::from_millis(10));
        assert!(!timer.advance(Duration::from_secs(1)));
        timer.arm();
        timer.disarm();
        assert!(!timer.advance(Duration::from_secs(1)));

        let mut zero = TelemetryTimer::new(Duration::ZERO);
        zero.arm();
        assert!(!zero.advance(Duration::from_secs(1)));
    }
}
