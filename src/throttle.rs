use std::time::Duration;

use tokio::time::Instant;

/// What a throttled listener should do with a call made at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttled {
    /// Run the handler now.
    Run,
    /// A trailing run was scheduled for the given instant.
    Deferred(Instant),
    /// A trailing run is already pending; this call folds into it.
    Coalesced,
}

/// Leading-edge throttle with a single trailing call.
///
/// Time is passed in by the caller so the throttle itself never sleeps.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait: Duration,
    last_run: Option<Instant>,
    trailing_at: Option<Instant>,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_run: None,
            trailing_at: None,
        }
    }

    pub fn call(&mut self, now: Instant) -> Throttled {
        let remaining = self
            .last_run
            .map(|last| self.wait.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or_default();

        if remaining.is_zero() {
            self.trailing_at = None;
            self.last_run = Some(now);
            Throttled::Run
        } else if self.trailing_at.is_none() {
            let at = now + remaining;
            self.trailing_at = Some(at);
            Throttled::Deferred(at)
        } else {
            Throttled::Coalesced
        }
    }

    /// Consumes the pending trailing run once it is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.trailing_at {
            Some(at) if now >= at => {
                self.trailing_at = None;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Option<Instant> {
        self.trailing_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(100);

    #[test]
    fn first_call_runs_immediately() {
        let mut throttle = Throttle::new(WAIT);
        assert_eq!(throttle.call(Instant::now()), Throttled::Run);
        assert!(throttle.pending().is_none());
    }

    #[test]
    fn burst_collapses_into_one_trailing_run() {
        let start = Instant::now();
        let mut throttle = Throttle::new(WAIT);
        throttle.call(start);

        let at = start + Duration::from_millis(30);
        assert_eq!(throttle.call(at), Throttled::Deferred(start + WAIT));
        assert_eq!(throttle.call(start + Duration::from_millis(60)), Throttled::Coalesced);

        assert!(!throttle.take_due(start + Duration::from_millis(90)));
        assert!(throttle.take_due(start + WAIT));
        assert!(!throttle.take_due(start + WAIT));
    }

    #[test]
    fn call_after_window_runs_again() {
        let start = Instant::now();
        let mut throttle = Throttle::new(WAIT);
        throttle.call(start);
        assert_eq!(throttle.call(start + Duration::from_millis(150)), Throttled::Run);
    }

    #[test]
    fn run_after_window_discards_stale_trailing() {
        let start = Instant::now();
        let mut throttle = Throttle::new(WAIT);
        throttle.call(start);
        throttle.call(start + Duration::from_millis(10));
        assert_eq!(throttle.call(start + Duration::from_millis(500)), Throttled::Run);
        assert!(throttle.pending().is_none());
    }
}
