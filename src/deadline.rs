//! Request-scoped cancellation token.
//!
//! Every suspension point (`RateLimiter::acquire`, provider network calls,
//! the planner's inner loop) checks a `Deadline` instead of threading an
//! async cancellation signal through the synchronous call stack
//! (`spec.md` §9 "Cancellation").

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            expires_at: Instant::now() + Duration::from_millis(millis),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_expired_immediately() {
        let d = Deadline::from_millis(50);
        assert!(!d.is_expired());
    }

    #[test]
    fn expires_after_duration() {
        let d = Deadline::from_millis(5);
        std::thread::sleep(Duration::from_millis(15));
        assert!(d.is_expired());
    }
}
