//! Token-bucket rate limiter bounding outbound calls to the map backend.
//!
//! Two independent buckets (`spec.md` §4.4): a per-second bucket that
//! refills continuously, and a per-day bucket that resets at the UTC day
//! boundary and fails fast rather than waiting once exhausted.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::deadline::Deadline;
use crate::error::PlannerError;

#[derive(Debug)]
pub struct RateLimiter {
    per_second: u32,
    per_day: u64,
    // Fractional tokens scaled by 1000 for integer atomics.
    second_tokens_milli: AtomicI64,
    last_refill: Mutex<Instant>,
    day_used: AtomicU64,
    day_epoch: AtomicI64,
}

impl RateLimiter {
    pub fn new(per_second: u32, per_day: u64) -> Self {
        Self {
            per_second,
            per_day,
            second_tokens_milli: AtomicI64::new(per_second as i64 * 1000),
            last_refill: Mutex::new(Instant::now()),
            day_used: AtomicU64::new(0),
            day_epoch: AtomicI64::new(current_day_epoch()),
        }
    }

    /// Blocks until both buckets have capacity, or returns
    /// `PlannerError::Deadline` if `deadline` elapses first, or
    /// `PlannerError::ProviderQuota` immediately if the per-day bucket is
    /// exhausted (no waiting beyond the current day window).
    pub fn acquire(&self, deadline: &Deadline) -> Result<(), PlannerError> {
        self.maybe_reset_day();

        if self.day_used.fetch_add(1, Ordering::SeqCst) >= self.per_day {
            self.day_used.fetch_sub(1, Ordering::SeqCst);
            return Err(PlannerError::ProviderQuota);
        }

        loop {
            self.refill();
            let taken = self
                .second_tokens_milli
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                    if t >= 1000 {
                        Some(t - 1000)
                    } else {
                        None
                    }
                });

            if taken.is_ok() {
                return Ok(());
            }

            if deadline.is_expired() {
                self.day_used.fetch_sub(1, Ordering::SeqCst);
                return Err(PlannerError::Deadline);
            }

            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn refill(&self) {
        let mut last = self.last_refill.lock().unwrap();
        let now = Instant::now();
        let elapsed = now.duration_since(*last);
        if elapsed.as_millis() == 0 {
            return;
        }
        *last = now;
        let gained = (elapsed.as_secs_f64() * self.per_second as f64 * 1000.0).round() as i64;
        if gained <= 0 {
            return;
        }
        let cap = self.per_second as i64 * 1000;
        self.second_tokens_milli
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some((t + gained).min(cap))
            })
            .ok();
    }

    fn maybe_reset_day(&self) {
        let today = current_day_epoch();
        let prev = self.day_epoch.load(Ordering::SeqCst);
        if prev != today
            && self
                .day_epoch
                .compare_exchange(prev, today, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            self.day_used.store(0, Ordering::SeqCst);
        }
    }

    pub fn day_remaining(&self) -> u64 {
        self.per_day.saturating_sub(self.day_used.load(Ordering::SeqCst))
    }
}

fn current_day_epoch() -> i64 {
    chrono::Utc::now().timestamp() / 86_400
}
