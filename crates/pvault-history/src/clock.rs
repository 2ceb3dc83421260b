use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Wall clock that never repeats or goes backwards within one instance.
///
/// Two versions created in the same microsecond would otherwise tie on
/// `created_at` and make newest-first listings ambiguous.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    /// A clock that has not issued a timestamp yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time, or one microsecond after the previous reading if the
    /// wall clock has not advanced.
    pub fn now(&self) -> DateTime<Utc> {
        self.next_after(Utc::now())
    }

    fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}
