//! Time source used for cache expiry.

use std::sync::Mutex;

use time::Duration;

use crate::UtcDateTime;

/// Source of "now". Injected so TTL behavior can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<UtcDateTime>,
}

impl ManualClock {
    pub fn new(start: UtcDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = now.into_inner() + by;
        *now = UtcDateTime::from_offset_datetime(next).unwrap_or(*now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UtcDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
