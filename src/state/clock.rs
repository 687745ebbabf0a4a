//! Wall clock used to pick the current week and the midday opening time.

use time::{OffsetDateTime, UtcOffset};

/// Source of the club's local time.
pub trait Clock: Send + Sync {
    /// Current instant, expressed in the club's offset.
    fn now(&self) -> OffsetDateTime;
}

/// System time shifted to a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
