use time::error::IndeterminateOffset;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Wall clock pinned to one UTC offset for the whole run.
///
/// The process-local offset can only be read soundly while the process is
/// single-threaded, so it is captured once with [`Clock::local`] before the
/// async runtime starts and passed around by value afterwards.
///
/// Every timestamp is shifted by that one offset, including modification
/// times from the other side of a daylight saving change. A file modified
/// within an hour of midnight in the other period can therefore be dated a
/// day off from what the local zone rules would give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: UtcOffset,
}
impl Default for Clock {
    fn default() -> Self {
        Self::utc()
    }
}
impl Clock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC)
    }

    /// Capture the process-local offset. This fails when it can't be
    /// determined, for example once other threads exist; callers usually
    /// fall back to [`Clock::utc`].
    pub fn local() -> Result<Self, IndeterminateOffset> {
        UtcOffset::current_local_offset().map(Self::new)
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    /// Current local date and time without the offset, as written to logs
    /// and records.
    pub fn wall_time(&self) -> PrimitiveDateTime {
        let now = self.now();
        PrimitiveDateTime::new(now.date(), now.time())
    }

    pub fn localize(&self, at: OffsetDateTime) -> OffsetDateTime {
        at.to_offset(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn test_localize_moves_across_midnight() {
        let clock = Clock::new(offset!(+10));
        let local = clock.localize(datetime!(2024-03-06 20:00 UTC));
        assert_eq!(local.date(), time::macros::date!(2024-03-07));
        assert_eq!(Clock::utc().localize(datetime!(2024-03-06 20:00 UTC)).date(), time::macros::date!(2024-03-06));
    }

    #[test]
    fn test_now_uses_offset() {
        let clock = Clock::new(offset!(-5));
        assert_eq!(clock.now().offset(), offset!(-5));
        assert_eq!(Clock::default(), Clock::utc());
    }
}
