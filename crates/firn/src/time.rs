use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Firn epoch: Wednesday, January 1, 2025 00:00:00 UTC.
///
/// The 41-bit timestamp field counts milliseconds from this instant, which
/// gives roughly 69 years of usable range. The exact value only bounds the
/// lifetime before overflow; it does not affect correctness.
pub const FIRN_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A source of millisecond timestamps relative to a fixed epoch.
///
/// The generator is generic over this trait so tests can inject a controlled
/// clock instead of the system clock.
///
/// # Example
///
/// ```
/// use firn::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

/// A wall-clock time source offset from a fixed epoch.
///
/// This reads `SystemTime::now()` on every call rather than a monotonic
/// timer: the generator's rollback handling depends on actually observing
/// backward clock adjustments, and a monotonic source would mask them.
///
/// Readings earlier than the configured epoch saturate to zero.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a wall clock aligned to [`FIRN_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FIRN_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH");
        since_unix.saturating_sub(self.epoch).as_millis() as u64
    }
}
