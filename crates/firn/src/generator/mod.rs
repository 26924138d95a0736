#[cfg(test)]
mod tests;

use core::time::Duration;
use std::thread;

use parking_lot::Mutex;
use rand::Rng;

use crate::{
    Error, FlakeId, HostResolver, NodeIdentity, NodeResolver, Result, SystemClock, TimeSource,
};

/// Largest backward clock adjustment that [`SnowflakeGenerator::next_id`]
/// will wait out rather than fail, in milliseconds.
pub const CLOCK_ROLLBACK_TOLERANCE_MS: u64 = 5;

/// Exclusive upper bound for the sequence value chosen on a fresh
/// millisecond.
///
/// Starting each tick at a small random value instead of exactly zero keeps
/// the low bits of ids issued by low-frequency callers from being trivially
/// predictable, at the cost of a few values of sequence headroom.
const SEQUENCE_RESET_BOUND: u64 = 10;

/// Mutable generator state, only ever touched inside the critical section of
/// [`SnowflakeGenerator::next_id`].
#[derive(Debug)]
struct GeneratorState {
    last_timestamp_millis: u64,
    sequence: u64,
}

/// A mutex-guarded Snowflake ID generator.
///
/// One instance owns its time/sequence state exclusively; any number of
/// threads may share it behind an `Arc`. Successive ids returned by
/// [`next_id`] are strictly increasing as `u64`, across threads, for the
/// lifetime of the process. State is not persisted: a restart resets the
/// sequence, and ordering across restarts holds because wall-clock time keeps
/// advancing between invocations.
///
/// # Example
///
/// ```
/// use firn::SnowflakeGenerator;
///
/// let generator = SnowflakeGenerator::with_host_identity();
/// let id = generator.next_id().unwrap();
/// println!("{id}");
/// ```
///
/// [`next_id`]: SnowflakeGenerator::next_id
#[derive(Debug)]
pub struct SnowflakeGenerator<T = SystemClock> {
    node: NodeIdentity,
    clock: T,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator<SystemClock> {
    /// Creates a generator whose node identity is resolved from the host's
    /// hardware address and process id, timed by the default [`SystemClock`].
    ///
    /// Identity resolution never fails; see [`HostResolver`] for the
    /// fallback behavior.
    pub fn with_host_identity() -> Self {
        Self::new(HostResolver.resolve(), SystemClock::default())
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with an explicit node identity and clock.
    ///
    /// This is the constructor tests use: inject a [`FixedNode`] identity and
    /// a mock [`TimeSource`] to control every observable input.
    ///
    /// [`FixedNode`]: crate::FixedNode
    pub fn new(node: NodeIdentity, clock: T) -> Self {
        Self {
            node,
            clock,
            state: Mutex::new(GeneratorState {
                last_timestamp_millis: 0,
                sequence: 0,
            }),
        }
    }

    /// Returns the node identity baked into every id from this generator.
    pub fn node(&self) -> NodeIdentity {
        self.node
    }

    /// Generates the next unique id.
    ///
    /// The whole decision-and-update sequence runs under one lock, so the
    /// monotonicity guarantee holds across concurrent callers, not just per
    /// thread. Two paths block briefly, both bounded by a few milliseconds of
    /// real time: a small backward clock adjustment is slept out, and
    /// exhausting the 4096-value sequence within one millisecond spins until
    /// the clock ticks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock is behind the
    /// last issued timestamp by more than [`CLOCK_ROLLBACK_TOLERANCE_MS`].
    /// State is left unchanged, so a later correctly-timed call succeeds.
    pub fn next_id(&self) -> Result<FlakeId> {
        let mut state = self.state.lock();

        let mut now = self.clock.current_millis();
        if now < state.last_timestamp_millis {
            now = self.wait_out_rollback(now, state.last_timestamp_millis)?;
        }

        if now == state.last_timestamp_millis {
            state.sequence = (state.sequence + 1) & FlakeId::SEQUENCE_MASK;
            if state.sequence == 0 {
                now = self.spin_until_after(state.last_timestamp_millis);
            }
        }
        if now != state.last_timestamp_millis {
            state.sequence = rand::rng().random_range(0..SEQUENCE_RESET_BOUND);
        }
        state.last_timestamp_millis = now;

        Ok(FlakeId::from_parts(
            now,
            self.node.datacenter_id,
            self.node.worker_id,
            state.sequence,
        ))
    }

    /// Sleeps out a small backward clock adjustment and re-reads the clock.
    ///
    /// A rollback within the tolerance is slept for roughly twice its size to
    /// give the clock room to catch up. If the re-read is still behind, or
    /// the rollback exceeded the tolerance in the first place, the call fails
    /// without touching state.
    #[cold]
    #[inline(never)]
    fn wait_out_rollback(&self, now: u64, last: u64) -> Result<u64> {
        let offset_ms = last - now;
        if offset_ms <= CLOCK_ROLLBACK_TOLERANCE_MS {
            thread::sleep(Duration::from_millis(offset_ms * 2));
            let reread = self.clock.current_millis();
            if reread >= last {
                return Ok(reread);
            }
        }
        Err(Error::ClockMovedBackwards { offset_ms })
    }

    /// Spins until the clock reads strictly past `last`.
    ///
    /// Only reached when a single millisecond's sequence space is exhausted,
    /// so the wait is bounded by the remainder of that millisecond.
    #[cold]
    #[inline(never)]
    fn spin_until_after(&self, last: u64) -> u64 {
        let mut now = self.clock.current_millis();
        while now <= last {
            core::hint::spin_loop();
            now = self.clock.current_millis();
        }
        now
    }
}
