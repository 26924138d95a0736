use core::cell::Cell;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::scope;

use crate::{
    Error, FixedNode, FlakeId, NodeIdentity, NodeResolver, SnowflakeGenerator, SystemClock,
    TimeSource,
};

use super::SEQUENCE_RESET_BOUND;

struct FixedTime {
    millis: u64,
}

impl TimeSource for FixedTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Replays a scripted series of readings, one per call, repeating the final
/// reading once the script is exhausted.
struct ReplayTime {
    readings: Vec<u64>,
    next: Cell<usize>,
}

impl ReplayTime {
    fn new(readings: Vec<u64>) -> Self {
        Self {
            readings,
            next: Cell::new(0),
        }
    }
}

impl TimeSource for ReplayTime {
    fn current_millis(&self) -> u64 {
        let i = self.next.get();
        self.next.set(i + 1);
        self.readings[i.min(self.readings.len() - 1)]
    }
}

/// Reports `base` for the first `stall_reads` calls, then `base + 1` forever.
/// Lets the sequence-overflow spin terminate under a mocked clock.
struct StallThenTick {
    base: u64,
    stall_reads: u64,
    reads: Cell<u64>,
}

impl TimeSource for StallThenTick {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.get() + 1;
        self.reads.set(reads);
        if reads <= self.stall_reads {
            self.base
        } else {
            self.base + 1
        }
    }
}

fn test_node() -> NodeIdentity {
    FixedNode(NodeIdentity::new(5, 9)).resolve()
}

#[test]
fn same_tick_increments_sequence() {
    let generator = SnowflakeGenerator::new(test_node(), FixedTime { millis: 42 });

    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.next_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert!(id1.sequence() < SEQUENCE_RESET_BOUND);
    assert_eq!(id2.sequence(), id1.sequence() + 1);
    assert_eq!(id3.sequence(), id2.sequence() + 1);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn fresh_tick_resets_sequence_to_small_random() {
    let generator = SnowflakeGenerator::new(test_node(), ReplayTime::new(vec![42, 43]));

    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 43);
    assert!(id1.sequence() < SEQUENCE_RESET_BOUND);
    assert!(id2.sequence() < SEQUENCE_RESET_BOUND);
    assert!(id1 < id2);
}

#[test]
fn ids_embed_node_identity() {
    let generator = SnowflakeGenerator::new(test_node(), FixedTime { millis: 42 });
    let id = generator.next_id().unwrap();
    assert_eq!(id.datacenter_id(), 5);
    assert_eq!(id.worker_id(), 9);
}

#[test]
fn sequence_overflow_advances_timestamp_without_repeats() {
    let clock = StallThenTick {
        base: 42,
        stall_reads: 8_192,
        reads: Cell::new(0),
    };
    let generator = SnowflakeGenerator::new(test_node(), clock);

    let mut seen = HashSet::new();
    let first = generator.next_id().unwrap();
    assert!(seen.insert((first.timestamp(), first.sequence())));

    let mut same_tick_ids = 1u64;
    let rolled_over = loop {
        let id = generator.next_id().unwrap();
        assert!(
            seen.insert((id.timestamp(), id.sequence())),
            "repeated (timestamp, sequence) pair"
        );
        if id.timestamp() != 42 {
            break id;
        }
        same_tick_ids += 1;
    };

    // The 42-tick holds exactly the sequence values from the random start
    // through 4095; the wrap forces the next id onto the new tick.
    assert_eq!(same_tick_ids, (FlakeId::SEQUENCE_MASK + 1) - first.sequence());
    assert_eq!(rolled_over.timestamp(), 43);
    assert!(rolled_over.sequence() < SEQUENCE_RESET_BOUND);
}

#[test]
fn small_rollback_is_waited_out() {
    let generator = SnowflakeGenerator::new(test_node(), ReplayTime::new(vec![100, 97, 101]));

    let before = generator.next_id().unwrap();
    assert_eq!(before.timestamp(), 100);

    // The 3ms rollback is within tolerance: the generator sleeps, re-reads
    // the clock, and succeeds with a timestamp at or past the old one.
    let after = generator.next_id().unwrap();
    assert_eq!(after.timestamp(), 101);
    assert!(after > before);
}

#[test]
fn large_rollback_fails_and_leaves_state_untouched() {
    let generator = SnowflakeGenerator::new(test_node(), ReplayTime::new(vec![100, 50, 101]));

    let before = generator.next_id().unwrap();
    assert_eq!(before.timestamp(), 100);

    let err = generator.next_id().unwrap_err();
    assert_eq!(err, Error::ClockMovedBackwards { offset_ms: 50 });

    // A later correctly-timed call still succeeds, proving the failed call
    // did not advance `last_timestamp_millis`.
    let after = generator.next_id().unwrap();
    assert_eq!(after.timestamp(), 101);
    assert!(after > before);
}

#[test]
fn rollback_still_behind_after_wait_fails() {
    let generator = SnowflakeGenerator::new(test_node(), ReplayTime::new(vec![100, 97, 98]));

    generator.next_id().unwrap();
    let err = generator.next_id().unwrap_err();
    assert_eq!(err, Error::ClockMovedBackwards { offset_ms: 3 });
}

#[test]
fn single_thread_ids_strictly_increase() {
    let generator = SnowflakeGenerator::new(test_node(), SystemClock::default());

    let mut last = generator.next_id().unwrap();
    for _ in 0..50_000 {
        let id = generator.next_id().unwrap();
        assert!(id.to_raw() > last.to_raw());
        last = id;
    }
}

#[test]
fn threaded_ids_are_unique_and_increase_per_thread() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 8_192;

    let generator = Arc::new(SnowflakeGenerator::new(test_node(), SystemClock::default()));
    let seen = Arc::new(Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen = Arc::clone(&seen);

            s.spawn(move || {
                let mut last = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap();
                    if let Some(prev) = last {
                        assert!(id > prev);
                    }
                    last = Some(id);
                    assert!(seen.lock().unwrap().insert(id));
                }
            });
        }
    });

    let count = seen.lock().unwrap().len();
    assert_eq!(count, THREADS * IDS_PER_THREAD);
}
