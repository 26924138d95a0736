//! Unique identifiers for distributed writes.
//!
//! `firn` provides the two identifier schemes a write path needs:
//!
//! - [`SnowflakeGenerator`] emits strictly increasing 64-bit [`FlakeId`]s
//!   without any cross-process coordination. Each id packs a millisecond
//!   timestamp, a `(datacenter, worker)` node identity and an
//!   intra-millisecond sequence into one sortable integer.
//! - [`signature_id`] derives a deterministic 32-character hex identifier
//!   from a timestamp and caller-supplied payload, for idempotent keys where
//!   "same input, same id" matters more than ordering.
//!
//! ```
//! use firn::{FixedNode, NodeIdentity, NodeResolver, SnowflakeGenerator, SystemClock};
//!
//! let resolver = FixedNode(NodeIdentity::new(1, 2));
//! let generator = SnowflakeGenerator::new(resolver.resolve(), SystemClock::default());
//!
//! let a = generator.next_id().unwrap();
//! let b = generator.next_id().unwrap();
//! assert!(b > a);
//! ```

mod error;
mod generator;
mod id;
mod node;
#[cfg(feature = "serde")]
mod serde;
mod signature;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::signature::*;
pub use crate::time::*;
