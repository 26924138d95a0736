use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::{info, warn};

use crate::FlakeId;

/// Datacenter ID used when the host's hardware address cannot be read.
pub const DEFAULT_DATACENTER_ID: u64 = 1;

/// The `(datacenter, worker)` pair identifying this process among peers.
///
/// Resolved once at generator construction and immutable afterwards. The pair
/// is derived from host and process identity so that co-located processes
/// tend to diverge, but it is *not* guaranteed unique: two processes can
/// still hash to the same pair, in which case only the timestamp and sequence
/// fields keep their IDs apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    /// Datacenter ID in `[0, 31]`.
    pub datacenter_id: u64,
    /// Worker ID in `[0, 31]`.
    pub worker_id: u64,
}

impl NodeIdentity {
    /// Creates an identity, masking each value into its 5-bit budget.
    pub const fn new(datacenter_id: u64, worker_id: u64) -> Self {
        Self {
            datacenter_id: datacenter_id & FlakeId::DATACENTER_ID_MASK,
            worker_id: worker_id & FlakeId::WORKER_ID_MASK,
        }
    }
}

/// Strategy for resolving a [`NodeIdentity`] at startup.
///
/// Production code uses [`HostResolver`]; tests substitute [`FixedNode`] to
/// avoid touching real network interfaces.
pub trait NodeResolver {
    /// Resolves the node identity. Must not fail: implementations degrade to
    /// documented defaults instead of returning errors.
    fn resolve(&self) -> NodeIdentity;
}

/// Resolves a [`NodeIdentity`] from the host's hardware address and the OS
/// process id.
///
/// - Datacenter ID: the two least-significant bytes of the primary network
///   interface's MAC address, folded with a shift and reduced modulo 32. If
///   no interface is readable, [`DEFAULT_DATACENTER_ID`] is used and a
///   warning is logged.
/// - Worker ID: a hash of the datacenter ID concatenated with the process
///   id, reduced modulo 32. The hash is stable for the life of the process,
///   so repeated resolution yields the same pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostResolver;

impl HostResolver {
    fn datacenter_id() -> u64 {
        match mac_address::get_mac_address() {
            Ok(Some(mac)) => {
                let bytes = mac.bytes();
                let folded = (u64::from(bytes[4]) | (u64::from(bytes[5]) << 8)) >> 6;
                folded % (FlakeId::DATACENTER_ID_MASK + 1)
            }
            Ok(None) => {
                warn!(
                    default = DEFAULT_DATACENTER_ID,
                    "no network interface with a hardware address; using default datacenter id"
                );
                DEFAULT_DATACENTER_ID
            }
            Err(e) => {
                warn!(
                    error = %e,
                    default = DEFAULT_DATACENTER_ID,
                    "failed to read hardware address; using default datacenter id"
                );
                DEFAULT_DATACENTER_ID
            }
        }
    }

    fn worker_id(datacenter_id: u64) -> u64 {
        let token = format!("{datacenter_id}{}", std::process::id());
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish() % (FlakeId::WORKER_ID_MASK + 1)
    }
}

impl NodeResolver for HostResolver {
    fn resolve(&self) -> NodeIdentity {
        let datacenter_id = Self::datacenter_id();
        let worker_id = Self::worker_id(datacenter_id);
        info!(datacenter_id, worker_id, "resolved node identity");
        NodeIdentity {
            datacenter_id,
            worker_id,
        }
    }
}

/// A resolver that returns a caller-chosen identity unchanged.
#[derive(Clone, Copy, Debug)]
pub struct FixedNode(pub NodeIdentity);

impl NodeResolver for FixedNode {
    fn resolve(&self) -> NodeIdentity {
        self.0
    }
}
