//! Protocol constants and tuning parameters.
//!
//! Values follow BEP-5 and the defaults used by mainstream DHT clients
//! (libtorrent, Transmission).

use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// Client/version tag sent in the `v` field of every outgoing KRPC message
/// (two-letter client code followed by a two-byte version).
pub const CLIENT_VERSION: &[u8; 4] = b"RD01";

/// Length of the transaction ids generated for outgoing queries.
pub const TRANSACTION_ID_LEN: usize = 2;

// ============================================================================
// Ports
// ============================================================================

/// Default BitTorrent listen port, also used as the source port for
/// outbound DHT exchanges.
pub const DEFAULT_PORT: u16 = 6881;

// ============================================================================
// Identifiers
// ============================================================================

/// Node id / info hash length in bytes (SHA-1 sized).
pub const ID_LEN: usize = 20;

/// Node id length in bits. Also the maximum routing trie depth.
pub const ID_BITS: usize = ID_LEN * 8;

/// Size of one compact node info record: id, IPv4 address, port.
pub const COMPACT_NODE_LEN: usize = ID_LEN + 4 + 2;

// ============================================================================
// Routing table
// ============================================================================

/// Bucket capacity (k value in Kademlia)
pub const DHT_BUCKET_SIZE: usize = 8;

/// A node seen within this window is considered good (BEP-5: 15 minutes)
pub const DHT_GOOD_NODE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Default number of nodes returned by a closest-nodes lookup
pub const DHT_CLOSEST_COUNT: usize = DHT_BUCKET_SIZE;

// ============================================================================
// Timeouts - DHT
// ============================================================================

/// Upper bound on the wait for a reply to a single KRPC query
pub const DHT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Buffers
// ============================================================================

/// Receive buffer for a single KRPC datagram
pub const DHT_MAX_DATAGRAM_SIZE: usize = 65535;

/// Capacity of the channel feeding the routing table writer task
pub const DHT_WRITER_CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// KRPC error codes (BEP-5)
// ============================================================================

/// Generic error
pub const KRPC_ERROR_GENERIC: i64 = 201;

/// Server error
pub const KRPC_ERROR_SERVER: i64 = 202;

/// Protocol error (malformed packet, invalid arguments, bad token)
pub const KRPC_ERROR_PROTOCOL: i64 = 203;

/// Method unknown
pub const KRPC_ERROR_METHOD_UNKNOWN: i64 = 204;

// ============================================================================
// Bootstrap
// ============================================================================

/// Well-known DHT rendezvous nodes. Only the first entry is contacted during
/// bootstrap.
pub const DHT_BOOTSTRAP_NODES: &[&str] = &[
    "router.utorrent.com:6881",
    "dht.transmissionbt.com:6881",
    "router.bittorrent.com:6881",
];
