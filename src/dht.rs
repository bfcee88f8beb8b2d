//! Distributed Hash Table node discovery (BEP-5)
//!
//! This module implements the Kademlia routing table used by BitTorrent's
//! DHT together with the KRPC `find_node` exchange that fills it.
//!
//! - [`RoutingTable`] is a binary trie of k-buckets keyed on id bits.
//! - [`KrpcQuery`] / [`KrpcResponse`] encode and decode KRPC datagrams.
//! - [`Exchange`] performs one UDP round trip with a bounded wait.
//! - [`bootstrap`] seeds a fresh table from a rendezvous node.
//! - [`SharedTable`] shares one table between tasks.

mod bootstrap;
mod config;
mod error;
mod exchange;
mod id;
mod message;
mod node;
mod routing;
mod shared;

pub use bootstrap::{bootstrap, bootstrap_with_id, resolve};
pub use config::DhtConfig;
pub use error::DhtError;
pub use exchange::{find_node, ping, Exchange};
pub use id::NodeId;
pub use message::{
    decode_compact_nodes, encode_compact_nodes, new_transaction_id, KrpcQuery, KrpcResponse,
    Query, Reply, ResponseBody, TransactionId,
};
pub use node::Node;
pub use routing::{Bucket, BucketTree, Insertion, RoutingTable};
pub use shared::SharedTable;
