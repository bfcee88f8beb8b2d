//! rdht - BitTorrent DHT node discovery
//!
//! A Kademlia routing table and the KRPC wire protocol used to ask remote
//! nodes for peers close to an info hash, following BEP-5.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`dht`] - BEP-5 routing table, KRPC codec, UDP exchange, bootstrap
//! - [`constants`] - Protocol constants and tuning values

pub mod bencode;
pub mod constants;
pub mod dht;

pub use bencode::{decode, encode, BencodeError, Value};
pub use dht::{
    bootstrap, DhtConfig, DhtError, Insertion, KrpcQuery, KrpcResponse, Node, NodeId,
    RoutingTable, SharedTable,
};
