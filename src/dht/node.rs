use super::id::NodeId;
use crate::constants::{COMPACT_NODE_LEN, DHT_GOOD_NODE_WINDOW, ID_LEN};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

/// A remote DHT participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub addr: SocketAddr,
    pub last_active: Instant,
}

impl Node {
    /// Creates a node that was active just now.
    pub fn new(id: NodeId, addr: SocketAddr) -> Self {
        Self::with_last_active(id, addr, Instant::now())
    }

    pub fn with_last_active(id: NodeId, addr: SocketAddr, last_active: Instant) -> Self {
        Self {
            id,
            addr,
            last_active,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn is_good(&self) -> bool {
        self.is_good_at(Instant::now())
    }

    /// Good means active within the last 15 minutes as of `now`.
    pub fn is_good_at(&self, now: Instant) -> bool {
        self.last_active + DHT_GOOD_NODE_WINDOW > now
    }

    /// Parses one 26-byte compact node info record.
    pub fn from_compact(data: &[u8], last_active: Instant) -> Option<Self> {
        if data.len() != COMPACT_NODE_LEN {
            return None;
        }

        let id = NodeId::from_bytes(&data[..ID_LEN]).ok()?;
        let ip = Ipv4Addr::new(data[20], data[21], data[22], data[23]);
        let port = u16::from_be_bytes([data[24], data[25]]);

        Some(Self::with_last_active(
            id,
            SocketAddr::new(IpAddr::V4(ip), port),
            last_active,
        ))
    }

    /// Compact form, or `None` for IPv6 nodes which have no 26-byte encoding.
    pub fn to_compact(&self) -> Option<[u8; COMPACT_NODE_LEN]> {
        let mut compact = [0u8; COMPACT_NODE_LEN];
        compact[..ID_LEN].copy_from_slice(&self.id.0);

        match self.addr {
            SocketAddr::V4(v4) => {
                compact[20..24].copy_from_slice(&v4.ip().octets());
                compact[24..26].copy_from_slice(&v4.port().to_be_bytes());
                Some(compact)
            }
            SocketAddr::V6(_) => None,
        }
    }
}
