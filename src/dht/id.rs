use super::error::DhtError;
use crate::constants::{ID_BITS, ID_LEN};
use rand::Rng as _;
use std::fmt;

/// A 160-bit identifier naming a node or a search target (info hash).
///
/// Bits are numbered from the most significant bit of byte 0, which is also
/// the order the routing trie branches on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub [u8; ID_LEN]);

impl NodeId {
    /// Random id from the thread-local CSPRNG (ChaCha, seeded from the OS).
    pub fn generate() -> Self {
        let mut id = [0u8; ID_LEN];
        rand::rng().fill(&mut id);
        Self(id)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DhtError> {
        let id: [u8; ID_LEN] = bytes.try_into().map_err(|_| DhtError::InvalidNodeId)?;
        Ok(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Returns bit `index` (0 or 1), counting from the most significant bit.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 160`.
    pub fn bit(&self, index: usize) -> u8 {
        assert!(index < ID_BITS, "bit index {} out of range", index);
        (self.0[index / 8] >> (7 - index % 8)) & 1
    }

    /// Returns true if the first `bits` most significant bits of both ids are
    /// equal. Zero bits always match.
    ///
    /// # Panics
    ///
    /// Panics if `bits > 160`.
    pub fn shares_prefix(&self, other: &NodeId, bits: usize) -> bool {
        assert!(bits <= ID_BITS, "prefix length {} out of range", bits);

        let whole = bits / 8;
        if self.0[..whole] != other.0[..whole] {
            return false;
        }

        let partial = bits % 8;
        if partial == 0 {
            return true;
        }

        let shift = 8 - partial;
        self.0[whole] >> shift == other.0[whole] >> shift
    }

    /// XOR metric. Compares lexicographically, so smaller arrays are closer.
    pub fn distance(&self, other: &NodeId) -> [u8; ID_LEN] {
        let mut dist = [0u8; ID_LEN];
        for (d, (a, b)) in dist.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *d = a ^ b;
        }
        dist
    }
}

impl From<[u8; ID_LEN]> for NodeId {
    fn from(id: [u8; ID_LEN]) -> Self {
        Self(id)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
