use crate::constants::{
    KRPC_ERROR_GENERIC, KRPC_ERROR_METHOD_UNKNOWN, KRPC_ERROR_PROTOCOL, KRPC_ERROR_SERVER,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DhtError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable address for {0}")]
    NoAddress(String),

    #[error("no bootstrap nodes configured")]
    NoBootstrapNodes,

    #[error("no response within timeout")]
    Timeout,

    #[error("bencode error: {0}")]
    Bencode(#[from] crate::bencode::BencodeError),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("unknown query method `{0}`")]
    UnknownMethod(String),

    #[error("invalid node id length")]
    InvalidNodeId,

    #[error("compact node info length {0} is not a multiple of 26")]
    InvalidCompactNodes(usize),

    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },
}

impl DhtError {
    /// The exchange never produced a reply: resolution, socket or write
    /// failure, or timeout. Worth retrying against a different node.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DhtError::Io(_)
                | DhtError::Resolve { .. }
                | DhtError::NoAddress(_)
                | DhtError::NoBootstrapNodes
                | DhtError::Timeout
        )
    }

    /// A reply arrived but was malformed or reported an error.
    pub fn is_protocol(&self) -> bool {
        !self.is_transport()
    }

    /// KRPC error code to answer a query with when handling it failed.
    pub fn krpc_code(&self) -> i64 {
        match self {
            DhtError::UnknownMethod(_) => KRPC_ERROR_METHOD_UNKNOWN,
            DhtError::Remote { .. } => KRPC_ERROR_GENERIC,
            e if e.is_transport() => KRPC_ERROR_SERVER,
            _ => KRPC_ERROR_PROTOCOL,
        }
    }
}
