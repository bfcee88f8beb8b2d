use crate::constants::{DEFAULT_PORT, DHT_BOOTSTRAP_NODES, DHT_QUERY_TIMEOUT};
use std::time::Duration;

/// Runtime settings for DHT exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhtConfig {
    /// Source port for outbound queries. `0` picks an ephemeral port.
    pub local_port: u16,
    /// How long a single exchange waits for its reply.
    pub query_timeout: Duration,
    /// Rendezvous nodes as `host:port`. Bootstrap only contacts the first.
    pub bootstrap_nodes: Vec<String>,
}

impl DhtConfig {
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_bootstrap_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bootstrap_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for DhtConfig {
    fn default() -> Self {
        Self {
            local_port: DEFAULT_PORT,
            query_timeout: DHT_QUERY_TIMEOUT,
            bootstrap_nodes: DHT_BOOTSTRAP_NODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
