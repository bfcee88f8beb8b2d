use super::config::DhtConfig;
use super::error::DhtError;
use super::exchange;
use super::id::NodeId;
use super::routing::{Insertion, RoutingTable};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// Builds a routing table seeded from the first configured rendezvous node.
///
/// A fresh random id is generated for this node. The rendezvous node is asked
/// for nodes close to `target` and every node it returns is inserted. Any
/// failure is returned as is; the remaining rendezvous nodes are not tried.
///
/// # Examples
///
/// ```no_run
/// use rdht::dht::{bootstrap, DhtConfig, NodeId};
///
/// # async fn example() -> Result<(), rdht::dht::DhtError> {
/// let info_hash = NodeId([0xab; 20]);
/// let table = bootstrap(&info_hash, &DhtConfig::default()).await?;
/// println!("{} nodes known", table.len());
/// # Ok(())
/// # }
/// ```
pub async fn bootstrap(target: &NodeId, config: &DhtConfig) -> Result<RoutingTable, DhtError> {
    bootstrap_with_id(NodeId::generate(), target, config).await
}

/// [`bootstrap`] with a caller-chosen own id.
pub async fn bootstrap_with_id(
    own_id: NodeId,
    target: &NodeId,
    config: &DhtConfig,
) -> Result<RoutingTable, DhtError> {
    let host = config
        .bootstrap_nodes
        .first()
        .ok_or(DhtError::NoBootstrapNodes)?;

    info!("Starting DHT bootstrap via {} with id {}", host, own_id);

    let remote = resolve(host).await?;
    let nodes = exchange::find_node(config, remote, &own_id, target)
        .await
        .inspect_err(|e| warn!("Bootstrap query to {} failed: {}", remote, e))?;

    debug!("Bootstrap node {} returned {} nodes", remote, nodes.len());

    let mut table = RoutingTable::new(own_id);
    for node in nodes {
        if let Insertion::Discarded = table.insert(node) {
            debug!("Bootstrap node dropped by routing table");
        }
    }

    info!(
        "DHT bootstrap complete, {} nodes in routing table",
        table.len()
    );
    Ok(table)
}

/// Resolves `host:port`, preferring IPv4 since compact node info is IPv4 only.
pub async fn resolve(host: &str) -> Result<SocketAddr, DhtError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(host)
        .await
        .map_err(|source| DhtError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| DhtError::NoAddress(host.to_string()))
}
