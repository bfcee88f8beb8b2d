use super::config::DhtConfig;
use super::error::DhtError;
use super::exchange;
use super::id::NodeId;
use super::node::Node;
use super::routing::{Insertion, RoutingTable};
use crate::constants::DHT_WRITER_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A routing table shared between tasks.
///
/// Readers take the lock concurrently; inserts are serialized behind the
/// write lock. Locks are never held across an `.await`.
#[derive(Clone)]
pub struct SharedTable {
    inner: Arc<RwLock<RoutingTable>>,
}

impl SharedTable {
    pub fn new(table: RoutingTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    pub fn own_id(&self) -> NodeId {
        *self.inner.read().own_id()
    }

    pub fn insert(&self, node: Node) -> Insertion {
        self.inner.write().insert(node)
    }

    /// Records that `id` was seen live at `addr`. A known node is refreshed
    /// and moved to `addr`; an unknown one is offered to the table. Returns
    /// whether the node is in the table afterwards.
    pub fn observe(&self, id: NodeId, addr: SocketAddr) -> bool {
        let mut table = self.inner.write();
        table.refresh(&id, addr) || !matches!(table.insert(Node::new(id, addr)), Insertion::Discarded)
    }

    pub fn closest(&self, target: &NodeId, count: usize) -> Vec<Node> {
        self.inner.read().closest(target, count)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Runs `f` with read access to the table.
    pub fn with_table<R>(&self, f: impl FnOnce(&RoutingTable) -> R) -> R {
        f(&self.inner.read())
    }

    /// Spawns the task that owns all inserts arriving on the returned
    /// channel. The task ends once every sender is dropped and yields the
    /// number of nodes it admitted.
    pub fn spawn_writer(&self) -> (mpsc::Sender<Node>, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::channel::<Node>(DHT_WRITER_CHANNEL_CAPACITY);
        let table = self.clone();

        let handle = tokio::spawn(async move {
            let mut admitted = 0;
            while let Some(node) = rx.recv().await {
                if !matches!(table.insert(node), Insertion::Discarded) {
                    admitted += 1;
                }
            }
            debug!("Routing table writer stopped after {} inserts", admitted);
            admitted
        });

        (tx, handle)
    }

    /// Asks `remote` for nodes near `target` and inserts what it returns.
    ///
    /// Errors are returned to the caller, which decides whether to retry
    /// against another node. The table is left untouched on failure.
    pub async fn query(
        &self,
        config: &DhtConfig,
        remote: SocketAddr,
        target: &NodeId,
    ) -> Result<Vec<Node>, DhtError> {
        let own_id = self.own_id();
        let nodes = match exchange::find_node(config, remote, &own_id, target).await {
            Ok(nodes) => nodes,
            Err(e) => {
                debug!("find_node query to {} failed: {}", remote, e);
                return Err(e);
            }
        };

        {
            let mut table = self.inner.write();
            for node in &nodes {
                table.insert(node.clone());
            }
        }

        Ok(nodes)
    }
}

impl std::fmt::Debug for SharedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTable")
            .field("own_id", &self.own_id())
            .field("nodes", &self.len())
            .finish()
    }
}
