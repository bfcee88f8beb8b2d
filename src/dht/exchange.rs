use super::config::DhtConfig;
use super::error::DhtError;
use super::id::NodeId;
use super::message::{new_transaction_id, KrpcQuery, KrpcResponse, Reply};
use super::node::Node;
use crate::constants::DHT_MAX_DATAGRAM_SIZE;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

/// One query/response round trip with a single remote node.
///
/// The socket is owned by the exchange and closed when it is dropped, which
/// happens on every exit path of [`Exchange::send`], including when the
/// returned future is itself dropped before completion.
pub struct Exchange {
    socket: UdpSocket,
    remote: SocketAddr,
    wait: Duration,
}

impl Exchange {
    /// Binds `local_port` (0 for an ephemeral port) and connects to `remote`.
    pub async fn open(local_port: u16, remote: SocketAddr, wait: Duration) -> Result<Self, DhtError> {
        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, local_port)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, local_port)),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;

        Ok(Self {
            socket,
            remote,
            wait,
        })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Sends `query` as one datagram and waits for the matching reply.
    ///
    /// Datagrams carrying another transaction id are skipped; the deadline is
    /// fixed when the send completes and is not extended by them.
    pub async fn send(self, query: &KrpcQuery) -> Result<Reply, DhtError> {
        let payload = query.encode();
        let sent = self.socket.send(&payload).await?;
        if sent != payload.len() {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "datagram truncated on send").into());
        }

        debug!(
            "Sent {} query to {} ({} bytes)",
            query.method(),
            self.remote,
            sent
        );

        let deadline = Instant::now() + self.wait;
        let mut buf = vec![0u8; DHT_MAX_DATAGRAM_SIZE];

        loop {
            let n = match timeout_at(deadline, self.socket.recv(&mut buf)).await {
                Ok(result) => result?,
                Err(_) => {
                    debug!("No response from {} within {:?}", self.remote, self.wait);
                    return Err(DhtError::Timeout);
                }
            };

            let response = KrpcResponse::parse(&buf[..n])?;

            if response.transaction_id != query.transaction_id {
                trace!(
                    "Ignoring response from {} with unexpected transaction id {:02x?}",
                    self.remote,
                    &response.transaction_id[..]
                );
                continue;
            }

            debug!("Received {} byte response from {}", n, self.remote);
            return response.into_reply();
        }
    }
}

/// Asks `remote` for the nodes it knows closest to `target`.
pub async fn find_node(
    config: &DhtConfig,
    remote: SocketAddr,
    our_id: &NodeId,
    target: &NodeId,
) -> Result<Vec<Node>, DhtError> {
    let query = KrpcQuery::find_node(new_transaction_id(), our_id, *target);
    let exchange = Exchange::open(config.local_port, remote, config.query_timeout).await?;
    exchange.send(&query).await?.into_nodes()
}

/// Checks that `remote` answers, returning its id.
pub async fn ping(config: &DhtConfig, remote: SocketAddr, our_id: &NodeId) -> Result<NodeId, DhtError> {
    let query = KrpcQuery::ping(new_transaction_id(), our_id);
    let exchange = Exchange::open(config.local_port, remote, config.query_timeout).await?;
    Ok(exchange.send(&query).await?.id)
}
