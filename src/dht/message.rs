use super::error::DhtError;
use super::id::NodeId;
use super::node::Node;
use crate::bencode::{decode, encode, Dict, Value};
use crate::constants::{CLIENT_VERSION, COMPACT_NODE_LEN, TRANSACTION_ID_LEN};
use bytes::Bytes;
use rand::Rng as _;
use std::time::Instant;

pub type TransactionId = Bytes;

/// Fresh random transaction id for an outgoing query.
pub fn new_transaction_id() -> TransactionId {
    let mut id = [0u8; TRANSACTION_ID_LEN];
    rand::rng().fill(&mut id);
    Bytes::copy_from_slice(&id)
}

/// Method-specific part of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Ping,
    FindNode { target: NodeId },
}

impl Query {
    /// Method name carried in the `q` field.
    pub fn method(&self) -> &'static str {
        match self {
            Query::Ping => "ping",
            Query::FindNode { .. } => "find_node",
        }
    }
}

/// A KRPC query (`y` = `q`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrpcQuery {
    pub transaction_id: TransactionId,
    pub version: Option<Bytes>,
    /// Requester id, sent as `a.id`.
    pub sender: NodeId,
    pub query: Query,
}

impl KrpcQuery {
    pub fn ping(transaction_id: TransactionId, our_id: &NodeId) -> Self {
        Self::new(transaction_id, our_id, Query::Ping)
    }

    pub fn find_node(transaction_id: TransactionId, our_id: &NodeId, target: NodeId) -> Self {
        Self::new(transaction_id, our_id, Query::FindNode { target })
    }

    fn new(transaction_id: TransactionId, our_id: &NodeId, query: Query) -> Self {
        Self {
            transaction_id,
            version: Some(Bytes::from_static(CLIENT_VERSION)),
            sender: *our_id,
            query,
        }
    }

    pub fn method(&self) -> &'static str {
        self.query.method()
    }

    pub fn parse(data: &[u8]) -> Result<Self, DhtError> {
        let value = decode(data)?;
        let envelope = Envelope::parse(&value)?;

        if envelope.kind != "q" {
            return Err(DhtError::InvalidMessage(format!(
                "expected query, got message type `{}`",
                envelope.kind
            )));
        }

        let method = envelope.fields.str("q")?;
        let args = envelope.fields.dict("a", "query arguments")?;
        let sender = args.node_id("id")?;

        let query = match method {
            "ping" => Query::Ping,
            "find_node" => Query::FindNode {
                target: args.node_id("target")?,
            },
            other => return Err(DhtError::UnknownMethod(other.to_string())),
        };

        Ok(Self {
            transaction_id: envelope.transaction_id,
            version: envelope.version,
            sender,
            query,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut args = vec![("id", Value::bytes(self.sender.as_bytes()))];
        if let Query::FindNode { target } = &self.query {
            args.push(("target", Value::bytes(target.as_bytes())));
        }

        let mut msg = vec![
            ("t", Value::Bytes(self.transaction_id.clone())),
            ("y", Value::string("q")),
            ("q", Value::string(self.method())),
            ("a", Value::dict(args)),
        ];
        if let Some(version) = &self.version {
            msg.push(("v", Value::Bytes(version.clone())));
        }

        encode(&Value::dict(msg))
    }
}

/// Successful reply payload (`r` dict).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Responder's own id.
    pub id: NodeId,
    /// Decoded `nodes` field; `None` when the reply carries none (ping).
    pub nodes: Option<Vec<Node>>,
}

impl Reply {
    pub fn into_nodes(self) -> Result<Vec<Node>, DhtError> {
        self.nodes
            .ok_or_else(|| DhtError::InvalidMessage("reply has no `nodes` field".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Reply(Reply),
    Error { code: i64, message: String },
}

/// A KRPC response, either `y` = `r` or `y` = `e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrpcResponse {
    pub transaction_id: TransactionId,
    pub version: Option<Bytes>,
    pub body: ResponseBody,
}

impl KrpcResponse {
    pub fn find_node(transaction_id: TransactionId, our_id: &NodeId, nodes: Vec<Node>) -> Self {
        Self::new(
            transaction_id,
            ResponseBody::Reply(Reply {
                id: *our_id,
                nodes: Some(nodes),
            }),
        )
    }

    pub fn pong(transaction_id: TransactionId, our_id: &NodeId) -> Self {
        Self::new(
            transaction_id,
            ResponseBody::Reply(Reply {
                id: *our_id,
                nodes: None,
            }),
        )
    }

    pub fn error(transaction_id: TransactionId, code: i64, message: impl Into<String>) -> Self {
        Self::new(
            transaction_id,
            ResponseBody::Error {
                code,
                message: message.into(),
            },
        )
    }

    fn new(transaction_id: TransactionId, body: ResponseBody) -> Self {
        Self {
            transaction_id,
            version: Some(Bytes::from_static(CLIENT_VERSION)),
            body,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, ResponseBody::Error { .. })
    }

    /// Converts an error reply into [`DhtError::Remote`].
    pub fn into_reply(self) -> Result<Reply, DhtError> {
        match self.body {
            ResponseBody::Reply(reply) => Ok(reply),
            ResponseBody::Error { code, message } => Err(DhtError::Remote { code, message }),
        }
    }

    pub fn into_nodes(self) -> Result<Vec<Node>, DhtError> {
        self.into_reply()?.into_nodes()
    }

    /// Decodes a response datagram. Nodes found in it are stamped as active
    /// now.
    pub fn parse(data: &[u8]) -> Result<Self, DhtError> {
        let value = decode(data)?;
        let envelope = Envelope::parse(&value)?;

        let body = match envelope.kind {
            "r" => {
                let r = envelope.fields.dict("r", "reply")?;
                let id = r.node_id("id")?;
                let nodes = r
                    .optional_bytes("nodes")?
                    .map(|data| decode_compact_nodes(data, Instant::now()))
                    .transpose()?;

                ResponseBody::Reply(Reply { id, nodes })
            }
            "e" => match envelope.fields.list("e")? {
                [code, message] => {
                    let code = code.as_integer().ok_or_else(|| {
                        DhtError::InvalidMessage(format!(
                            "error code must be an integer, got {}",
                            code.kind()
                        ))
                    })?;
                    let message = message.as_bytes().ok_or_else(|| {
                        DhtError::InvalidMessage(format!(
                            "error message must be a string, got {}",
                            message.kind()
                        ))
                    })?;

                    ResponseBody::Error {
                        code,
                        message: String::from_utf8_lossy(message).into_owned(),
                    }
                }
                other => {
                    return Err(DhtError::InvalidMessage(format!(
                        "error list must have 2 elements, got {}",
                        other.len()
                    )))
                }
            },
            other => {
                return Err(DhtError::InvalidMessage(format!(
                    "expected response, got message type `{}`",
                    other
                )))
            }
        };

        Ok(Self {
            transaction_id: envelope.transaction_id,
            version: envelope.version,
            body,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut msg = vec![("t", Value::Bytes(self.transaction_id.clone()))];

        match &self.body {
            ResponseBody::Reply(reply) => {
                let mut r = vec![("id", Value::bytes(reply.id.as_bytes()))];
                if let Some(nodes) = &reply.nodes {
                    r.push(("nodes", Value::Bytes(encode_compact_nodes(nodes).into())));
                }
                msg.push(("y", Value::string("r")));
                msg.push(("r", Value::dict(r)));
            }
            ResponseBody::Error { code, message } => {
                msg.push(("y", Value::string("e")));
                msg.push((
                    "e",
                    Value::List(vec![Value::Integer(*code), Value::string(message)]),
                ));
            }
        }

        if let Some(version) = &self.version {
            msg.push(("v", Value::Bytes(version.clone())));
        }

        encode(&Value::dict(msg))
    }
}

/// Splits a compact node info string into 26-byte records.
///
/// A trailing partial record is an error, not silently dropped.
pub fn decode_compact_nodes(data: &[u8], last_active: Instant) -> Result<Vec<Node>, DhtError> {
    if data.len() % COMPACT_NODE_LEN != 0 {
        return Err(DhtError::InvalidCompactNodes(data.len()));
    }

    data.chunks_exact(COMPACT_NODE_LEN)
        .map(|record| {
            Node::from_compact(record, last_active)
                .ok_or(DhtError::InvalidCompactNodes(data.len()))
        })
        .collect()
}

/// Packs IPv4 nodes into compact node info. IPv6 nodes are skipped.
pub fn encode_compact_nodes(nodes: &[Node]) -> Vec<u8> {
    nodes.iter().filter_map(Node::to_compact).flatten().collect()
}

/// Fields shared by every KRPC message.
struct Envelope<'a> {
    transaction_id: TransactionId,
    version: Option<Bytes>,
    kind: &'a str,
    fields: Fields<'a>,
}

impl<'a> Envelope<'a> {
    fn parse(value: &'a Value) -> Result<Self, DhtError> {
        let dict = value.as_dict().ok_or_else(|| {
            DhtError::InvalidMessage(format!("expected dict, got {}", value.kind()))
        })?;
        let fields = Fields {
            dict,
            context: "message",
        };

        Ok(Self {
            transaction_id: fields.bytes("t")?.clone(),
            version: fields.optional_bytes("v")?.cloned(),
            kind: fields.str("y")?,
            fields,
        })
    }
}

/// Typed lookups into a decoded dictionary with descriptive errors.
struct Fields<'a> {
    dict: &'a Dict,
    context: &'static str,
}

impl<'a> Fields<'a> {
    fn get(&self, key: &'static str) -> Result<&'a Value, DhtError> {
        self.dict.get(key.as_bytes()).ok_or_else(|| {
            DhtError::InvalidMessage(format!("missing `{}` in {}", key, self.context))
        })
    }

    fn expect<T>(
        &self,
        key: &'static str,
        expected: &str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, DhtError> {
        let value = self.get(key)?;
        convert(value).ok_or_else(|| {
            DhtError::InvalidMessage(format!(
                "`{}` in {} must be {}, got {}",
                key,
                self.context,
                expected,
                value.kind()
            ))
        })
    }

    fn bytes(&self, key: &'static str) -> Result<&'a Bytes, DhtError> {
        self.expect(key, "a string", Value::as_bytes)
    }

    fn optional_bytes(&self, key: &'static str) -> Result<Option<&'a Bytes>, DhtError> {
        if self.dict.contains_key(key.as_bytes()) {
            self.bytes(key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn str(&self, key: &'static str) -> Result<&'a str, DhtError> {
        self.expect(key, "a utf-8 string", Value::as_str)
    }

    fn list(&self, key: &'static str) -> Result<&'a [Value], DhtError> {
        self.expect(key, "a list", Value::as_list)
    }

    fn dict(&self, key: &'static str, context: &'static str) -> Result<Fields<'a>, DhtError> {
        self.expect(key, "a dict", Value::as_dict)
            .map(|dict| Fields { dict, context })
    }

    fn node_id(&self, key: &'static str) -> Result<NodeId, DhtError> {
        NodeId::from_bytes(self.bytes(key)?)
    }
}
