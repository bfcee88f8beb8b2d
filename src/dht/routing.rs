use std::collections::vec_deque;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Instant;

use tracing::trace;

use super::id::NodeId;
use super::node::Node;
use crate::constants::{DHT_BUCKET_SIZE, ID_BITS};

/// Outcome of [`RoutingTable::insert`]. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    Added,
    /// Added after removing this stale node from the full bucket.
    Evicted(Node),
    /// Bucket full of good nodes and not covering our own id.
    Discarded,
}

#[derive(Debug, Default)]
pub struct Bucket {
    nodes: VecDeque<Node>,
    last_refreshed: Option<Instant>,
}

impl Bucket {
    fn empty(last_refreshed: Option<Instant>) -> Self {
        Self {
            nodes: VecDeque::with_capacity(DHT_BUCKET_SIZE),
            last_refreshed,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= DHT_BUCKET_SIZE
    }

    /// Most recently inserted first.
    pub fn nodes(&self) -> vec_deque::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Time of the last successful insertion, `None` if never filled.
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.last_refreshed
    }

    fn push(&mut self, node: Node, now: Instant) {
        self.nodes.push_front(node);
        self.last_refreshed = Some(now);
    }

    /// Removes the first node that is no longer good, if any.
    fn evict_stale(&mut self, now: Instant) -> Option<Node> {
        let pos = self.nodes.iter().position(|n| !n.is_good_at(now))?;
        self.nodes.remove(pos)
    }

    fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }
}

#[derive(Debug)]
enum Slot {
    Leaf(Bucket),
    Split {
        left: Box<BucketTree>,
        right: Box<BucketTree>,
    },
}

/// A node of the routing trie: a leaf holding a bucket, or an internal node
/// branching on bit `depth` (0 goes left, 1 goes right).
#[derive(Debug)]
pub struct BucketTree {
    depth: usize,
    slot: Slot,
}

impl BucketTree {
    fn leaf(depth: usize, bucket: Bucket) -> Self {
        Self {
            depth,
            slot: Slot::Leaf(bucket),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.slot, Slot::Leaf(_))
    }

    /// The bucket of a leaf. Internal nodes have none.
    pub fn bucket(&self) -> Option<&Bucket> {
        match &self.slot {
            Slot::Leaf(bucket) => Some(bucket),
            Slot::Split { .. } => None,
        }
    }

    /// `(left, right)` of an internal node.
    pub fn children(&self) -> Option<(&BucketTree, &BucketTree)> {
        match &self.slot {
            Slot::Leaf(_) => None,
            Slot::Split { left, right } => Some((&**left, &**right)),
        }
    }

    fn insert(&mut self, node: Node, own_id: &NodeId, now: Instant) -> Insertion {
        let depth = self.depth;
        let bucket = match &mut self.slot {
            Slot::Split { left, right } => {
                let child = if node.id.bit(depth) == 0 { left } else { right };
                return child.insert(node, own_id, now);
            }
            Slot::Leaf(bucket) => bucket,
        };

        if !bucket.is_full() {
            bucket.push(node, now);
            return Insertion::Added;
        }

        if let Some(evicted) = bucket.evict_stale(now) {
            trace!("Evicting stale node {} at depth {}", evicted.id, depth);
            bucket.push(node, now);
            return Insertion::Evicted(evicted);
        }

        if depth < ID_BITS && own_id.shares_prefix(&node.id, depth) {
            self.split();
            return self.insert(node, own_id, now);
        }

        trace!("Discarding node {}: bucket at depth {} is full", node.id, depth);
        Insertion::Discarded
    }

    /// Turns this leaf into an internal node with two leaves one level down,
    /// moving every node into the child matching its bit at this depth.
    fn split(&mut self) {
        let depth = self.depth;
        let bucket = match &mut self.slot {
            Slot::Leaf(bucket) => std::mem::take(bucket),
            Slot::Split { .. } => unreachable!("split of internal trie node at depth {}", depth),
        };

        let mut left = Bucket::empty(bucket.last_refreshed);
        let mut right = Bucket::empty(bucket.last_refreshed);

        for node in bucket.nodes {
            if node.id.bit(depth) == 0 {
                left.nodes.push_back(node);
            } else {
                right.nodes.push_back(node);
            }
        }

        trace!(
            "Split bucket at depth {} into {} left, {} right",
            depth,
            left.len(),
            right.len()
        );

        self.slot = Slot::Split {
            left: Box::new(Self::leaf(depth + 1, left)),
            right: Box::new(Self::leaf(depth + 1, right)),
        };
    }

    fn bucket_for(&self, id: &NodeId) -> &Bucket {
        match &self.slot {
            Slot::Leaf(bucket) => bucket,
            Slot::Split { left, right } => {
                if id.bit(self.depth) == 0 {
                    left.bucket_for(id)
                } else {
                    right.bucket_for(id)
                }
            }
        }
    }

    fn bucket_for_mut(&mut self, id: &NodeId) -> &mut Bucket {
        let depth = self.depth;
        match &mut self.slot {
            Slot::Leaf(bucket) => bucket,
            Slot::Split { left, right } => {
                if id.bit(depth) == 0 {
                    left.bucket_for_mut(id)
                } else {
                    right.bucket_for_mut(id)
                }
            }
        }
    }

    // Depth-first with the subtree sharing the target's next bit visited
    // first, so leaves come out in increasing XOR distance.
    fn collect_closest(&self, target: &NodeId, count: usize, now: Instant, out: &mut Vec<Node>) {
        if out.len() >= count {
            return;
        }

        match &self.slot {
            Slot::Leaf(bucket) => {
                let mut good: Vec<&Node> = bucket.nodes().filter(|n| n.is_good_at(now)).collect();
                good.sort_by_key(|n| n.id.distance(target));

                let room = count - out.len();
                out.extend(good.into_iter().take(room).cloned());
            }
            Slot::Split { left, right } => {
                let (near, far) = if target.bit(self.depth) == 0 {
                    (left, right)
                } else {
                    (right, left)
                };
                near.collect_closest(target, count, now, out);
                far.collect_closest(target, count, now, out);
            }
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a BucketTree>) {
        match &self.slot {
            Slot::Leaf(_) => out.push(self),
            Slot::Split { left, right } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

/// Kademlia routing table organised as a binary trie of k-buckets.
///
/// Buckets only split when they cover our own id, so resolution is fine
/// around our own position and coarse everywhere else. The table does no
/// locking of its own; see [`SharedTable`](super::SharedTable) for sharing
/// across tasks.
#[derive(Debug)]
pub struct RoutingTable {
    own_id: NodeId,
    root: BucketTree,
}

impl RoutingTable {
    pub fn new(own_id: NodeId) -> Self {
        Self {
            own_id,
            root: BucketTree::leaf(0, Bucket::empty(None)),
        }
    }

    pub fn own_id(&self) -> &NodeId {
        &self.own_id
    }

    pub fn root(&self) -> &BucketTree {
        &self.root
    }

    pub fn insert(&mut self, node: Node) -> Insertion {
        self.insert_at(node, Instant::now())
    }

    /// Admits `node`, using `now` for liveness checks and bucket refresh.
    ///
    /// The node lands at the head of the leaf bucket its id descends to. A
    /// full bucket first gives up one node that is no longer good; failing
    /// that, it is split if it covers our own id, and otherwise the new node
    /// is dropped.
    ///
    /// Ids already present are not deduplicated, inserting the same node
    /// twice stores it twice. Our own id is never stored.
    pub fn insert_at(&mut self, node: Node, now: Instant) -> Insertion {
        if node.id == self.own_id {
            trace!("Discarding our own id {}", node.id);
            return Insertion::Discarded;
        }

        self.root.insert(node, &self.own_id, now)
    }

    /// Marks a known node as active now. Returns false if it is not stored.
    pub fn mark_seen(&mut self, id: &NodeId) -> bool {
        match self.root.bucket_for_mut(id).get_mut(id) {
            Some(node) => {
                node.touch();
                true
            }
            None => false,
        }
    }

    /// Marks a known node as active now and records `addr` as its current
    /// address. Returns false if it is not stored.
    pub fn refresh(&mut self, id: &NodeId, addr: SocketAddr) -> bool {
        match self.root.bucket_for_mut(id).get_mut(id) {
            Some(node) => {
                node.addr = addr;
                node.touch();
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.root.bucket_for(id).get(id)
    }

    /// Up to `count` good nodes ordered by XOR distance to `target`.
    pub fn closest(&self, target: &NodeId, count: usize) -> Vec<Node> {
        self.closest_at(target, count, Instant::now())
    }

    pub fn closest_at(&self, target: &NodeId, count: usize, now: Instant) -> Vec<Node> {
        let mut out = Vec::with_capacity(count.min(self.len()));
        self.root.collect_closest(target, count, now, &mut out);
        out
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<&BucketTree> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| leaf.bucket())
            .flat_map(|bucket| bucket.nodes())
    }

    pub fn len(&self) -> usize {
        self.leaves()
            .iter()
            .filter_map(|leaf| leaf.bucket())
            .map(Bucket::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of the deepest leaf.
    pub fn max_depth(&self) -> usize {
        self.leaves().iter().map(|leaf| leaf.depth).max().unwrap_or(0)
    }
}
