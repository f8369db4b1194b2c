//! Radix Tree Index
//!
//! A compressed trie over normalized terms with record ids stored at
//! terminal positions. Each edge is labeled with a full byte substring,
//! not a single character, so chains of single-child nodes collapse.
//!
//! ## Invariants
//! - No two sibling children share the first byte of their edge label,
//!   so child lookup can binary-search on that byte.
//! - Every non-root node has a non-empty edge label.
//! - Id lists are kept sorted and duplicate-free; children are kept
//!   ordered by edge label, so traversals are reproducible.

use std::collections::HashSet;

#[derive(Debug, Default)]
struct RadixNode {
    /// Shared prefix consumed by reaching this node. Stored as raw bytes:
    /// an edge split may land inside a multi-byte character.
    edge_label: Vec<u8>,
    address_ids: Vec<u64>,
    children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(edge_label: Vec<u8>) -> Self {
        Self {
            edge_label,
            ..Self::default()
        }
    }

    fn record_id(&mut self, id: u64) {
        if let Err(pos) = self.address_ids.binary_search(&id) {
            self.address_ids.insert(pos, id);
        }
    }

    /// Locates the unique child whose edge label starts with `first`.
    /// Siblings never share a first byte, so label order is first-byte order.
    fn child_position(&self, first: u8) -> Result<usize, usize> {
        self.children
            .binary_search_by(|child| child.edge_label[0].cmp(&first))
    }
}

/// The inverted index: normalized term (or any prefix of it) -> record ids.
#[derive(Debug, Default)]
pub struct RadixIndex {
    root: RadixNode,
    insertions: usize,
}

impl RadixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `term` -> `id`. The empty term is ignored; re-inserting an
    /// existing `(term, id)` pair leaves the tree unchanged. The term
    /// counter increments on every accepted call (it counts insertions,
    /// not distinct terms).
    pub fn insert(&mut self, term: &str, id: u64) {
        if term.is_empty() {
            return;
        }
        Self::insert_at(&mut self.root, term.as_bytes(), id);
        self.insertions += 1;
    }

    fn insert_at(node: &mut RadixNode, remaining: &[u8], id: u64) {
        if remaining.is_empty() {
            node.record_id(id);
            return;
        }

        let pos = match node.child_position(remaining[0]) {
            Ok(pos) => pos,
            Err(pos) => {
                // No child shares a prefix with the suffix: new leaf.
                let mut leaf = RadixNode::new(remaining.to_vec());
                leaf.address_ids.push(id);
                node.children.insert(pos, leaf);
                return;
            }
        };

        let child = &mut node.children[pos];
        let common = common_prefix_len(&child.edge_label, remaining);

        if common == child.edge_label.len() {
            // The entire edge label matches: continue down this path.
            Self::insert_at(child, &remaining[common..], id);
            return;
        }

        // Split the edge: a new intermediate node takes the shared prefix
        // and the old child moves under it with the leftover suffix.
        let shared = child.edge_label[..common].to_vec();
        let mut moved = std::mem::replace(child, RadixNode::new(shared));
        moved.edge_label.drain(..common);
        child.children.push(moved);

        Self::insert_at(child, &remaining[common..], id);
    }

    /// Returns every record id reachable under `prefix`, de-duplicated,
    /// in depth-first traversal order. The empty prefix yields nothing.
    pub fn search(&self, prefix: &str) -> Vec<u64> {
        let mut results = Vec::new();
        if prefix.is_empty() {
            return results;
        }
        let mut seen = HashSet::new();
        Self::search_at(&self.root, prefix.as_bytes(), &mut results, &mut seen);
        results
    }

    fn search_at(
        node: &RadixNode,
        remaining: &[u8],
        results: &mut Vec<u64>,
        seen: &mut HashSet<u64>,
    ) {
        let Ok(pos) = node.child_position(remaining[0]) else {
            return;
        };
        let child = &node.children[pos];

        if remaining.len() <= child.edge_label.len() {
            // The remaining query ends inside this edge: the matched
            // subtree is everything rooted at the child.
            if child.edge_label.starts_with(remaining) {
                Self::collect_subtree(child, results, seen);
            }
        } else if remaining.starts_with(&child.edge_label) {
            Self::search_at(child, &remaining[child.edge_label.len()..], results, seen);
        }
    }

    fn collect_subtree(node: &RadixNode, results: &mut Vec<u64>, seen: &mut HashSet<u64>) {
        for &id in &node.address_ids {
            if seen.insert(id) {
                results.push(id);
            }
        }
        for child in &node.children {
            Self::collect_subtree(child, results, seen);
        }
    }

    /// Number of accepted insert calls.
    pub fn term_count(&self) -> usize {
        self.insertions
    }

    /// Best-effort recursive byte count: node structural size plus edge
    /// label capacity plus id and child vector capacities. For
    /// observability only.
    pub fn memory_usage(&self) -> usize {
        Self::node_usage(&self.root)
    }

    fn node_usage(node: &RadixNode) -> usize {
        let mut usage = std::mem::size_of::<RadixNode>();
        usage += node.edge_label.capacity();
        usage += node.address_ids.capacity() * std::mem::size_of::<u64>();
        usage += node.children.capacity() * std::mem::size_of::<RadixNode>();
        for child in &node.children {
            usage += Self::node_usage(child);
        }
        usage
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
