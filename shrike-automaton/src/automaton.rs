// Automaton - immutable Aho-Corasick trie with failure links
//
// All nodes live in a single arena owned by the automaton. Child edges and
// fail links are indices into that arena, so the back-edge structure needs
// no cyclic ownership: the automaton is one owned allocation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Index of a trie node in the automaton's arena.
pub type NodeId = u32;

/// Index of a pattern in the automaton's pattern table.
pub type PatternId = u32;

/// The root node. Its fail link points at itself.
pub const ROOT: NodeId = 0;

/// A single trie node.
///
/// Edges are kept as an insertion-ordered list of `(byte, child)` pairs.
/// Nodes rarely have more than a handful of children, so a linear scan beats
/// a hash lookup and keeps export order deterministic.
#[derive(Debug, Clone)]
pub(crate) struct TrieNode {
    /// Outgoing edges, keys unique, insertion order preserved.
    pub(crate) edges: SmallVec<[(u8, NodeId); 4]>,

    /// Failure link: the node for the longest proper suffix of the current
    /// path that is also a pattern prefix.
    pub(crate) fail: NodeId,

    /// Patterns recognized when this node is reached, including those merged
    /// from the failure chain at build time. Deduplicated.
    pub(crate) outputs: SmallVec<[PatternId; 1]>,
}

impl TrieNode {
    pub(crate) fn new() -> Self {
        Self {
            edges: SmallVec::new(),
            fail: ROOT,
            outputs: SmallVec::new(),
        }
    }

    pub(crate) fn child(&self, byte: u8) -> Option<NodeId> {
        self.edges
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, id)| *id)
    }
}

/// An immutable multi-pattern matching automaton.
///
/// Built once by [`AutomatonBuilder`](crate::AutomatonBuilder) and never
/// mutated afterwards, so any number of concurrent scans may read it without
/// synchronization. Adopting a new pattern set means building a new value
/// and swapping the reference; in-flight scans against the old automaton
/// stay valid.
#[derive(Clone)]
pub struct Automaton {
    /// Node arena. The root is node 0.
    nodes: Vec<TrieNode>,

    /// Interned patterns in their original spelling; trie paths use the
    /// case-folded form.
    patterns: Vec<String>,
}

impl Automaton {
    pub(crate) fn new(nodes: Vec<TrieNode>, patterns: Vec<String>) -> Self {
        Self { nodes, patterns }
    }

    /// Number of nodes in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct patterns compiled into the automaton.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// The original spelling of a pattern.
    ///
    /// Pattern ids are dense indices handed out by the builder, so any id
    /// observed in an output set resolves here.
    pub fn pattern(&self, id: PatternId) -> &str {
        &self.patterns[id as usize]
    }

    /// All compiled patterns in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Direct child of `node` on `byte`, if the trie edge exists.
    pub fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes[node as usize].child(byte)
    }

    /// Failure link of `node`.
    pub fn fail(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].fail
    }

    /// Patterns recognized at `node` (suffix matches already merged in).
    pub fn outputs(&self, node: NodeId) -> &[PatternId] {
        &self.nodes[node as usize].outputs
    }

    /// The goto function of the automaton: from `node` on an already
    /// case-folded `byte`, following failure links until an edge exists or
    /// the root absorbs the byte.
    pub fn next_state(&self, mut node: NodeId, byte: u8) -> NodeId {
        loop {
            if let Some(child) = self.child(node, byte) {
                return child;
            }
            if node == ROOT {
                return ROOT;
            }
            node = self.fail(node);
        }
    }

    /// Export the automaton structure for external visualizers.
    ///
    /// Nodes are listed in id order and edges in owner-then-insertion order,
    /// so two automata built from the same ordered pattern list export
    /// identically.
    pub fn export(&self) -> AutomatonExport {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| NodeExport {
                id: id as NodeId,
                fail: node.fail,
                output: node
                    .outputs
                    .iter()
                    .map(|&pid| self.pattern(pid).to_string())
                    .collect(),
            })
            .collect();

        let mut edges = Vec::new();
        for (id, node) in self.nodes.iter().enumerate() {
            for &(byte, to) in &node.edges {
                edges.push(EdgeExport {
                    from: id as NodeId,
                    input: byte as char,
                    to,
                });
            }
        }

        AutomatonExport { nodes, edges }
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("node_count", &self.nodes.len())
            .field("pattern_count", &self.patterns.len())
            .finish()
    }
}

/// A node in the exported automaton graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Node id (the root is 0).
    pub id: NodeId,

    /// Failure link target.
    pub fail: NodeId,

    /// Patterns recognized at this node, original spelling.
    pub output: Vec<String>,
}

/// A trie edge in the exported automaton graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    /// Source node id.
    pub from: NodeId,

    /// Case-folded input symbol for this transition.
    pub input: char,

    /// Destination node id.
    pub to: NodeId,
}

/// Serializable automaton structure consumed by external visualizers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutomatonBuilder;

    #[test]
    fn test_root_only_automaton() {
        let automaton = AutomatonBuilder::new().build();
        assert_eq!(automaton.node_count(), 1);
        assert_eq!(automaton.pattern_count(), 0);
        assert_eq!(automaton.fail(ROOT), ROOT);
        assert!(automaton.outputs(ROOT).is_empty());
    }

    #[test]
    fn test_next_state_absorbs_at_root() {
        let automaton = AutomatonBuilder::new().add_pattern("abc").build();
        assert_eq!(automaton.next_state(ROOT, b'z'), ROOT);

        let a = automaton.child(ROOT, b'a').unwrap();
        assert_eq!(automaton.next_state(ROOT, b'a'), a);
    }

    #[test]
    fn test_export_structure() {
        let automaton = AutomatonBuilder::new().add_pattern("ab").build();
        let export = automaton.export();

        // root + 'a' + 'ab'
        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.edges.len(), 2);
        assert_eq!(export.nodes[0].id, ROOT);
        assert_eq!(export.edges[0].from, ROOT);
        assert_eq!(export.edges[0].input, 'a');

        let terminal = export.nodes.iter().find(|n| !n.output.is_empty()).unwrap();
        assert_eq!(terminal.output, vec!["ab".to_string()]);
    }

    #[test]
    fn test_export_is_deterministic() {
        let patterns = ["his", "hers", "she", "he"];
        let a = AutomatonBuilder::new().add_patterns(patterns).build();
        let b = AutomatonBuilder::new().add_patterns(patterns).build();

        assert_eq!(a.export(), b.export());
    }
}
