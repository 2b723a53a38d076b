// Builder - trie insertion and failure-link construction
//
// Insertion is O(total pattern length); the failure-link pass is a
// breadth-first traversal of the finished trie, O(trie size). Output sets
// from the failure chain are merged into each node as its link is computed,
// so the scanner never walks fail links to collect matches.

use crate::automaton::{Automaton, NodeId, PatternId, TrieNode, ROOT};
use ahash::AHashSet;
use std::collections::VecDeque;
use tracing::debug;

/// Compiles an ordered list of signature strings into an [`Automaton`].
///
/// Construction never fails: an empty pattern list yields a root-only
/// automaton that matches nothing, and empty-string patterns are accepted
/// but contribute no structure. Patterns are ASCII case-folded during
/// insertion; this is a fixed policy, not configurable.
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    patterns: Vec<String>,
    seen: AHashSet<String>,
}

impl AutomatonBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single pattern. Exact duplicates of an already-added pattern
    /// are dropped; case variants are kept as distinct patterns.
    pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if self.seen.insert(pattern.clone()) {
            self.patterns.push(pattern);
        }
        self
    }

    /// Add patterns in order.
    pub fn add_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            self = self.add_pattern(pattern);
        }
        self
    }

    /// Number of patterns added so far.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Build the immutable automaton: insert every pattern along a trie
    /// path, then compute failure links breadth-first and merge each node's
    /// failure-target outputs into its own output set.
    pub fn build(self) -> Automaton {
        let mut nodes = vec![TrieNode::new()];

        for (pid, pattern) in self.patterns.iter().enumerate() {
            insert(&mut nodes, pattern, pid as PatternId);
        }

        build_fail_links(&mut nodes);

        debug!(
            patterns = self.patterns.len(),
            nodes = nodes.len(),
            "Built signature automaton"
        );

        Automaton::new(nodes, self.patterns)
    }
}

/// Insert one pattern along a case-folded trie path, creating nodes as
/// needed, and mark the terminal node's output set.
fn insert(nodes: &mut Vec<TrieNode>, pattern: &str, pid: PatternId) {
    if pattern.is_empty() {
        // No path to walk and nothing a scan could ever report.
        return;
    }

    let mut current = ROOT;
    for byte in pattern.bytes().map(|b| b.to_ascii_lowercase()) {
        current = match nodes[current as usize].child(byte) {
            Some(child) => child,
            None => {
                let id = nodes.len() as NodeId;
                nodes.push(TrieNode::new());
                nodes[current as usize].edges.push((byte, id));
                id
            }
        };
    }

    // Case variants of one folded path share a terminal node; each distinct
    // pattern id is still listed once.
    if !nodes[current as usize].outputs.contains(&pid) {
        nodes[current as usize].outputs.push(pid);
    }
}

/// Breadth-first failure-link construction.
///
/// Direct children of the root fail to the root. A deeper node `s`, reached
/// from parent `r` via `byte`, fails to the child on `byte` of the first
/// node along `r`'s failure chain that has such an edge, defaulting to the
/// root. `s.fail`'s outputs are merged into `s` immediately, so matching at
/// `s` reports all suffix matches without re-walking fail links at scan
/// time.
fn build_fail_links(nodes: &mut [TrieNode]) {
    let mut queue = VecDeque::new();

    // Edge lists are frozen at this point; snapshot them so the BFS can
    // mutate fail links and output sets while walking.
    let edges: Vec<Vec<(u8, NodeId)>> = nodes.iter().map(|node| node.edges.to_vec()).collect();

    for &(_, child) in &edges[ROOT as usize] {
        nodes[child as usize].fail = ROOT;
        queue.push_back(child);
    }

    while let Some(r) = queue.pop_front() {
        for &(byte, s) in &edges[r as usize] {
            queue.push_back(s);

            let mut f = nodes[r as usize].fail;
            while f != ROOT && nodes[f as usize].child(byte).is_none() {
                f = nodes[f as usize].fail;
            }
            let fail = nodes[f as usize].child(byte).unwrap_or(ROOT);
            nodes[s as usize].fail = fail;

            let merged: Vec<PatternId> = nodes[fail as usize].outputs.to_vec();
            for pid in merged {
                if !nodes[s as usize].outputs.contains(&pid) {
                    nodes[s as usize].outputs.push(pid);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::ROOT;

    #[test]
    fn test_builder_empty() {
        let automaton = AutomatonBuilder::new().build();
        assert_eq!(automaton.node_count(), 1);
        assert_eq!(automaton.pattern_count(), 0);
    }

    #[test]
    fn test_node_count_bounded_by_pattern_length() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["he", "she", "his", "hers"])
            .build();

        // Shared prefixes collapse: root + h,e,r,s + s,h,e + i,s = 10.
        assert_eq!(automaton.node_count(), 10);
        assert_eq!(automaton.pattern_count(), 4);
    }

    #[test]
    fn test_duplicate_patterns_intern_once() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["virus", "virus", "virus"])
            .build();

        assert_eq!(automaton.pattern_count(), 1);

        // Walk to the terminal node and check its output set.
        let mut node = ROOT;
        for byte in b"virus" {
            node = automaton.child(node, *byte).unwrap();
        }
        assert_eq!(automaton.outputs(node).len(), 1);
    }

    #[test]
    fn test_case_variants_share_terminal_node() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["Virus", "virus"])
            .build();

        assert_eq!(automaton.pattern_count(), 2);

        let mut node = ROOT;
        for byte in b"virus" {
            node = automaton.child(node, *byte).unwrap();
        }
        // Both spellings are recognized at the shared terminal.
        assert_eq!(automaton.outputs(node).len(), 2);
    }

    #[test]
    fn test_empty_string_pattern_is_inert() {
        let automaton = AutomatonBuilder::new().add_pattern("").build();
        assert_eq!(automaton.node_count(), 1);
        assert!(automaton.outputs(ROOT).is_empty());
    }

    #[test]
    fn test_fail_links_point_to_longest_suffix() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["she", "he"])
            .build();

        // Nodes: root=0, s=1, sh=2, she=3, h=4, he=5.
        let s = automaton.child(ROOT, b's').unwrap();
        let sh = automaton.child(s, b'h').unwrap();
        let she = automaton.child(sh, b'e').unwrap();
        let h = automaton.child(ROOT, b'h').unwrap();
        let he = automaton.child(h, b'e').unwrap();

        assert_eq!(automaton.fail(s), ROOT);
        assert_eq!(automaton.fail(sh), h);
        assert_eq!(automaton.fail(she), he);
    }

    #[test]
    fn test_fail_outputs_merged() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["she", "he"])
            .build();

        let s = automaton.child(ROOT, b's').unwrap();
        let sh = automaton.child(s, b'h').unwrap();
        let she = automaton.child(sh, b'e').unwrap();

        // "she" ends where "he" also ends; the merge makes both visible
        // without walking the failure chain.
        let outputs: Vec<&str> = automaton
            .outputs(she)
            .iter()
            .map(|&pid| automaton.pattern(pid))
            .collect();
        assert!(outputs.contains(&"she"));
        assert!(outputs.contains(&"he"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let patterns = ["drop table", "union select", "or 1=1", "select"];
        let a = AutomatonBuilder::new().add_patterns(patterns).build();
        let b = AutomatonBuilder::new().add_patterns(patterns).build();

        assert_eq!(a.node_count(), b.node_count());
        assert_eq!(a.export(), b.export());
    }
}
