// Shrike Automaton - Aho-Corasick Multi-Pattern Signature Matching
//!
// This crate provides multi-pattern string matching over raw payload bytes
// using the Aho-Corasick algorithm: a trie of pattern prefixes augmented
// with failure links, giving single-pass matching in time linear in the
// payload length plus the number of matches.
//
// ## Overview
//
// Signature strings are compiled once into an immutable `Automaton`; the
// `Scanner` then runs arbitrarily many payloads against it, reporting every
// occurrence of every pattern together with a per-byte trace that external
// visualizers can replay.
//
// ## Architecture
//
// ```text
// ┌─────────────────────────────────────────────────┐
// │           AutomatonBuilder                      │
// │  (trie insertion + BFS failure links +          │
// │   output-set merging)                           │
// └──────────────┬──────────────────────────────────┘
//                │
//                v
// ┌─────────────────────────────────────────────────┐
// │           Automaton (immutable)                 │
// │  node arena, fail links as indices,             │
// │  interned pattern table                         │
// └──────────────┬──────────────────────────────────┘
//                │
//                v
// ┌─────────────────────────────────────────────────┐
// │           Scanner                               │
// │  - matches: Vec<PatternMatch>                   │
// │  - steps:   Vec<ScanStep> (replay trace)        │
// └─────────────────────────────────────────────────┘
// ```
//
// Matching is ASCII case-insensitive: patterns are case-folded at insertion
// and payload bytes are folded the same way at scan time. Matches report the
// pattern's original spelling.

mod automaton;
mod builder;
mod scanner;

#[cfg(test)]
mod perf;

pub use automaton::{Automaton, AutomatonExport, EdgeExport, NodeExport, NodeId, PatternId, ROOT};
pub use builder::AutomatonBuilder;
pub use scanner::{PatternMatch, ScanReport, ScanStep, Scanner};
