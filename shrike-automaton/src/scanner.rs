// Scanner - single-pass payload scanning over a built automaton
//
// The scanner is pure: it holds a shared reference to an immutable
// automaton and keeps no state between calls, so concurrent scans over one
// automaton are safe without synchronization.

use crate::automaton::{Automaton, NodeId, ROOT};
use serde::{Deserialize, Serialize};

/// A single pattern occurrence in a scanned payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// The pattern, in its original spelling.
    pub pattern: String,

    /// 0-indexed byte position where the occurrence starts.
    pub position: usize,
}

/// One trace entry per input byte consumed, in order.
///
/// External visualizers replay these steps to animate the automaton walk;
/// the scanner itself never calls back into presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStep {
    /// Raw byte value from the payload.
    pub byte: u8,

    /// The byte decoded as a character, for display.
    pub ch: char,

    /// Node the automaton is on after consuming this byte.
    pub node: NodeId,

    /// Patterns recognized at that node, original spelling.
    pub outputs: Vec<String>,
}

/// Result of a full scan: every occurrence plus the per-byte trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub matches: Vec<PatternMatch>,
    pub steps: Vec<ScanStep>,
}

/// Scans payloads against a built [`Automaton`].
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    automaton: &'a Automaton,
}

impl<'a> Scanner<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self { automaton }
    }

    /// Scan a payload, reporting every distinct (pattern, position)
    /// occurrence and one [`ScanStep`] per byte.
    ///
    /// Payload bytes are case-folded the same way patterns were at build
    /// time. A pattern occurring at several positions is reported at each
    /// of them; within one position each pattern appears once.
    pub fn scan(&self, payload: &[u8]) -> ScanReport {
        let mut report = ScanReport {
            matches: Vec::new(),
            steps: Vec::with_capacity(payload.len()),
        };
        let mut node = ROOT;

        for (i, &raw) in payload.iter().enumerate() {
            node = self.automaton.next_state(node, raw.to_ascii_lowercase());

            let outputs = self.automaton.outputs(node);
            for &pid in outputs {
                let pattern = self.automaton.pattern(pid);
                // i + 1 - len cannot underflow for a pattern that ends at
                // i; clamp anyway.
                report.matches.push(PatternMatch {
                    pattern: pattern.to_string(),
                    position: (i + 1).saturating_sub(pattern.len()),
                });
            }

            report.steps.push(ScanStep {
                byte: raw,
                ch: raw as char,
                node,
                outputs: outputs
                    .iter()
                    .map(|&pid| self.automaton.pattern(pid).to_string())
                    .collect(),
            });
        }

        report
    }

    /// Whether the payload contains any pattern occurrence.
    ///
    /// Short-circuits at the first non-empty output set; the result always
    /// equals `!self.scan(payload).matches.is_empty()`.
    pub fn has_match(&self, payload: &[u8]) -> bool {
        let mut node = ROOT;
        for &raw in payload {
            node = self.automaton.next_state(node, raw.to_ascii_lowercase());
            if !self.automaton.outputs(node).is_empty() {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutomatonBuilder;

    fn scan(patterns: &[&str], payload: &[u8]) -> ScanReport {
        let automaton = AutomatonBuilder::new()
            .add_patterns(patterns.iter().copied())
            .build();
        Scanner::new(&automaton).scan(payload)
    }

    /// Brute-force oracle: every case-insensitive occurrence of every
    /// pattern, as (pattern, start) pairs.
    fn oracle(patterns: &[&str], payload: &[u8]) -> Vec<PatternMatch> {
        let folded: Vec<u8> = payload.iter().map(|b| b.to_ascii_lowercase()).collect();
        let mut expected = Vec::new();
        for pattern in patterns {
            let needle: Vec<u8> = pattern.bytes().map(|b| b.to_ascii_lowercase()).collect();
            if needle.is_empty() {
                continue;
            }
            for start in 0..folded.len().saturating_sub(needle.len() - 1) {
                if folded[start..start + needle.len()] == needle[..] {
                    expected.push(PatternMatch {
                        pattern: pattern.to_string(),
                        position: start,
                    });
                }
            }
        }
        expected
    }

    fn sorted(mut matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
        matches.sort_by(|a, b| (a.position, &a.pattern).cmp(&(b.position, &b.pattern)));
        matches
    }

    #[test]
    fn test_overlapping_patterns_both_reported() {
        // "ir" is a substring of "virus"; both occurrences surface.
        let report = scan(&["virus", "ir"], b"a virus b");

        assert!(report.matches.contains(&PatternMatch {
            pattern: "ir".to_string(),
            position: 3,
        }));
        assert!(report.matches.contains(&PatternMatch {
            pattern: "virus".to_string(),
            position: 2,
        }));
    }

    #[test]
    fn test_match_reports_original_spelling() {
        let report = scan(
            &["DROP TABLE", "UNION SELECT"],
            b"id=1 UNION SELECT * FROM t",
        );

        assert_eq!(
            report.matches,
            vec![PatternMatch {
                pattern: "UNION SELECT".to_string(),
                position: 5,
            }]
        );
    }

    #[test]
    fn test_case_insensitive_matching() {
        let report = scan(&["union select"], b"id=1 UnIoN SeLeCt 1,2");
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].position, 5);
    }

    #[test]
    fn test_repeated_occurrences_reported_each_position() {
        let report = scan(&["ab"], b"ababab");
        let positions: Vec<usize> = report.matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
    }

    #[test]
    fn test_one_step_per_byte() {
        let report = scan(&["ir"], b"virus");
        assert_eq!(report.steps.len(), 5);
        assert_eq!(report.steps[0].byte, b'v');
        assert_eq!(report.steps[0].ch, 'v');

        // The step at the end of "ir" carries it in its output set.
        assert_eq!(report.steps[2].outputs, vec!["ir".to_string()]);
    }

    #[test]
    fn test_empty_payload_yields_nothing() {
        let report = scan(&["virus"], b"");
        assert!(report.matches.is_empty());
        assert!(report.steps.is_empty());
    }

    #[test]
    fn test_empty_pattern_set_never_matches() {
        let report = scan(&[], b"any payload at all");
        assert!(report.matches.is_empty());
        assert_eq!(report.steps.len(), 18);
    }

    #[test]
    fn test_has_match_agrees_with_scan() {
        let automaton = AutomatonBuilder::new()
            .add_patterns(["virus", "worm", "trojan"])
            .build();
        let scanner = Scanner::new(&automaton);

        for payload in [
            &b"clean traffic"[..],
            b"a virus b",
            b"WORMhole",
            b"tro",
            b"",
            b"trojan horse",
        ] {
            assert_eq!(
                scanner.has_match(payload),
                !scanner.scan(payload).matches.is_empty(),
                "disagreement on {:?}",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn test_matches_equal_brute_force_oracle() {
        let cases: &[(&[&str], &[u8])] = &[
            (&["he", "she", "his", "hers"], b"ushers and his heirs"),
            (&["aa", "aaa"], b"aaaaaa"),
            (&["virus", "ir", "rus"], b"a virus b virus"),
            (&["GET", "POST"], b"GET /index HTTP/1.1"),
            (&["xyz"], b"no occurrences here"),
        ];

        for (patterns, payload) in cases {
            let report = scan(patterns, payload);
            assert_eq!(
                sorted(report.matches),
                sorted(oracle(patterns, payload)),
                "oracle mismatch for {:?}",
                String::from_utf8_lossy(payload)
            );
        }
    }
}
