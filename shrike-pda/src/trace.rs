// Trace and report types for the HTTP validator

use crate::state::{PdaState, StackSymbol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of validating one HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Every rule held and the symbol stack fully reduced.
    Valid,

    /// A character-level or stack-discipline rule was violated. Terminal;
    /// no resynchronization is attempted.
    Invalid,

    /// No violation occurred yet, but the message is not finished - more
    /// bytes could still complete it.
    Incomplete,
}

/// One entry in the validator's execution trace.
///
/// An entry is appended for every character consumed and for every stack
/// push or pop, including epsilon (stack-only) actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Control state when the entry was recorded.
    pub state: PdaState,

    /// The input character, or `None` for an epsilon action.
    pub input: Option<char>,

    /// Stack top after the action, `None` only if the stack is empty.
    pub stack_top: Option<StackSymbol>,

    /// Short human-readable description of the action.
    pub action: String,

    /// Byte position in the original message.
    pub position: usize,
}

/// Full result of [`HttpValidator::validate`](crate::HttpValidator::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Three-valued verdict.
    pub verdict: Verdict,

    /// Ordered execution trace.
    pub trace: Vec<TraceEntry>,

    /// Lowercased header name to trimmed value, frozen once the verdict is
    /// terminal.
    pub headers: HashMap<String, String>,
}
