// Shrike PDA - HTTP Structural Validation
//!
// This crate decides whether a byte stream is a structurally well-formed
// HTTP request using a pushdown automaton: a finite-state machine over the
// request grammar (request line, headers, body) augmented with an explicit
// symbol stack that enforces the nesting a plain finite automaton cannot
// express.
//
// ## Overview
//
// A `HttpValidator` consumes one message character by character and yields
// a three-valued verdict:
//
// - `Valid`      - every rule held and the stack fully reduced
// - `Invalid`    - a character or stack-discipline rule was violated
// - `Incomplete` - no violation yet, but the message is not finished
//
// Alongside the verdict it produces the extracted headers and a full
// execution trace (one entry per character consumed and per stack action,
// epsilon actions included). The trace is the only observable side effect
// and is the replay contract external visualizers depend on.
//
// ## Stack discipline
//
// Markers are pushed on entering a grammar construct and popped only in the
// correct order on leaving it:
//
// ```text
// $            stack bottom
// HTTP         whole message       (pushed at start, popped at end of input)
// REQ_LINE     request line        (method validated .. CRLF)
// HEADERS      header section      (request-line CRLF .. blank line)
// H            one header line
// CR           a pending \r awaiting its \n
// BODY         declared-length body
// ```
//
// At acceptance the stack must be exactly `[$]`; a pop of a wrong or absent
// marker is never an internal fault, it is an `Invalid` verdict with a
// descriptive trace entry.

mod state;
mod trace;
mod validator;

pub use state::{PdaState, StackSymbol};
pub use trace::{TraceEntry, ValidationReport, Verdict};
pub use validator::HttpValidator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_valid_request() {
        let mut validator = HttpValidator::new();
        let report = validator.validate(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(report.verdict, Verdict::Valid);
        assert!(report.headers.is_empty());
    }

    #[test]
    fn test_reset_allows_reuse() {
        let mut validator = HttpValidator::new();
        assert_eq!(validator.validate(b"junk").verdict, Verdict::Invalid);

        validator.reset();
        let report = validator.validate(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(report.verdict, Verdict::Valid);
    }
}
