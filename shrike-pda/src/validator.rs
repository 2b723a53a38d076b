// HTTP request validator - character-driven PDA execution
//
// One instance owns the mutable state (stack, trace, headers, accumulators)
// for exactly one message. Create a fresh instance per message or call
// `reset()` before reuse; never share an instance across concurrent
// validations.

use crate::state::{PdaState, StackSymbol};
use crate::trace::{TraceEntry, ValidationReport, Verdict};
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use tracing::trace;

/// HTTP methods accepted in the request line.
const METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "TRACE", "CONNECT", "PATCH",
];

fn is_method_char(byte: u8) -> bool {
    byte.is_ascii_uppercase()
}

fn is_uri_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'/' | b'.' | b'_' | b'?' | b'=' | b'&' | b'%' | b'-')
}

fn is_version_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'/')
}

/// Structural validator for HTTP request messages.
///
/// Consumes a complete message (CRLF line terminators) character by
/// character and yields a [`ValidationReport`]: a three-valued verdict, the
/// extracted headers, and the full execution trace. Any character-level
/// rule violation is immediately `Invalid` and consumption stops; an
/// unterminated but consistent message is `Incomplete`.
#[derive(Debug)]
pub struct HttpValidator {
    state: PdaState,
    stack: SmallVec<[StackSymbol; 8]>,
    trace: Vec<TraceEntry>,
    headers: HashMap<String, String>,

    method: String,
    header_name: String,
    header_value: String,

    /// Stack top remembered when a CR is pushed in HEADERS, to recognize
    /// the blank line (second consecutive CRLF with nothing pushed between).
    top_before_cr: Option<StackSymbol>,

    /// Declared Content-Length, set once at end of headers.
    content_length: Option<u64>,
    body_consumed: u64,

    /// Byte position of the character being processed, for trace entries.
    position: usize,
}

impl Default for HttpValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpValidator {
    pub fn new() -> Self {
        Self {
            state: PdaState::Start,
            stack: SmallVec::new(),
            trace: Vec::new(),
            headers: HashMap::new(),
            method: String::new(),
            header_name: String::new(),
            header_value: String::new(),
            top_before_cr: None,
            content_length: None,
            body_consumed: 0,
            position: 0,
        }
    }

    /// Clear all per-message state so the instance can validate another
    /// message.
    pub fn reset(&mut self) {
        self.state = PdaState::Start;
        self.stack.clear();
        self.trace.clear();
        self.headers.clear();
        self.method.clear();
        self.header_name.clear();
        self.header_value.clear();
        self.top_before_cr = None;
        self.content_length = None;
        self.body_consumed = 0;
        self.position = 0;
    }

    /// Validate one complete message.
    pub fn validate(&mut self, message: &[u8]) -> ValidationReport {
        self.reset();

        // The bottom and HTTP markers go on unconditionally, even for empty
        // input, so trace and stack state stay consistent for diagnostics.
        self.stack = smallvec![StackSymbol::Bottom];
        self.log_epsilon("stack bottom (push $)");
        self.push(StackSymbol::Http, "message open");

        // Leading whitespace before the method is tolerated.
        let offset = message
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(message.len());
        if offset == message.len() {
            self.reject_epsilon("empty message");
            return self.report(Verdict::Invalid);
        }

        for (i, &byte) in message.iter().enumerate().skip(offset) {
            self.position = i;
            self.step(byte);
            if self.state == PdaState::Error {
                return self.report(Verdict::Invalid);
            }
        }

        self.position = message.len();
        let verdict = self.finish();
        self.report(verdict)
    }

    /// Consume one input character in the current state.
    fn step(&mut self, byte: u8) {
        let ch = byte as char;

        match self.state {
            PdaState::Start => {
                if is_method_char(byte) {
                    self.state = PdaState::Method;
                    self.method.push(ch);
                    self.log_input(ch, "begin method");
                } else {
                    self.reject(ch, "expected method");
                }
            }

            PdaState::Method => {
                if is_method_char(byte) {
                    self.method.push(ch);
                    self.log_input(ch, "method char");
                } else if byte == b' ' {
                    if METHODS.contains(&self.method.as_str()) {
                        self.log_input(ch, format!("method {} recognized", self.method));
                        self.push(StackSymbol::ReqLine, "request line open");
                        self.state = PdaState::Sp1;
                    } else {
                        self.reject(ch, format!("unknown method {}", self.method));
                    }
                } else {
                    self.reject(ch, "invalid method char");
                }
            }

            PdaState::Sp1 => {
                if is_uri_char(byte) {
                    self.state = PdaState::Uri;
                    self.log_input(ch, "begin uri");
                } else {
                    self.reject(ch, "expected uri");
                }
            }

            PdaState::Uri => {
                if is_uri_char(byte) {
                    self.log_input(ch, "uri char");
                } else if byte == b' ' {
                    self.state = PdaState::Sp2;
                    self.log_input(ch, "uri complete");
                } else {
                    self.reject(ch, "invalid uri char");
                }
            }

            PdaState::Sp2 => {
                if is_version_char(byte) {
                    self.state = PdaState::Version;
                    self.log_input(ch, "begin version");
                } else {
                    self.reject(ch, "expected version");
                }
            }

            PdaState::Version => {
                if is_version_char(byte) {
                    self.log_input(ch, "version char");
                } else if byte == b'\r' {
                    self.log_input(ch, "version complete");
                    self.push(StackSymbol::Cr, "line terminator open");
                    self.state = PdaState::RequestLineCr;
                } else {
                    self.reject(ch, "invalid version char");
                }
            }

            PdaState::RequestLineCr => {
                if byte == b'\n' {
                    self.log_input(ch, "request line complete");
                    if !self.pop_expect(StackSymbol::Cr, "line terminator close") {
                        return;
                    }
                    if !self.pop_expect(StackSymbol::ReqLine, "request line close") {
                        return;
                    }
                    self.push(StackSymbol::Headers, "header section open");
                    self.state = PdaState::Headers;
                } else {
                    self.reject(ch, "expected LF after CR");
                }
            }

            PdaState::Headers => {
                // A pending CR admits only its LF.
                if self.stack.last() == Some(&StackSymbol::Cr) && byte != b'\n' {
                    self.reject(ch, "expected LF after CR");
                    return;
                }

                match byte {
                    b'\r' => {
                        self.top_before_cr = self.stack.last().copied();
                        self.log_input(ch, "header section CR");
                        self.push(StackSymbol::Cr, "line terminator open");
                    }
                    b'\n' => {
                        self.log_input(ch, "header section LF");
                        if !self.pop_expect(StackSymbol::Cr, "line terminator close") {
                            return;
                        }
                        if self.top_before_cr == Some(StackSymbol::Headers) {
                            // Blank line: nothing was pushed since the
                            // previous line ended.
                            if !self.pop_expect(StackSymbol::Headers, "header section close") {
                                return;
                            }
                            self.end_of_headers();
                        }
                    }
                    b if b.is_ascii_alphabetic() => {
                        self.push(StackSymbol::Header, "header open");
                        self.header_name.clear();
                        self.header_value.clear();
                        self.header_name.push(ch.to_ascii_lowercase());
                        self.log_input(ch, "begin header name");
                        self.state = PdaState::HeaderName;
                    }
                    _ => self.reject(ch, "invalid header start"),
                }
            }

            PdaState::HeaderName => {
                if byte == b':' {
                    let trimmed = self.header_name.trim_end().to_string();
                    self.header_name = trimmed;
                    self.log_input(ch, "header name complete");
                    self.state = PdaState::HeaderColon;
                } else if byte.is_ascii_alphanumeric() || byte == b'-' {
                    self.header_name.push(ch.to_ascii_lowercase());
                    self.log_input(ch, "header name char");
                } else {
                    self.reject(ch, "invalid header name char");
                }
            }

            PdaState::HeaderColon => {
                if byte == b' ' {
                    self.log_input(ch, "skip space");
                } else if byte == b'\r' {
                    self.header_value.clear();
                    self.log_input(ch, "empty header value");
                    self.push(StackSymbol::Cr, "line terminator open");
                    self.state = PdaState::HeaderCr;
                } else {
                    self.header_value.push(ch);
                    self.log_input(ch, "begin header value");
                    self.state = PdaState::HeaderValue;
                }
            }

            PdaState::HeaderValue => {
                if byte == b'\r' {
                    self.log_input(ch, "header value complete");
                    self.push(StackSymbol::Cr, "line terminator open");
                    self.state = PdaState::HeaderCr;
                } else {
                    self.header_value.push(ch);
                    self.log_input(ch, "header value char");
                }
            }

            PdaState::HeaderCr => {
                if byte == b'\n' {
                    self.log_input(ch, "header line complete");
                    if !self.pop_expect(StackSymbol::Cr, "line terminator close") {
                        return;
                    }
                    let name = self.header_name.clone();
                    let value = self.header_value.trim_end_matches([' ', '\t']).to_string();
                    self.log_epsilon(format!("store header {} = {:?}", name, value));
                    self.headers.insert(name, value);
                    if !self.pop_expect(StackSymbol::Header, "header close") {
                        return;
                    }
                    self.state = PdaState::Headers;
                } else {
                    self.reject(ch, "expected LF after CR in header");
                }
            }

            PdaState::Body => match self.content_length {
                Some(expected) => {
                    if self.body_consumed == expected {
                        self.reject(ch, "byte past declared body length");
                    } else {
                        self.body_consumed += 1;
                        self.log_input(
                            ch,
                            format!("body byte {}/{}", self.body_consumed, expected),
                        );
                        if self.body_consumed == expected {
                            self.pop_expect(StackSymbol::Body, "body complete");
                        }
                    }
                }
                None => {
                    self.body_consumed += 1;
                    self.log_input(ch, "body byte (unknown length)");
                }
            },

            // Terminal states consume nothing; the caller stops the loop.
            PdaState::Accept | PdaState::Error => {}
        }
    }

    /// Close the header section, exactly once per message: resolve the
    /// declared body length and move to body handling.
    fn end_of_headers(&mut self) {
        let declared = self.headers.get("content-length").cloned();
        match declared {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) => {
                    self.content_length = Some(n);
                    if n > 0 {
                        self.push(StackSymbol::Body, "body open");
                    }
                    self.log_epsilon(format!("headers complete, body length {}", n));
                    self.state = PdaState::Body;
                }
                Err(_) => {
                    self.reject_epsilon(format!("malformed content-length {:?}", raw));
                }
            },
            None => {
                self.log_epsilon("headers complete, no declared body length");
                self.state = PdaState::Body;
            }
        }
    }

    /// Compute the final verdict once input is exhausted.
    fn finish(&mut self) -> Verdict {
        match self.state {
            PdaState::Body => {
                if let Some(expected) = self.content_length {
                    if self.body_consumed < expected {
                        self.log_epsilon(format!(
                            "end of input at body byte {}/{}",
                            self.body_consumed, expected
                        ));
                        return Verdict::Incomplete;
                    }
                }

                if !self.pop_expect(StackSymbol::Http, "message close") {
                    return Verdict::Invalid;
                }
                if self.stack.as_slice() == [StackSymbol::Bottom] {
                    self.state = PdaState::Accept;
                    self.log_epsilon("accept");
                    Verdict::Valid
                } else {
                    self.reject_epsilon("stack not reduced at end of input");
                    Verdict::Invalid
                }
            }

            // Structure still open: more bytes could complete the message.
            _ => {
                self.log_epsilon("end of input before message complete");
                Verdict::Incomplete
            }
        }
    }

    fn report(&self, verdict: Verdict) -> ValidationReport {
        if verdict == Verdict::Invalid {
            trace!(position = self.position, "message rejected");
        }
        ValidationReport {
            verdict,
            trace: self.trace.clone(),
            headers: self.headers.clone(),
        }
    }

    fn push(&mut self, symbol: StackSymbol, action: &str) {
        self.stack.push(symbol);
        self.log_epsilon(format!("{} (push {})", action, symbol));
    }

    /// Pop `expected` off the stack top. A wrong or absent top is an
    /// `Invalid` verdict with a descriptive trace entry, never a fault.
    fn pop_expect(&mut self, expected: StackSymbol, action: &str) -> bool {
        match self.stack.last() {
            Some(&top) if top == expected => {
                self.stack.pop();
                self.log_epsilon(format!("{} (pop {})", action, expected));
                true
            }
            Some(&top) => {
                self.reject_epsilon(format!(
                    "{} (pop {} failed, top is {})",
                    action, expected, top
                ));
                false
            }
            None => {
                self.reject_epsilon(format!("{} (pop {} failed, stack empty)", action, expected));
                false
            }
        }
    }

    fn reject(&mut self, ch: char, reason: impl Into<String>) {
        self.log_input(ch, reason);
        self.state = PdaState::Error;
    }

    fn reject_epsilon(&mut self, reason: impl Into<String>) {
        self.log_epsilon(reason);
        self.state = PdaState::Error;
    }

    fn log_input(&mut self, ch: char, action: impl Into<String>) {
        self.log(Some(ch), action.into());
    }

    fn log_epsilon(&mut self, action: impl Into<String>) {
        self.log(None, action.into());
    }

    fn log(&mut self, input: Option<char>, action: String) {
        self.trace.push(TraceEntry {
            state: self.state,
            input,
            stack_top: self.stack.last().copied(),
            action,
            position: self.position,
        });
    }
}
