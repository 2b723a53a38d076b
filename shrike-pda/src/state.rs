// PDA states and stack symbols

use serde::{Deserialize, Serialize};
use std::fmt;

/// Control state of the HTTP validator.
///
/// `Accept` and `Error` are terminal; every other state names the grammar
/// position the next input character is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PdaState {
    Start,
    Method,
    Sp1,
    Uri,
    Sp2,
    Version,
    RequestLineCr,
    Headers,
    HeaderName,
    HeaderColon,
    HeaderValue,
    HeaderCr,
    Body,
    Accept,
    Error,
}

impl PdaState {
    /// Whether the machine halts in this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PdaState::Accept | PdaState::Error)
    }
}

impl fmt::Display for PdaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PdaState::Start => "START",
            PdaState::Method => "METHOD",
            PdaState::Sp1 => "SP1",
            PdaState::Uri => "URI",
            PdaState::Sp2 => "SP2",
            PdaState::Version => "VERSION",
            PdaState::RequestLineCr => "REQUEST_LINE_CR",
            PdaState::Headers => "HEADERS",
            PdaState::HeaderName => "HEADER_NAME",
            PdaState::HeaderColon => "HEADER_COLON",
            PdaState::HeaderValue => "HEADER_VALUE",
            PdaState::HeaderCr => "HEADER_CR",
            PdaState::Body => "BODY",
            PdaState::Accept => "ACCEPT",
            PdaState::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Marker on the validator's symbol stack.
///
/// The nesting of markers encodes which grammar production is currently
/// open. `Bottom` is pushed first and must be the only symbol left when a
/// message is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackSymbol {
    #[serde(rename = "$")]
    Bottom,
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "REQ_LINE")]
    ReqLine,
    #[serde(rename = "HEADERS")]
    Headers,
    #[serde(rename = "H")]
    Header,
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "BODY")]
    Body,
}

impl fmt::Display for StackSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StackSymbol::Bottom => "$",
            StackSymbol::Http => "HTTP",
            StackSymbol::ReqLine => "REQ_LINE",
            StackSymbol::Headers => "HEADERS",
            StackSymbol::Header => "H",
            StackSymbol::Cr => "CR",
            StackSymbol::Body => "BODY",
        };
        write!(f, "{}", name)
    }
}
