// Shrike Signatures - signature-set loading and compilation
//!
// This crate loads categorized signature files and compiles them into the
// matching automaton. A signature file is a JSON object mapping category
// names to pattern lists:
//
// ```json
// {
//     "sql_injection": ["UNION SELECT", "DROP TABLE"],
//     "xss": ["<script>", "onerror="]
// }
// ```
//
// Categories exist for operators; the automaton itself matches the
// flattened pattern list. Flattening is deterministic (category order,
// then file order within a category), so compiling the same file twice
// yields structurally identical automata.

use serde::{Deserialize, Serialize};
use shrike_automaton::{Automaton, AutomatonBuilder};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading a signature set.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Failed to read signature file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse signature file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for signature operations
pub type SignatureResult<T> = Result<T, SignatureError>;

/// An ordered set of signature patterns grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureSet {
    categories: BTreeMap<String, Vec<String>>,
}

impl SignatureSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a signature set from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SignatureResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let set = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            categories = set.categories.len(),
            patterns = set.len(),
            "Loaded signature set"
        );
        Ok(set)
    }

    /// Load a signature set from any reader.
    pub fn from_reader(reader: impl Read) -> SignatureResult<Self> {
        let set: Self = serde_json::from_reader(reader)?;
        for (category, patterns) in &set.categories {
            debug!(category = %category, patterns = patterns.len(), "Signature category");
        }
        Ok(set)
    }

    /// Parse a signature set from a JSON string.
    pub fn from_str(json: &str) -> SignatureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a pattern under a category, creating the category as needed.
    pub fn add(&mut self, category: impl Into<String>, pattern: impl Into<String>) {
        self.categories
            .entry(category.into())
            .or_default()
            .push(pattern.into());
    }

    /// Category names in order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Patterns of one category, if it exists.
    pub fn patterns(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Total number of patterns across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to one ordered pattern list: category order, then file
    /// order within a category.
    pub fn flatten(&self) -> Vec<String> {
        self.categories
            .values()
            .flat_map(|patterns| patterns.iter().cloned())
            .collect()
    }

    /// Compile the flattened pattern list into a matching automaton.
    pub fn compile(&self) -> Automaton {
        AutomatonBuilder::new().add_patterns(self.flatten()).build()
    }
}
