//! Identifier normalization
//!
//! Entity ids, node tags and relation kinds arrive as free text in the
//! extracted records. Everything here is a pure function of its input so the
//! same raw string always lands on the same graph identity, whichever record
//! or run introduced it.

use graft_config::{is_valid_identifier, NormalizeConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Canonical entity id: trimmed, lower-cased, internal whitespace runs
/// collapsed to a single underscore.
///
/// ```
/// use graft_core::normalize_id;
///
/// assert_eq!(normalize_id("Omid Panahi"), "omid_panahi");
/// assert_eq!(normalize_id("omid_panahi"), "omid_panahi");
/// assert_eq!(normalize_id("  Omid   Panahi "), "omid_panahi");
/// ```
pub fn normalize_id(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Keep only alphanumeric characters and underscores
pub fn sanitize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Word-wise title case: a letter following a non-letter is upper-cased, every
/// other letter is lower-cased. `funding_source` becomes `Funding_Source`,
/// `SYSTEM` becomes `System`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_alpha = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

fn starts_like_identifier(token: &str) -> bool {
    token.starts_with(|c: char| c.is_alphabetic() || c == '_')
}

/// A node tag that is safe to hand to the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Fixed tag on every document node
    pub const DOCUMENT: &'static str = "Document";
    /// Fixed tag on every chunk node
    pub const CHUNK: &'static str = "Chunk";
    /// Structural tag on chunks whose content type is `table`
    pub const TABLE: &'static str = "Table";
    /// Fixed tag on every entity node
    pub const ENTITY: &'static str = "Entity";
    /// Tag used when a record gives no usable label
    pub const UNKNOWN: &'static str = "Unknown";

    /// Accept an already-clean tag, rejecting anything that is not an identifier
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        is_valid_identifier(&value).then_some(Self(value))
    }

    /// Derive a tag from raw record text: sanitize, title-case, then apply the
    /// override table.
    pub fn from_raw(raw: &str, overrides: &LabelOverrides) -> Self {
        let mut cased = title_case(&sanitize_token(raw));
        if cased.is_empty() {
            cased = Self::UNKNOWN.to_string();
        }

        if let Some(replacement) = overrides.get(&cased) {
            return replacement.clone();
        }

        if !starts_like_identifier(&cased) {
            cased.insert_str(0, "L_");
        }
        Self(cased)
    }

    pub(crate) fn fixed(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An edge type token: upper-case alphanumerics and underscores
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RelationKind(String);

impl RelationKind {
    /// Edge from a chunk to its document
    pub const PART_OF: &'static str = "PART_OF";
    /// Used when the raw relation type sanitizes to nothing
    pub const RELATED_TO: &'static str = "RELATED_TO";

    /// Derive a relation kind from the raw `type` of an extracted edge
    pub fn from_raw(raw: &str) -> Self {
        let mut kind = sanitize_token(raw).to_uppercase();
        if kind.is_empty() {
            return Self(Self::RELATED_TO.to_string());
        }
        if !starts_like_identifier(&kind) {
            kind.insert_str(0, "R_");
        }
        Self(kind)
    }

    /// The chunk to document edge kind
    pub fn part_of() -> Self {
        Self(Self::PART_OF.to_string())
    }

    /// Kind text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{title-cased label -> final label}` corrections applied after casing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelOverrides(BTreeMap<String, Label>);

impl LabelOverrides {
    /// Build from configuration, dropping entries whose target is not a valid tag
    pub fn from_config(config: &NormalizeConfig) -> Self {
        let mut map = BTreeMap::new();
        for (from, to) in &config.label_overrides {
            match Label::new(to.clone()) {
                Some(label) => {
                    map.insert(from.clone(), label);
                }
                None => warn!(from = %from, to = %to, "Ignoring label override with invalid target"),
            }
        }
        Self(map)
    }

    /// Replacement for a title-cased label, if configured
    pub fn get(&self, label: &str) -> Option<&Label> {
        self.0.get(label)
    }

    /// Number of configured overrides
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no overrides are configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
