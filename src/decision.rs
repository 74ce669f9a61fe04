//! Domain types for interactive conversion decisions.
//!
//! A `Decision` is a point of structural or semantic ambiguity the resolver
//! cannot settle on its own — it carries an ordered set of candidate
//! `OptionValue`s and the user picks one. Decisions are immutable once
//! issued; the client only records a `Resolution` against them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of ambiguity that can arise during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    AttributeMapping,
    StructureChoice,
    MetadataResolution,
    FormatSpecific,
    AmbiguousNotation,
    MissingInformation,
}

/// One candidate resolution value for a decision.
///
/// Either a primitive scalar or a structured mapping of named sub-values
/// (e.g. `{articulation: "staccato", voice: 2}`). Equality is structural,
/// field by field — never display-string equality. A `BTreeMap` keeps the
/// structured form canonically ordered so a round trip through JSON
/// preserves semantic content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Structured(BTreeMap<String, OptionValue>),
}

impl OptionValue {
    /// Build a structured option from named sub-values.
    pub fn structured<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: Into<String>,
    {
        Self::Structured(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::Structured(map) => {
                let fields: Vec<String> =
                    map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A decision point issued by the remote resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DecisionType,
    pub description: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    pub options: Vec<OptionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_option: Option<OptionValue>,
}

/// The act of choosing one option for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub decision_id: String,
    pub choice: OptionValue,
    /// Hint asking the resolver to remember this choice for similar future
    /// ambiguities. Forwarded verbatim; its effect is server-side only.
    pub save_preference: bool,
}

impl Resolution {
    pub fn new(decision_id: impl Into<String>, choice: OptionValue) -> Self {
        Self {
            decision_id: decision_id.into(),
            choice,
            save_preference: false,
        }
    }

    pub fn with_save_preference(mut self, save: bool) -> Self {
        self.save_preference = save;
        self
    }
}

/// One resolved decision as recorded in the audit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub decision_id: String,
    pub choice: OptionValue,
    pub resolved_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(decision_id: impl Into<String>, choice: OptionValue) -> Self {
        Self {
            decision_id: decision_id.into(),
            choice,
            resolved_at: Utc::now(),
        }
    }
}

/// The converted document in the target schema, with the optional
/// evaluation report the resolver attaches when its evaluator is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Value>,
}

impl Artifact {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            evaluation: None,
        }
    }
}
