//! Strategy detail lookup
//!
//! Every recommendation text resolves to a [`StrategyDetails`]:
//! - Known texts map through an index to a stable [`StrategyId`]
//! - Unknown texts get a synthesized default, so lookup is total

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

const BUILTIN_STRATEGIES: &str = include_str!("../data/strategies.json");

/// Confidence assigned to strategies with no table entry
pub const DEFAULT_CONFIDENCE: f64 = 90.0;

/// Characters of the input kept in a synthesized title
pub const FALLBACK_TITLE_CHARS: usize = 50;

const FALLBACK_HOW_IT_WORKS: &str =
    "AI-powered strategy based on historical incident data and predictive analytics.";
const FALLBACK_RESOLUTION_PATH: [&str; 4] = [
    "Analyze current state",
    "Deploy automated remediation",
    "Validate results",
    "Confirm resolution",
];
const FALLBACK_IMPACT: &str = "Expected positive impact on system recovery.";
const FALLBACK_MITIGATION: &str = "Standard rollback procedures in place.";

/// Stable strategy identifier, independent of recommendation wording
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyId(String);

impl StrategyId {
    /// Create from a slug
    #[inline]
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deep-dive metadata for a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDetails {
    /// Short title
    pub title: String,
    /// Confidence, percent (0-100)
    pub confidence: f64,
    /// Mechanism explanation
    pub how_it_works: String,
    /// Ordered resolution steps
    pub resolution_path: Vec<String>,
    /// Expected outcome
    pub estimated_impact: String,
    /// Safeguards
    pub risk_mitigation: String,
}

impl StrategyDetails {
    /// Default record for a recommendation with no table entry
    #[must_use]
    pub fn fallback(text: &str) -> Self {
        let mut title: String = text.chars().take(FALLBACK_TITLE_CHARS).collect();
        title.push_str("...");
        Self {
            title,
            confidence: DEFAULT_CONFIDENCE,
            how_it_works: FALLBACK_HOW_IT_WORKS.to_string(),
            resolution_path: FALLBACK_RESOLUTION_PATH.iter().map(|s| (*s).to_string()).collect(),
            estimated_impact: FALLBACK_IMPACT.to_string(),
            risk_mitigation: FALLBACK_MITIGATION.to_string(),
        }
    }
}

/// One strategy: id, the recommendation texts that name it, and its details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEntry {
    /// Stable id
    pub id: StrategyId,
    /// Recommendation texts resolving to this entry
    pub texts: Vec<String>,
    /// Details
    #[serde(flatten)]
    pub details: StrategyDetails,
}

/// Lookup table from recommendation text to strategy details
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    entries: Vec<StrategyEntry>,
    by_text: HashMap<String, usize>,
    by_id: HashMap<StrategyId, usize>,
}

impl StrategyTable {
    /// Table compiled into the crate
    ///
    /// # Errors
    /// Only if the embedded document is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_STRATEGIES)
    }

    /// Parse a JSON array of [`StrategyEntry`]
    ///
    /// # Errors
    /// - `CatalogError::Json` on malformed input
    /// - `CatalogError::DuplicateStrategyId` / `AmbiguousStrategyText` on bad indexes
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let entries: Vec<StrategyEntry> = serde_json::from_str(source)?;
        Self::from_entries(entries)
    }

    /// Build from entries, indexing every text and id
    ///
    /// # Errors
    /// - `CatalogError::DuplicateStrategyId` if two entries share an id
    /// - `CatalogError::AmbiguousStrategyText` if one text names two entries
    pub fn from_entries(entries: Vec<StrategyEntry>) -> Result<Self, CatalogError> {
        let mut by_text = HashMap::new();
        let mut by_id = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateStrategyId(entry.id.to_string()));
            }
            for text in &entry.texts {
                if by_text.insert(text.clone(), idx).is_some() {
                    return Err(CatalogError::AmbiguousStrategyText(text.clone()));
                }
            }
        }
        Ok(Self {
            entries,
            by_text,
            by_id,
        })
    }

    /// Resolve a recommendation text to its stable id, if known
    #[must_use]
    pub fn id_for(&self, text: &str) -> Option<&StrategyId> {
        self.by_text.get(text).map(|&idx| &self.entries[idx].id)
    }

    /// Details by stable id
    #[must_use]
    pub fn by_id(&self, id: &StrategyId) -> Option<&StrategyDetails> {
        self.by_id.get(id).map(|&idx| &self.entries[idx].details)
    }

    /// Exact-text lookup, no fallback
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<&StrategyDetails> {
        self.id_for(text).and_then(|id| self.by_id(id))
    }

    /// Details for any text; synthesizes a default on miss
    #[must_use]
    pub fn details(&self, text: &str) -> Cow<'_, StrategyDetails> {
        match self.lookup(text) {
            Some(found) => Cow::Borrowed(found),
            None => {
                tracing::debug!(text, "strategy lookup miss; using default details");
                Cow::Owned(StrategyDetails::fallback(text))
            }
        }
    }

    /// Confidence for any text, [`DEFAULT_CONFIDENCE`] on miss
    #[must_use]
    pub fn confidence(&self, text: &str) -> f64 {
        self.lookup(text).map_or(DEFAULT_CONFIDENCE, |d| d.confidence)
    }

    /// All entries, table order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
