//! Ordered classification levels with rank comparison.
//!
//! The scale is a total order of level names (`U < CUI < C < S < TS` by
//! default). Every level used anywhere in the system must resolve to a rank;
//! an unknown label is a configuration error, never a silent default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A classification label that is not on the configured scale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("classification '{label}' is not on the configured scale")]
pub struct InvalidClassification {
    /// The offending label, as normalized before lookup.
    pub label: String,
}

impl InvalidClassification {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// An ordered enumeration of sensitivity levels.
///
/// Levels are stored lowest-first; a level's rank is its position in the
/// sequence. Lookups normalize case and surrounding whitespace, so `"ts"`
/// and `" TS "` both resolve to the rank of `TS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationScale {
    levels: Vec<String>,
}

impl Default for ClassificationScale {
    /// The U.S. classification ladder used by the reference deployment.
    fn default() -> Self {
        Self::new(["U", "CUI", "C", "S", "TS"])
    }
}

impl ClassificationScale {
    /// Creates a scale from levels ordered lowest to highest.
    ///
    /// # Panics
    ///
    /// Panics if `levels` is empty or contains duplicates after
    /// normalization. Scales are deployment configuration; a malformed scale
    /// is a programming error, not a runtime condition.
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<String> = levels
            .into_iter()
            .map(|l| l.into().trim().to_uppercase())
            .collect();
        assert!(!levels.is_empty(), "classification scale cannot be empty");
        for (i, level) in levels.iter().enumerate() {
            assert!(
                !levels[..i].contains(level),
                "duplicate classification level '{level}'"
            );
        }
        Self { levels }
    }

    /// Returns the levels, ordered lowest to highest.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Returns the rank of `label`, or an error if it is not on the scale.
    pub fn rank(&self, label: &str) -> Result<u8, InvalidClassification> {
        let normalized = label.trim().to_uppercase();
        self.levels
            .iter()
            .position(|l| *l == normalized)
            .map(|p| p as u8)
            .ok_or_else(|| InvalidClassification::new(normalized))
    }

    /// Returns the rank of the level embedded in a full resource marking.
    ///
    /// Accepts either a bare level (`"S"`) or a banner/portion marking
    /// (`"(TS//NOFORN)"`), normalizing via [`level_from_marking`].
    pub fn rank_from_marking(&self, marking: &str) -> Result<u8, InvalidClassification> {
        match level_from_marking(marking) {
            Some(level) => self.rank(&level),
            None => Err(InvalidClassification::new(marking.trim())),
        }
    }

    /// Whether `label` resolves on this scale.
    pub fn contains(&self, label: &str) -> bool {
        self.rank(label).is_ok()
    }

    /// The rank of the highest level on the scale.
    pub fn max_rank(&self) -> u8 {
        (self.levels.len() - 1) as u8
    }

    /// Returns the prefix of levels with rank `<= ceiling`, lowest first.
    ///
    /// A ceiling above the top of the scale is truncated to the full scale.
    pub fn prefix(&self, ceiling: u8) -> Vec<String> {
        let end = usize::from(ceiling).saturating_add(1).min(self.levels.len());
        self.levels[..end].to_vec()
    }
}

/// Extracts the bare classification level from a resource-marking string.
///
/// Strips parentheses and surrounding whitespace, uppercases, and cuts the
/// marking at the first `//` control-block separator. Returns `None` when
/// nothing remains.
pub fn level_from_marking(marking: &str) -> Option<String> {
    let cleaned = marking
        .to_uppercase()
        .replace(['(', ')'], "")
        .trim()
        .to_string();
    let level = match cleaned.find("//") {
        Some(idx) => cleaned[..idx].trim().to_string(),
        None => cleaned,
    };
    if level.is_empty() { None } else { Some(level) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_scale_ordering() {
        let scale = ClassificationScale::default();
        assert_eq!(scale.rank("U").unwrap(), 0);
        assert_eq!(scale.rank("CUI").unwrap(), 1);
        assert_eq!(scale.rank("C").unwrap(), 2);
        assert_eq!(scale.rank("S").unwrap(), 3);
        assert_eq!(scale.rank("TS").unwrap(), 4);
        assert_eq!(scale.max_rank(), 4);
    }

    #[test]
    fn test_rank_normalizes_case_and_whitespace() {
        let scale = ClassificationScale::default();
        assert_eq!(scale.rank(" ts ").unwrap(), 4);
        assert_eq!(scale.rank("cui").unwrap(), 1);
    }

    #[test]
    fn test_unknown_level_is_an_error_not_a_default() {
        let scale = ClassificationScale::default();
        let err = scale.rank("SBU").unwrap_err();
        assert_eq!(err.label, "SBU");
    }

    #[test]
    fn test_prefix_is_inclusive_and_truncated() {
        let scale = ClassificationScale::default();
        assert_eq!(scale.prefix(0), vec!["U"]);
        assert_eq!(scale.prefix(2), vec!["U", "CUI", "C"]);
        assert_eq!(scale.prefix(99).len(), 5);
    }

    #[test_case("S", Some("S"))]
    #[test_case("(TS//NOFORN)", Some("TS"))]
    #[test_case("ts//rel to usa, aus", Some("TS"))]
    #[test_case("  (c)  ", Some("C"))]
    #[test_case("", None)]
    #[test_case("//NOFORN", None)]
    fn test_level_from_marking(marking: &str, expected: Option<&str>) {
        assert_eq!(level_from_marking(marking).as_deref(), expected);
    }

    #[test]
    fn test_rank_from_marking() {
        let scale = ClassificationScale::default();
        assert_eq!(scale.rank_from_marking("(S//NOFORN)").unwrap(), 3);
        assert!(scale.rank_from_marking("(Q//NOFORN)").is_err());
        assert!(scale.rank_from_marking("").is_err());
    }

    #[test]
    #[should_panic(expected = "duplicate classification level")]
    fn test_duplicate_levels_rejected() {
        ClassificationScale::new(["U", "u"]);
    }

    #[test]
    fn test_custom_scale() {
        let scale = ClassificationScale::new(["PUBLIC", "INTERNAL", "RESTRICTED"]);
        assert_eq!(scale.rank("restricted").unwrap(), 2);
        assert!(!scale.contains("TS"));
    }
}
