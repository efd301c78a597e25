//! Data models shared by the crawler, the registry loader and the reporters.
//!
//! - [`RetractedDoiSet`]: the normalized Retraction Watch DOI list
//! - [`StoryPage`]: what the extractor found on one Scimex story
//! - [`MatchRecord`]: one story DOI that appears on the retraction list
//! - [`NameOrganization`] / [`BooleanQuery`]: output of the query builder

use crate::doi::normalize_doi;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Title used when a story page has no headline.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// The set of retracted DOIs, stored in normalized form.
///
/// Membership checks normalize their argument, so lookups are
/// case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RetractedDoiSet(HashSet<String>);

impl RetractedDoiSet {
    /// Build a set from raw cells, dropping blanks.
    pub fn from_raw<I, S>(dois: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            dois.into_iter()
                .map(|d| normalize_doi(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, doi: &str) -> bool {
        self.0.contains(&normalize_doi(doi))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of scraping one story page.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryPage {
    /// The story URL.
    pub url: String,
    /// Headline, or [`UNKNOWN_TITLE`].
    pub title: String,
    /// Normalized DOIs found on the page.
    pub dois: BTreeSet<String>,
}

/// A story that cites a retracted DOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// Story headline, or [`UNKNOWN_TITLE`]; never empty.
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "Story URL")]
    pub story_url: String,
}

/// A person and their organization, parsed from one heading line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameOrganization {
    /// Professional title preceding the name, if one was recognised.
    pub title: Option<String>,
    pub name: String,
    pub organization: String,
}

impl NameOrganization {
    /// First token of the name, used in the proximity clause.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Boolean queries built from a page's name/organization pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanQuery {
    /// Medium-restricted query with name and name-near-organization clauses.
    pub full_query: String,
    /// Quoted names joined with `OR`.
    pub names_query: String,
    pub pairs: Vec<NameOrganization>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retracted_set_normalizes_and_drops_blanks() {
        let set = RetractedDoiSet::from_raw(["10.1000/ABC ", "", "   ", "10.1000/abc", "10.2000/def"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("10.1000/abc"));
        assert!(set.contains(" 10.1000/ABC"));
        assert!(set.contains("10.2000/DEF"));
        assert!(!set.contains("10.3000/ghi"));
    }

    #[test]
    fn test_retracted_set_serializes_as_list() {
        let set = RetractedDoiSet::from_raw(["10.1000/abc"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["10.1000/abc"]"#);
        let back: RetractedDoiSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_first_name() {
        let pair = NameOrganization {
            title: Some("Dr".to_string()),
            name: "Jane Smith".to_string(),
            organization: "University of Example".to_string(),
        };
        assert_eq!(pair.first_name(), "Jane");
    }
}
