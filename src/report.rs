//! Cross-referencing story DOIs against the retraction list.

use crate::models::{MatchRecord, RetractedDoiSet, StoryPage};
use itertools::Itertools;

/// Emit one [`MatchRecord`] per story DOI that is on the retraction list.
///
/// Records come out in story order, then DOI order within a story.
pub fn find_matches(stories: &[StoryPage], retracted: &RetractedDoiSet) -> Vec<MatchRecord> {
    stories
        .iter()
        .flat_map(|story| {
            story
                .dois
                .iter()
                .filter(|doi| retracted.contains(doi))
                .map(|doi| MatchRecord {
                    title: story.title.clone(),
                    doi: doi.clone(),
                    story_url: story.url.clone(),
                })
        })
        .collect()
}

/// Number of distinct stories among the matches.
pub fn affected_story_count(matches: &[MatchRecord]) -> usize {
    matches.iter().map(|m| m.story_url.as_str()).unique().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_TITLE;
    use std::collections::BTreeSet;

    fn story(url: &str, dois: &[&str]) -> StoryPage {
        StoryPage {
            url: url.to_string(),
            title: format!("Title of {url}"),
            dois: dois.iter().map(|d| d.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_only_retracted_dois_match() {
        let retracted = RetractedDoiSet::from_raw(["10.1000/xyz123", "10.2000/bad"]);
        let stories = vec![
            story("https://s/1", &["10.1000/xyz123", "10.9999/fine"]),
            story("https://s/2", &["10.9999/also-fine"]),
            story("https://s/3", &["10.2000/bad", "10.1000/xyz123"]),
        ];
        let matches = find_matches(&stories, &retracted);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].story_url, "https://s/1");
        assert_eq!(matches[0].title, "Title of https://s/1");
        assert_eq!(matches[1].doi, "10.1000/xyz123");
        assert_eq!(matches[2].doi, "10.2000/bad");
        assert_eq!(affected_story_count(&matches), 2);
    }

    #[test]
    fn test_untitled_story_match_carries_sentinel_title() {
        let retracted = RetractedDoiSet::from_raw(["10.1000/xyz123"]);
        let stories = vec![StoryPage {
            title: UNKNOWN_TITLE.to_string(),
            ..story("https://s/untitled", &["10.1000/xyz123"])
        }];
        let matches = find_matches(&stories, &retracted);
        assert_eq!(
            matches,
            vec![MatchRecord {
                title: "Unknown Title".to_string(),
                doi: "10.1000/xyz123".to_string(),
                story_url: "https://s/untitled".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let retracted = RetractedDoiSet::from_raw(["10.1000/xyz123"]);
        let matches = find_matches(&[story("https://s/1", &["10.1/none"])], &retracted);
        assert!(matches.is_empty());
        assert_eq!(affected_story_count(&matches), 0);
    }
}
