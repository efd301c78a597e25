//! DOI pattern matching and normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+").unwrap());

/// Canonical form used for every DOI comparison: trimmed and lower-cased.
///
/// Idempotent, so values already in a registry can be passed through again.
pub fn normalize_doi(doi: &str) -> String {
    doi.trim().to_lowercase()
}

/// Find every DOI in `text`, normalized and de-duplicated.
///
/// The suffix character class also matches sentence punctuation, so a DOI at
/// the end of a sentence would otherwise carry the full stop with it. A match
/// left with an empty suffix after trimming (`10.1234/.`) is not a DOI.
pub fn extract_dois(text: &str) -> BTreeSet<String> {
    DOI_RE
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(m.as_str()))
        .filter(|d| !d.ends_with('/'))
        .map(normalize_doi)
        .collect()
}

/// Strip sentence punctuation and unbalanced closing parentheses.
fn trim_trailing_punctuation(mut doi: &str) -> &str {
    loop {
        let trimmed = doi.trim_end_matches(['.', ',', ';', ':']);
        let unbalanced = trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count();
        if unbalanced {
            doi = &trimmed[..trimmed.len() - 1];
        } else {
            return trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  10.1000/XYZ123 ", "10.1038/nature12373", "10.5555/A(b)C"] {
            let once = normalize_doi(raw);
            assert_eq!(normalize_doi(&once), once);
        }
        assert_eq!(normalize_doi(" 10.1000/XYZ123\n"), "10.1000/xyz123");
    }

    #[test]
    fn test_extract_collapses_case_variants() {
        let text = "See doi:10.1000/XYZ123 and https://doi.org/10.1000/xyz123 for details";
        let dois = extract_dois(text);
        assert_eq!(dois.len(), 1);
        assert!(dois.contains("10.1000/xyz123"));
    }

    #[test]
    fn test_extract_multiple_and_trailing_punctuation() {
        let text = "Published in Nature (DOI 10.1038/s41586-020-2649-2). \
                    Earlier work: 10.1126/science.aaa1234; also 10.1000/abc.";
        let dois: Vec<_> = extract_dois(text).into_iter().collect();
        assert_eq!(
            dois,
            vec![
                "10.1000/abc",
                "10.1038/s41586-020-2649-2",
                "10.1126/science.aaa1234",
            ]
        );
    }

    #[test]
    fn test_empty_suffix_is_not_a_doi() {
        assert!(extract_dois("prefix only: 10.1234/. end").is_empty());
        assert!(extract_dois("(10.1234/)").is_empty());
        let dois: Vec<_> = extract_dois("10.1234/, but 10.1234/a.").into_iter().collect();
        assert_eq!(dois, vec!["10.1234/a"]);
    }

    #[test]
    fn test_balanced_parentheses_are_kept() {
        let dois = extract_dois("(see 10.1002/(sici)1097-4636(199907)28:1<1::aid>)");
        assert!(dois.contains("10.1002/(sici)1097-4636(199907)28:1"));
    }

    #[test]
    fn test_extract_rejects_short_registrant() {
        assert!(extract_dois("version 10.12/abc is not a doi").is_empty());
        assert!(extract_dois("no identifiers here").is_empty());
    }
}
