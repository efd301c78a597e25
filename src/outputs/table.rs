//! Plain-text table rendering for the terminal.

use crate::models::MatchRecord;

const HEADERS: [&str; 3] = ["Title", "DOI", "Story URL"];

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, to: usize) -> String {
    format!("{s}{}", " ".repeat(to.saturating_sub(width(s))))
}

/// Render matches as an aligned table with a header rule.
pub fn render_table(matches: &[MatchRecord]) -> String {
    let rows: Vec<[&str; 3]> = matches
        .iter()
        .map(|m| [m.title.as_str(), m.doi.as_str(), m.story_url.as_str()])
        .collect();

    let mut widths = HEADERS.map(width);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let line = |cells: [&str; 3]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| pad(cell, w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = line(HEADERS);
    out.push('\n');
    out.push_str(&widths.map(|w| "-".repeat(w)).join("-+-"));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_TITLE;

    #[test]
    fn test_render_table_aligns_columns() {
        let matches = vec![
            MatchRecord {
                title: "A long story title".to_string(),
                doi: "10.1000/xyz123".to_string(),
                story_url: "https://s/1".to_string(),
            },
            MatchRecord {
                title: UNKNOWN_TITLE.to_string(),
                doi: "10.2/x".to_string(),
                story_url: "https://s/22".to_string(),
            },
        ];
        let table = render_table(&matches);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Title              | DOI            | Story URL");
        assert_eq!(lines[1], "-------------------+----------------+-------------");
        assert_eq!(lines[2], "A long story title | 10.1000/xyz123 | https://s/1");
        assert_eq!(lines[3], "Unknown Title      | 10.2/x         | https://s/22");
    }
}
