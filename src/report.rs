// src/report.rs

use crate::model::{FileLineMap, RunningTotals};
use std::fmt::Write;

/// Who the report is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorLine {
    /// An explicit author filter
    Named(String),
    /// No filter: every author seen in the window
    Observed(Vec<String>),
}

/// Author line, contribution and churn. Churn is shown negated.
pub fn render(author: &AuthorLine, totals: &RunningTotals) -> String {
    let author_info = match author {
        AuthorLine::Named(name) => format!("author: \t {name}"),
        AuthorLine::Observed(names) => format!("authors: \t {}", names.join(", ")),
    };

    format!(
        "{author_info}\ncontribution: \t {}\nchurn: \t\t {}\n",
        totals.contribution,
        negated(totals.churn)
    )
}

/// One line per file, sorted by path.
pub fn render_per_file(lines: &FileLineMap) -> String {
    let mut files: Vec<_> = lines.files().iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let width = files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    let mut out = String::new();
    for file in files {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:<width$}  contribution: {:>6}  churn: {:>7}  positions: {}",
            file.path,
            file.totals.contribution,
            negated(file.totals.churn),
            file.positions,
        );
    }
    out
}

fn negated(churn: u64) -> i128 {
    -i128::from(churn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_author_report() {
        let totals = RunningTotals { contribution: 12, churn: 3 };
        let text = render(&AuthorLine::Named("flacle".into()), &totals);
        assert_eq!(text, "author: \t flacle\ncontribution: \t 12\nchurn: \t\t -3\n");
    }

    #[test]
    fn observed_authors_and_zero_churn() {
        let authors = AuthorLine::Observed(vec!["Alice".into(), "Bob".into()]);
        let text = render(&authors, &RunningTotals::default());
        assert_eq!(text, "authors: \t Alice, Bob\ncontribution: \t 0\nchurn: \t\t 0\n");
    }

    #[test]
    fn per_file_breakdown_is_sorted() {
        let mut lines = FileLineMap::default();
        let b = lines.file_id("b.rs");
        let a = lines.file_id("a.rs");
        lines.record(b, 1, 4);
        lines.record(a, 2, 1);
        lines.record(a, 2, -2);

        let text = render_per_file(&lines);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("a.rs"));
        assert!(rows[0].contains("churn:      -2"));
        assert!(rows[1].starts_with("b.rs"));
        assert!(rows[1].ends_with("positions: 1"));
    }
}
