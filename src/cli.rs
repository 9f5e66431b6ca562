// src/cli.rs

use crate::analyzer::RangeRequest;
use crate::error::{ChurnError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Code churn and contribution per author from git history",
    long_about = None,
    after_help = "Single-dash long flags (-start_commit, -end_commit, -exclude_dir) are not \
accepted; use --start_commit / --start-commit and the matching forms instead."
)]
pub struct Args {
    /// Search after a certain date, in YYYY[-MM[-DD]] format
    pub after: String,

    /// Search before a certain date, in YYYY[-MM[-DD]] format
    pub before: String,

    /// An author (non-committer), leave blank to scope all authors
    pub author: String,

    /// The git repository directory to include in the analysis
    pub include_dir: String,

    /// Search from a certain commit, in short SHA format (also --start_commit)
    #[arg(long = "start-commit", alias = "start_commit")]
    pub start_commit: Option<String>,

    /// Search to a certain commit, in short SHA format (also --end_commit)
    #[arg(long = "end-commit", alias = "end_commit")]
    pub end_commit: Option<String>,

    /// Subdirectory of the include directory to leave out, case-insensitive
    /// (also --exclude_dir)
    #[arg(long = "exclude-dir", alias = "exclude_dir", env = "CHURN_EXCLUDE_DIR")]
    pub exclude_dir: Option<String>,

    /// Also print contribution and churn for each file
    #[arg(long)]
    pub per_file: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn after(&self) -> &str {
        strip_prefix(&self.after, "after=")
    }

    pub fn before(&self) -> &str {
        strip_prefix(&self.before, "before=")
    }

    pub fn author(&self) -> &str {
        strip_prefix(&self.author, "author=").trim()
    }

    pub fn exclude_dir(&self) -> Option<&str> {
        self.exclude_dir
            .as_deref()
            .map(|dir| strip_prefix(dir, "exclude_dir="))
            .filter(|dir| !dir.trim().is_empty())
    }

    /// The include directory, which must exist.
    pub fn include_dir(&self) -> Result<PathBuf> {
        let path = PathBuf::from(strip_prefix(&self.include_dir, "include_dir="));
        if path.is_dir() {
            Ok(path)
        } else {
            Err(ChurnError::InvalidPath(path))
        }
    }

    pub fn range_request(&self) -> RangeRequest<'_> {
        RangeRequest {
            after: self.after(),
            before: self.before(),
            start_commit: self.start_commit.as_deref(),
            end_commit: self.end_commit.as_deref(),
        }
    }
}

fn strip_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.strip_prefix(prefix).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn strips_keyword_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let include = format!("include_dir={}", dir.path().display());
        let args = Args::parse_from([
            "git-churn",
            "after=2021",
            "before=2022-06",
            "author=flacle",
            include.as_str(),
            "--exclude-dir",
            "vendor",
        ]);

        assert_eq!(args.after(), "2021");
        assert_eq!(args.before(), "2022-06");
        assert_eq!(args.author(), "flacle");
        assert_eq!(args.exclude_dir(), Some("vendor"));
        assert_eq!(args.include_dir().unwrap(), dir.path());
    }

    #[test]
    fn underscore_flags_and_blank_author() {
        let dir = tempfile::tempdir().unwrap();
        let include = dir.path().display().to_string();
        let args = Args::parse_from([
            "git-churn",
            "2021",
            "2022",
            "",
            include.as_str(),
            "--start_commit",
            "abcdef1",
            "--end-commit",
            "abcdef1",
        ]);

        assert_eq!(args.author(), "");
        let request = args.range_request();
        assert_eq!(request.single_commit(), Some("abcdef1"));
    }

    #[test]
    fn help_names_the_double_dash_forms() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("--start-commit"));
        assert!(help.contains("--start_commit"));
        assert!(help.contains("-exclude_dir"));
        assert!(help.contains("Single-dash long flags"));

        let argv = ["git-churn", "2021", "2022", "", ".", "-start_commit", "abcdef1"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn missing_include_dir_is_rejected() {
        let args = Args::parse_from(["git-churn", "2021", "2022", "", "/no/such/dir/anywhere"]);
        assert!(matches!(args.include_dir(), Err(ChurnError::InvalidPath(_))));
    }
}
