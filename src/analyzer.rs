// src/analyzer.rs

use crate::dates::parse_bound;
use crate::error::{ChurnError, Result};
use crate::hunk::parse_hunk_header;
use crate::model::*;
use crate::vcs::{CommitRange, CommitSource};
use indicatif::ProgressBar;
use tracing::{debug, warn};

/// How the analysis window was requested on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeRequest<'a> {
    pub after: &'a str,
    pub before: &'a str,
    pub start_commit: Option<&'a str>,
    pub end_commit: Option<&'a str>,
}

impl RangeRequest<'_> {
    /// `start == end` names exactly one commit.
    pub fn single_commit(&self) -> Option<&str> {
        match (self.start_commit, self.end_commit) {
            (Some(start), Some(end)) if start == end => Some(start),
            _ => None,
        }
    }
}

/// Turns dates and commit ids into an inclusive time window.
///
/// Commit bounds take precedence over dates. When both commits are given
/// they are ordered so the earlier one becomes the lower bound.
pub fn resolve_range<S: CommitSource + ?Sized>(
    source: &S,
    request: &RangeRequest,
) -> Result<CommitRange> {
    let mut start = request.start_commit.map(|id| source.commit_timestamp(id)).transpose()?;
    let mut end = request.end_commit.map(|id| source.commit_timestamp(id)).transpose()?;

    if let (Some(s), Some(e)) = (&start, &end) {
        if s.seconds > e.seconds {
            std::mem::swap(&mut start, &mut end);
        }
    }

    let after = match start {
        Some(time) => {
            debug!(from = %time.formatted, "lower bound from commit");
            Some(time.seconds)
        }
        None => parse_bound(request.after)?.map(|bound| {
            debug!(from = %bound.first_day(), "lower bound from date");
            bound.lower_seconds()
        }),
    };
    let before = match end {
        Some(time) => {
            debug!(to = %time.formatted, "upper bound from commit");
            Some(time.seconds)
        }
        None => parse_bound(request.before)?.map(|bound| {
            debug!(to = %bound.last_day(), "upper bound from date");
            bound.upper_seconds()
        }),
    };

    debug!(?after, ?before, "resolved analysis window");
    Ok(CommitRange { after, before })
}

/// The commits to analyze, oldest first.
pub fn select_commits<S: CommitSource + ?Sized>(
    source: &S,
    request: &RangeRequest,
    range: &CommitRange,
    author: &str,
) -> Result<Vec<String>> {
    if let Some(id) = request.single_commit() {
        debug!(id, "single commit requested, skipping history listing");
        return Ok(vec![id.to_string()]);
    }
    source.list_commits(range, author)
}

/// Folds every commit, in order, into one shared result.
pub fn analyze<S: CommitSource + ?Sized>(
    source: &S,
    commits: &[String],
    exclude: Option<&str>,
    bar: &ProgressBar,
) -> Result<AnalysisResult> {
    bar.set_length(commits.len() as u64);
    bar.set_message("Analyzing commits");

    let mut result = AnalysisResult::default();
    for id in commits {
        fold_commit(&mut result, source, id, exclude)?;
        bar.inc(1);
    }
    bar.finish_with_message("Analysis complete");

    Ok(result)
}

/// Applies one commit's diff on top of `result`.
///
/// A diff that cannot be fetched counts as an empty one.
pub fn fold_commit<S: CommitSource + ?Sized>(
    result: &mut AnalysisResult,
    source: &S,
    id: &str,
    exclude: Option<&str>,
) -> Result<()> {
    match source.commit_diff(id, exclude) {
        Ok(diff) => {
            if tracing::enabled!(tracing::Level::DEBUG) {
                if let Ok(files) = source.commit_files(id) {
                    debug!(id, files = ?files, "processing commit");
                }
            }
            process_diff(&diff, &mut result.lines, &mut result.totals)?;
        }
        Err(err) => warn!(id, error = %err, "could not fetch diff, treating commit as empty"),
    }
    result.commits.push(id.to_string());
    Ok(())
}

/// Scan state threaded through one pass over a diff.
#[derive(Debug, Default)]
struct ScanState<'a> {
    current_file: Option<FileId>,
    current_hunk: Option<&'a str>,
}

/// Walks one commit's zero-context diff and records every hunk against
/// the file it belongs to.
///
/// A hunk is only applied when its payload differs from the previous
/// one seen in this diff.
pub fn process_diff(diff: &str, lines: &mut FileLineMap, totals: &mut RunningTotals) -> Result<()> {
    let mut state = ScanState::default();

    for line in diff.lines() {
        if let Some(path) = new_file_path(line) {
            state.current_file = Some(lines.file_id(path));
        }

        let Some(payload) = hunk_payload(line) else {
            continue;
        };
        if state.current_hunk == Some(payload) {
            continue;
        }
        state.current_hunk = Some(payload);

        let file = state
            .current_file
            .ok_or_else(|| ChurnError::HunkOutsideFile(payload.to_string()))?;

        for (line_no, delta) in parse_hunk_header(payload)?.pairs() {
            let touch = lines.record(file, line_no, delta);
            totals.apply(touch, delta);
        }
    }

    Ok(())
}

/// `+++ path` -> `path` (the last whitespace-separated token).
fn new_file_path(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("+++ ")?;
    Some(rest.rsplit(' ').next().unwrap_or(rest))
}

/// `@@ -1,2 +1,3 @@ fn x()` -> `-1,2 +1,3`.
///
/// A marker line without a space yields whatever follows `@@`, which the
/// hunk parser then rejects.
fn hunk_payload(line: &str) -> Option<&str> {
    let tail = line.strip_prefix("@@")?;
    let rest = line.split_once(' ').map_or(tail, |(_, rest)| rest);
    Some(rest.find(" @@").map_or(rest, |end| &rest[..end]))
}
