// src/vcs.rs

use crate::error::{ChurnError, Result};
use chrono::{FixedOffset, TimeZone, Utc};
use git2::{Commit, DiffFormat, DiffOptions, ErrorCode, Repository, Sort};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Inclusive window of commit times, as unix timestamps. `None` is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRange {
    pub after: Option<i64>,
    pub before: Option<i64>,
}

impl CommitRange {
    pub fn contains(&self, seconds: i64) -> bool {
        self.after.map_or(true, |after| seconds >= after)
            && self.before.map_or(true, |before| seconds <= before)
    }
}

/// A resolved commit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTime {
    pub seconds: i64,
    /// `%Y-%m-%d %H:%M` in the commit's own offset
    pub formatted: String,
}

/// Where commit lists and diffs come from.
///
/// The analyzer only sees commit ids and raw unified-diff text, so any
/// history backend can sit behind this trait.
pub trait CommitSource {
    /// Commit ids in the window, oldest first, merges excluded.
    fn list_commits(&self, range: &CommitRange, author: &str) -> Result<Vec<String>>;

    /// Distinct author names in the window, in first-seen order.
    fn list_authors(&self, range: &CommitRange) -> Result<Vec<String>>;

    fn commit_timestamp(&self, id: &str) -> Result<CommitTime>;

    /// Unified diff with zero context lines and no path prefixes.
    fn commit_diff(&self, id: &str, exclude: Option<&str>) -> Result<String>;

    /// Paths touched by a commit.
    fn commit_files(&self, id: &str) -> Result<Vec<String>>;
}

/// A repository opened through libgit2, scoped to an include directory.
pub struct GitRepo {
    repo: Repository,
    /// Include directory relative to the work tree, `None` for the root
    include_prefix: Option<String>,
}

impl GitRepo {
    pub fn open(include_dir: &Path) -> Result<Self> {
        let repo = Repository::discover(include_dir)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| ChurnError::InvalidPath(include_dir.to_path_buf()))?;

        let canonical = |path: &Path| {
            path.canonicalize()
                .map_err(|_| ChurnError::InvalidPath(path.to_path_buf()))
        };
        let include = canonical(include_dir)?;
        let root = canonical(workdir)?;
        let include_prefix = include
            .strip_prefix(&root)
            .ok()
            .map(to_pathspec)
            .filter(|prefix| !prefix.is_empty());

        debug!(workdir = %root.display(), include = ?include_prefix, "opened repository");
        Ok(GitRepo { repo, include_prefix })
    }

    fn resolve(&self, id: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(id)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| ChurnError::InvalidCommit(id.to_string()))
    }

    /// Non-merge commits inside `range`, oldest first.
    fn walk(&self, range: &CommitRange) -> Result<Vec<Commit<'_>>> {
        // A fresh repository has no history yet.
        if let Err(err) = self.repo.head() {
            if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) {
                return Ok(Vec::new());
            }
            return Err(err.into());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME | Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            if commit.parent_count() > 1 || !range.contains(commit.time().seconds()) {
                continue;
            }
            commits.push(commit);
        }
        Ok(commits)
    }

    /// Exclude directory as a lowercase repo-relative prefix.
    fn exclude_prefix(&self, exclude: &str) -> String {
        let dir = exclude.trim_start_matches("./").trim_end_matches('/');
        let path = match &self.include_prefix {
            Some(prefix) => PathBuf::from(prefix).join(dir),
            None => PathBuf::from(dir),
        };
        to_pathspec(&path).to_lowercase()
    }

    fn diff_options(&self) -> DiffOptions {
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        opts.old_prefix("");
        opts.new_prefix("");
        if let Some(prefix) = &self.include_prefix {
            opts.pathspec(prefix.as_str());
        }
        opts
    }

    fn diff_commit(&self, commit: &Commit<'_>) -> Result<git2::Diff<'_>> {
        let tree = commit.tree()?;
        let parent = commit.parent(0).ok();
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;
        let mut opts = self.diff_options();
        Ok(self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?)
    }
}

impl CommitSource for GitRepo {
    fn list_commits(&self, range: &CommitRange, author: &str) -> Result<Vec<String>> {
        let pattern = if author.is_empty() {
            None
        } else {
            Some(Regex::new(&basic_to_extended(author))?)
        };

        let ids = self
            .walk(range)?
            .iter()
            .filter(|commit| {
                pattern.as_ref().map_or(true, |pattern| {
                    let signature = commit.author();
                    let identity = format!(
                        "{} <{}>",
                        signature.name().unwrap_or(""),
                        signature.email().unwrap_or("")
                    );
                    pattern.is_match(&identity)
                })
            })
            .map(|commit| commit.id().to_string())
            .collect::<Vec<_>>();

        debug!(count = ids.len(), author, "listed commits");
        Ok(ids)
    }

    fn list_authors(&self, range: &CommitRange) -> Result<Vec<String>> {
        let mut authors: Vec<String> = Vec::new();
        for commit in self.walk(range)? {
            let name = commit.author().name().unwrap_or("Unknown").to_string();
            if !authors.contains(&name) {
                authors.push(name);
            }
        }
        Ok(authors)
    }

    fn commit_timestamp(&self, id: &str) -> Result<CommitTime> {
        if id.len() < 7 {
            return Err(ChurnError::InvalidCommit(id.to_string()));
        }

        let time = self.resolve(id)?.time();
        let seconds = time.seconds();
        let formatted = FixedOffset::east_opt(time.offset_minutes() * 60)
            .and_then(|offset| offset.timestamp_opt(seconds, 0).single())
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|| {
                Utc.timestamp_opt(seconds, 0)
                    .single()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            })
            .ok_or_else(|| ChurnError::InvalidCommit(id.to_string()))?;

        Ok(CommitTime { seconds, formatted })
    }

    fn commit_diff(&self, id: &str, exclude: Option<&str>) -> Result<String> {
        let commit = self.resolve(id)?;
        let diff = self.diff_commit(&commit)?;
        let exclude = exclude
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| self.exclude_prefix(dir));

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |delta, _hunk, line| {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let (Some(exclude), Some(path)) = (&exclude, path) {
                if is_under(&to_pathspec(path).to_lowercase(), exclude) {
                    return true;
                }
            }

            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(text)
    }

    fn commit_files(&self, id: &str) -> Result<Vec<String>> {
        let commit = self.resolve(id)?;
        let diff = self.diff_commit(&commit)?;
        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(to_pathspec)
            .collect())
    }
}

/// Rewrites a POSIX basic regex, as `git log --author` takes it, into
/// the `regex` crate's syntax.
///
/// `+ ? ( ) { } |` are literal unless backslash-escaped; inside a
/// bracket expression everything is kept as written.
fn basic_to_extended(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        if in_class {
            if c == ']' {
                in_class = false;
            }
            out.push(c);
            continue;
        }
        match c {
            '[' => {
                in_class = true;
                out.push(c);
                // A leading `]` (after an optional `^`) is a literal member.
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push_str("\\]");
                    chars.next();
                }
            }
            '\\' => match chars.next() {
                Some(op @ ('+' | '?' | '(' | ')' | '{' | '}' | '|')) => out.push(op),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push_str("\\\\"),
            },
            '+' | '?' | '(' | ')' | '{' | '}' | '|' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn to_pathspec(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn is_under(path: &str, dir: &str) -> bool {
    path == dir || path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'))
}
