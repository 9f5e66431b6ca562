// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a churn run.
///
/// Input-format and path errors are fatal and surface before a report is
/// printed. A diff that cannot be fetched is not an error at this level;
/// the analyzer logs it and moves on.
#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("malformed hunk header `{0}`")]
    InvalidHunkHeader(String),

    #[error("hunk `{0}` appears before any file header")]
    HunkOutsideFile(String),

    #[error("invalid date `{0}`, expected YYYY[-MM[-DD]]")]
    InvalidDate(String),

    #[error("{0} is not a valid commit hash.")]
    InvalidCommit(String),

    #[error("{} is not a valid path.", .0.display())]
    InvalidPath(PathBuf),

    #[error("invalid author pattern: {0}")]
    InvalidAuthor(#[from] regex::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, ChurnError>;
