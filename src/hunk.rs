// src/hunk.rs

use crate::error::{ChurnError, Result};

/// Line-position deltas recorded for a single hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRangeDelta {
    /// Old and new ranges start at the same line: only the net change in
    /// line count is recorded at that anchor.
    SameAnchor { line: usize, delta: i64 },
    /// Anchors differ: the old-side count and the new-side count are
    /// recorded independently.
    Split { old: (usize, i64), new: (usize, i64) },
}

impl LineRangeDelta {
    /// The `(line, delta)` pairs in the order they are applied.
    pub fn pairs(&self) -> Vec<(usize, i64)> {
        match *self {
            LineRangeDelta::SameAnchor { line, delta } => vec![(line, delta)],
            LineRangeDelta::Split { old, new } => vec![old, new],
        }
    }
}

/// Parses a hunk payload such as `-12,3 +12,5` (the text between the `@@`
/// markers). A missing count defaults to 1.
pub fn parse_hunk_header(payload: &str) -> Result<LineRangeDelta> {
    let malformed = || ChurnError::InvalidHunkHeader(payload.to_string());

    let (left, right) = payload.split_once(' ').ok_or_else(malformed)?;
    if right.contains(' ') {
        return Err(malformed());
    }

    let (left_main, left_sub) = parse_range(left, '-').ok_or_else(malformed)?;
    let (right_main, right_sub) = parse_range(right, '+').ok_or_else(malformed)?;

    if left_main == right_main {
        Ok(LineRangeDelta::SameAnchor {
            line: left_main,
            delta: right_sub - left_sub,
        })
    } else {
        Ok(LineRangeDelta::Split {
            old: (left_main, left_sub),
            new: (right_main, right_sub),
        })
    }
}

/// `-N[,M]` or `+N[,M]` into `(N, M)`.
fn parse_range(part: &str, sign: char) -> Option<(usize, i64)> {
    let body = part.strip_prefix(sign)?;
    match body.split_once(',') {
        Some((start, count)) => {
            let count = i64::from(count.parse::<u32>().ok()?);
            Some((start.parse().ok()?, count))
        }
        None => Some((body.parse().ok()?, 1)),
    }
}
