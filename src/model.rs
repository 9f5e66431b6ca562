// src/model.rs

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Uniquely identifies a file path within one run
pub type FileId = usize;

/// Maps a (FileId, line_number) pair to its cumulative signed change count
pub type LineMap = HashMap<(FileId, usize), i64>;

/// Whether a recorded delta landed on a fresh position or a known one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    First,
    Repeat,
}

/// Contribution and churn, both as absolute magnitudes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub contribution: u64,
    pub churn: u64,
}

impl RunningTotals {
    /// A first touch counts as contribution, any later touch as churn.
    pub fn apply(&mut self, touch: Touch, delta: i64) {
        match touch {
            Touch::First => self.contribution += delta.unsigned_abs(),
            Touch::Repeat => self.churn += delta.unsigned_abs(),
        }
    }
}

/// Per-file bookkeeping, in the order files were first seen
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub totals: RunningTotals,
    /// Number of distinct line positions tracked for this file
    pub positions: usize,
}

/// File path -> line position -> signed change count.
///
/// Keys are never removed once recorded; presence (not a nonzero value)
/// decides whether a later delta is churn.
#[derive(Debug, Default)]
pub struct FileLineMap {
    file_map: HashMap<String, FileId>,
    files: Vec<FileInfo>,
    changes: LineMap,
}

impl FileLineMap {
    /// Returns the id for `path`, registering it on first sight.
    pub fn file_id(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.file_map.get(path) {
            return id;
        }
        let id = self.files.len();
        self.file_map.insert(path.to_string(), id);
        self.files.push(FileInfo {
            path: path.to_string(),
            totals: RunningTotals::default(),
            positions: 0,
        });
        id
    }

    /// Adds `delta` at `(file, line)` and folds it into that file's totals.
    pub fn record(&mut self, file: FileId, line: usize, delta: i64) -> Touch {
        let touch = match self.changes.entry((file, line)) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += delta;
                Touch::Repeat
            }
            Entry::Vacant(entry) => {
                entry.insert(delta);
                Touch::First
            }
        };

        let info = &mut self.files[file];
        if touch == Touch::First {
            info.positions += 1;
        }
        info.totals.apply(touch, delta);
        touch
    }

    #[cfg(test)]
    pub fn get(&self, path: &str, line: usize) -> Option<i64> {
        let id = self.file_map.get(path)?;
        self.changes.get(&(*id, line)).copied()
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn position_count(&self) -> usize {
        self.changes.len()
    }
}

/// The complete results of one churn analysis
#[derive(Debug, Default)]
pub struct AnalysisResult {
    pub lines: FileLineMap,
    pub totals: RunningTotals,
    /// Commit ids folded into this result, in processing order
    pub commits: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_is_contribution_then_churn() {
        let mut lines = FileLineMap::default();
        let file = lines.file_id("file.txt");

        assert_eq!(lines.record(file, 42, 5), Touch::First);
        assert_eq!(lines.record(file, 42, -3), Touch::Repeat);
        assert_eq!(lines.get("file.txt", 42), Some(2));

        let info = &lines.files()[file];
        assert_eq!(info.totals, RunningTotals { contribution: 5, churn: 3 });
        assert_eq!(info.positions, 1);
    }

    #[test]
    fn zero_entry_still_claims_the_position() {
        let mut lines = FileLineMap::default();
        let file = lines.file_id("a.rs");

        assert_eq!(lines.record(file, 5, 0), Touch::First);
        assert_eq!(lines.get("a.rs", 5), Some(0));
        assert_eq!(lines.record(file, 5, 4), Touch::Repeat);
        assert_eq!(lines.files()[file].totals, RunningTotals { contribution: 0, churn: 4 });
    }

    #[test]
    fn positions_are_scoped_per_file() {
        let mut lines = FileLineMap::default();
        let a = lines.file_id("a.rs");
        let b = lines.file_id("b.rs");

        assert_eq!(lines.file_id("a.rs"), a);
        assert_eq!(lines.record(a, 1, 2), Touch::First);
        assert_eq!(lines.record(b, 1, 2), Touch::First);
        assert_eq!(lines.file_count(), 2);
        assert_eq!(lines.position_count(), 2);
        assert_eq!(lines.get("c.rs", 1), None);
    }

    #[test]
    fn totals_use_absolute_values() {
        let mut totals = RunningTotals::default();
        totals.apply(Touch::First, -4);
        totals.apply(Touch::Repeat, -2);
        totals.apply(Touch::Repeat, 3);
        assert_eq!(totals, RunningTotals { contribution: 4, churn: 5 });
    }
}
