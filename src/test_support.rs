// src/test_support.rs

use git2::{Commit, Repository, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

pub const DAY: i64 = 86_400;

/// A scratch repository that commits with fixed authors and timestamps.
pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;
        Ok(TestRepo { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `files` and commits them on top of HEAD. Returns the full id.
    pub fn commit(
        &self,
        author: &str,
        seconds: i64,
        files: &[(&str, &str)],
    ) -> anyhow::Result<String> {
        let mut index = self.repo.index()?;
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full, content)?;
            index.add_path(Path::new(path))?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let sig = Signature::new(author, &email, &Time::new(seconds, 0))?;
        let parent = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = self.repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)?;
        Ok(oid.to_string())
    }
}
