// src/main.rs

mod analyzer;
mod cli;
mod dates;
mod error;
mod hunk;
mod model;
mod report;
mod vcs;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use indicatif::ProgressBar;
use report::AuthorLine;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vcs::{CommitSource, GitRepo};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let include_dir = args.include_dir()?;
    let repo = GitRepo::open(&include_dir)
        .with_context(|| format!("Failed to open git repository at {}", include_dir.display()))?;

    let request = args.range_request();
    let range = analyzer::resolve_range(&repo, &request)?;
    let commits = analyzer::select_commits(&repo, &request, &range, args.author())?;
    info!(count = commits.len(), "commits selected");

    let bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(commits.len() as u64)
    };
    let analysis = analyzer::analyze(&repo, &commits, args.exclude_dir(), &bar)?;
    info!(
        elapsed = ?start_time.elapsed(),
        commits = analysis.commits.len(),
        files = analysis.lines.file_count(),
        positions = analysis.lines.position_count(),
        "analysis finished"
    );

    let author = if args.author().is_empty() {
        AuthorLine::Observed(repo.list_authors(&range)?)
    } else {
        AuthorLine::Named(args.author().to_string())
    };

    print!("{}", report::render(&author, &analysis.totals));
    if args.per_file {
        println!();
        print!("{}", report::render_per_file(&analysis.lines));
    }

    Ok(())
}
