//! Version-control cross-referencing for candidate paths.
//!
//! Candidates arrive as (component, absolute path) pairs. Each unique path is
//! probed once; the resulting record fans back out to every component that
//! asked about that path.
use crate::util::run_bounded;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Modified/untracked detail: a bare count in SUMMARY mode, sorted relative
/// paths in FULL mode.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FileDetail {
    Count(usize),
    Names(Vec<String>),
}

#[derive(Serialize, Debug, Clone)]
pub struct GitFacts {
    pub sha1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remotes: Option<Vec<String>>,
    pub modified_files: FileDetail,
    pub untracked_files: FileDetail,
}

/// One component's repository record.
#[derive(Serialize, Debug, Clone)]
pub struct RepoRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub git: GitFacts,
}

/// Walk upward from a candidate's containing directory until a directory
/// holding a `.git` entry is found. Reaching the filesystem root without a
/// match is ordinary control flow, not an error.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_dir() { Some(start) } else { start.parent() };
    while let Some(dir) = current {
        // A `.git` file (not just a directory) counts: linked worktrees keep
        // their gitdir behind one.
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Probe every candidate path and key the findings per requesting component.
/// A path shared by several components is probed once.
pub fn check_candidates(
    candidates: &BTreeSet<(String, PathBuf)>,
    full: bool,
) -> BTreeMap<String, RepoRecord> {
    let mut by_path: BTreeMap<&Path, Vec<&str>> = BTreeMap::new();
    for (name, path) in candidates {
        by_path.entry(path.as_path()).or_default().push(name.as_str());
    }

    let mut records = BTreeMap::new();
    for (path, names) in by_path {
        let Some(repo_root) = find_repo_root(path) else {
            continue;
        };
        match inspect_repo(&repo_root, full) {
            Ok(record) => {
                for name in names {
                    records.insert(name.to_string(), record.clone());
                }
            }
            Err(err) => {
                tracing::warn!(
                    repo = %repo_root.display(),
                    error = %err,
                    "skipping unreadable repository"
                );
            }
        }
    }
    records
}

/// Read commit, dirty-state, and (FULL mode) remote metadata for one
/// repository root.
pub fn inspect_repo(repo_root: &Path, full: bool) -> Result<RepoRecord> {
    let sha1 = run_git(repo_root, &["rev-parse", "HEAD"])?.trim().to_string();
    let mut modified = name_lines(&run_git(repo_root, &["diff", "--name-only"])?);
    let mut untracked = name_lines(&run_git(
        repo_root,
        &["ls-files", "--others", "--exclude-standard"],
    )?);

    if !full {
        return Ok(RepoRecord {
            path: None,
            git: GitFacts {
                sha1,
                remotes: None,
                modified_files: FileDetail::Count(modified.len()),
                untracked_files: FileDetail::Count(untracked.len()),
            },
        });
    }

    modified.sort();
    untracked.sort();
    Ok(RepoRecord {
        path: Some(repo_root.to_string_lossy().to_string()),
        git: GitFacts {
            sha1,
            remotes: Some(remote_urls(repo_root)?),
            modified_files: FileDetail::Names(modified),
            untracked_files: FileDetail::Names(untracked),
        },
    })
}

fn run_git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let mut command = Command::new("git");
    command.arg("-C").arg(repo_root).args(args);
    let output = run_bounded(&mut command, GIT_TIMEOUT)
        .with_context(|| format!("run git {} in {}", args.join(" "), repo_root.display()))?;
    if output.timed_out {
        return Err(anyhow!(
            "git {} timed out in {}",
            args.join(" "),
            repo_root.display()
        ));
    }
    if !output.status.success() {
        return Err(anyhow!(
            "git {} failed: {}",
            args.join(" "),
            output.stderr_text().trim()
        ));
    }
    Ok(output.stdout_text())
}

fn name_lines(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn remote_urls(repo_root: &Path) -> Result<Vec<String>> {
    let listing = run_git(repo_root, &["remote", "-v"])?;
    let mut urls = Vec::new();
    for line in listing.lines() {
        let mut fields = line.split_whitespace();
        let (Some(_name), Some(url), Some(kind)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if kind == "(fetch)" && !urls.iter().any(|seen| seen == url) {
            urls.push(url.to_string());
        }
    }
    Ok(urls)
}
