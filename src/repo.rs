//! Repository file listing
//!
//! Gitignore-aware walk of the working tree, returning root-relative paths
//! in sorted order. Stand-in for `git ls-files` without a subprocess.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// List tracked files under `root`, relative to `root`, sorted.
///
/// Dotfiles are included since CI configuration lives in them; `.git` and
/// anything matched by ignore rules are skipped. Ignore rules apply even
/// when the tree is not a git checkout (CI tarballs).
pub fn tracked_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walk = ignore::WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    for entry in walk {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            files.push(rel.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
