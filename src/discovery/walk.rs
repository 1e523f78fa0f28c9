use crate::error::DiscoveryError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

fn build_globset(patterns: &[String], label: &str) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DiscoveryError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| DiscoveryError::GlobPattern {
        pattern: label.to_string(),
        source: e,
    })
}

/// Walk a directory for report files matching `include` and not `exclude`.
/// Nothing below `skip_dir` (a canonical path) is visited.
pub fn walk_reports(
    root: &Path,
    include: &[String],
    exclude: &[String],
    skip_dir: Option<&Path>,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let include_set = build_globset(include, "include set")?;
    let exclude_set = build_globset(exclude, "exclude set")?;

    // Use ignore crate to respect .gitignore
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true) // skip hidden files
        .git_ignore(true)
        .git_exclude(true);

    if let Some(skip) = skip_dir.map(Path::to_path_buf) {
        let walk_root = root.to_path_buf();
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        builder.filter_entry(move |entry| {
            let rel = entry.path().strip_prefix(&walk_root).unwrap_or(entry.path());
            entry.depth() == 0 || canonical_root.join(rel) != skip
        });
    }

    let walker = builder.build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        // Patterns match against the path relative to the walked directory
        let rel_path = path.strip_prefix(root).unwrap_or(path);
        let matches = |set: &GlobSet| {
            set.is_match(rel_path) || path.file_name().is_some_and(|n| set.is_match(n))
        };

        if !include.is_empty() && !matches(&include_set) {
            continue;
        }
        if matches(&exclude_set) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
