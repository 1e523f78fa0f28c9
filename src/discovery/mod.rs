mod walk;

pub use walk::walk_reports;

use crate::config::Config;
use crate::error::DiscoveryError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A report file queued for parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInput {
    pub path: PathBuf,
    /// Unique stem used for output file names
    pub name: String,
}

/// Expand CLI inputs into report files. Files given explicitly are always
/// kept; directories are walked with the config's include/exclude globs,
/// skipping the report directory so earlier output is not parsed again.
pub fn discover_inputs(
    inputs: &[PathBuf],
    config: &Config,
) -> Result<Vec<ReportInput>, DiscoveryError> {
    let report_dir = config.report_dir.canonicalize().ok();
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for input in inputs {
        if !input.exists() {
            return Err(DiscoveryError::MissingInput(input.clone()));
        }

        let found = if input.is_dir() {
            walk_reports(
                input,
                &config.include,
                &config.exclude,
                report_dir.as_deref(),
            )?
        } else {
            vec![input.clone()]
        };

        for path in found {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    if paths.is_empty() {
        return Err(DiscoveryError::NoInputs);
    }

    let mut names = HashSet::new();
    Ok(paths
        .into_iter()
        .map(|path| {
            let name = unique_name(&path, &mut names);
            ReportInput { path, name }
        })
        .collect())
}

fn unique_name(path: &Path, taken: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "report".to_string());

    let mut name = stem.clone();
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{}-{}", stem, n);
        n += 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_explicit_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("batch");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("ob1.json"), "{}").unwrap();
        fs::write(sub.join("notes.log"), "x").unwrap();
        let explicit = dir.path().join("ob1.log");
        fs::write(&explicit, "x").unwrap();

        let inputs = discover_inputs(&[sub.clone(), explicit.clone()], &Config::default()).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].path, sub.join("ob1.json"));
        assert_eq!(inputs[0].name, "ob1");
        // Explicit file bypasses include globs, name collides with ob1
        assert_eq!(inputs[1].path, explicit);
        assert_eq!(inputs[1].name, "ob1-2");
    }

    #[test]
    fn test_report_dir_output_is_not_rediscovered() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        fs::create_dir(&out).unwrap();
        fs::write(dir.path().join("ob1.txt"), "1. EXECUTIVE SUMMARY\nok").unwrap();
        fs::write(out.join("ob1.report.json"), "{}").unwrap();
        fs::write(out.join("ob1.report.md"), "## EXECUTIVE SUMMARY\nok").unwrap();
        fs::write(out.join("summary.json"), "{}").unwrap();

        let config = Config {
            report_dir: out.clone(),
            ..Config::default()
        };
        let inputs = discover_inputs(&[dir.path().to_path_buf()], &config).unwrap();

        let names: Vec<_> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ob1"]);

        // Naming an output file explicitly still parses it
        let explicit = discover_inputs(&[out.join("summary.json")], &config).unwrap();
        assert_eq!(explicit[0].name, "summary");
    }

    #[test]
    fn test_missing_input() {
        let err = discover_inputs(&[PathBuf::from("does/not/exist.json")], &Config::default())
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingInput(_)));
    }

    #[test]
    fn test_empty_directory_has_no_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_inputs(&[dir.path().to_path_buf()], &Config::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoInputs));
    }
}
