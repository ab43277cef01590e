//! Build artifact discovery.
//!
//! Which files in the build output count as plugins is decided by an
//! ordered table of suffix rules rather than ad hoc string checks, so new
//! auxiliary outputs can be excluded without touching control flow.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StageError;

pub const ARTIFACT_SUFFIX: &str = ".jar";
pub const SOURCES_SUFFIX: &str = "-sources.jar";
pub const JAVADOC_SUFFIX: &str = "-javadoc.jar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    Allow,
    Deny,
}

/// A single allow/deny rule matched against the end of a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuffixRule {
    pub effect: RuleEffect,
    pub suffix: String,
}

impl SuffixRule {
    pub fn allow(suffix: impl Into<String>) -> Self {
        Self {
            effect: RuleEffect::Allow,
            suffix: suffix.into(),
        }
    }

    pub fn deny(suffix: impl Into<String>) -> Self {
        Self {
            effect: RuleEffect::Deny,
            suffix: suffix.into(),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
    }
}

/// Name filter for build artifacts.
///
/// A name qualifies when at least one allow rule matches and no deny rule
/// does. Deny always wins, regardless of rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFilter {
    rules: Vec<SuffixRule>,
}

impl ArtifactFilter {
    pub fn new(rules: Vec<SuffixRule>) -> Self {
        Self { rules }
    }

    /// Plugin jars, excluding sources and javadoc bundles.
    pub fn plugin_jars() -> Self {
        Self::new(vec![
            SuffixRule::allow(ARTIFACT_SUFFIX),
            SuffixRule::deny(SOURCES_SUFFIX),
            SuffixRule::deny(JAVADOC_SUFFIX),
        ])
    }

    pub fn with_rule(mut self, rule: SuffixRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[SuffixRule] {
        &self.rules
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let mut allowed = false;
        for rule in self.rules.iter().filter(|rule| rule.matches(file_name)) {
            match rule.effect {
                RuleEffect::Deny => return false,
                RuleEffect::Allow => allowed = true,
            }
        }
        allowed
    }
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        Self::plugin_jars()
    }
}

/// A qualifying file found in the build output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifact {
    pub file_name: String,
    pub path: PathBuf,
}

/// Result of listing the build output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactScan {
    pub qualifying: Vec<BuildArtifact>,
    /// File names that were present but rejected by the filter.
    pub rejected: Vec<String>,
}

/// List `dir` and sort its files into qualifying and rejected names.
///
/// Entries are returned in file-name order. Subdirectories are ignored.
pub fn scan_artifacts(dir: &Path, filter: &ArtifactFilter) -> Result<ArtifactScan, StageError> {
    if !dir.is_dir() {
        return Err(StageError::MissingBuildOutputDirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = fs::read_dir(dir)
        .map_err(|err| StageError::io(format!("Failed to read directory: {}", dir.display()), err))?;

    let mut scan = ArtifactScan::default();
    for entry in entries {
        let entry = entry.map_err(|err| {
            StageError::io(
                format!("Failed to read directory entries: {}", dir.display()),
                err,
            )
        })?;
        let path = entry.path();
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "Ignoring non-file entry in build output");
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "Ignoring build output with non UTF-8 name");
            continue;
        };

        if filter.matches(&file_name) {
            tracing::debug!(%file_name, "Artifact qualifies");
            scan.qualifying.push(BuildArtifact { file_name, path });
        } else {
            tracing::debug!(%file_name, "Artifact rejected by filter");
            scan.rejected.push(file_name);
        }
    }

    scan.qualifying.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    scan.rejected.sort();
    Ok(scan)
}

/// Find every qualifying artifact in `dir`; an empty result is an error.
pub fn discover_artifacts(
    dir: &Path,
    filter: &ArtifactFilter,
) -> Result<Vec<BuildArtifact>, StageError> {
    let scan = scan_artifacts(dir, filter)?;
    if scan.qualifying.is_empty() {
        return Err(StageError::NoMatchingBuildArtifact {
            dir: dir.to_path_buf(),
        });
    }
    Ok(scan.qualifying)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plugin_jar_filter() {
        let filter = ArtifactFilter::plugin_jars();

        assert!(filter.matches("plugin-1.0.0.jar"));
        assert!(filter.matches("a.jar"));
        assert!(!filter.matches("plugin-1.0.0-sources.jar"));
        assert!(!filter.matches("plugin-1.0.0-javadoc.jar"));
        assert!(!filter.matches("plugin-1.0.0.zip"));
        assert!(!filter.matches("plugin.jar.bak"));
    }

    #[test]
    fn test_extra_deny_rule_excludes_name() {
        let filter = ArtifactFilter::plugin_jars().with_rule(SuffixRule::deny("-plain.jar"));

        assert!(!filter.matches("plugin-plain.jar"));
        assert!(filter.matches("plugin-all.jar"));
    }

    #[test]
    fn test_deny_wins_regardless_of_order() {
        let filter = ArtifactFilter::new(vec![
            SuffixRule::deny("-sources.jar"),
            SuffixRule::allow(".jar"),
        ]);
        assert!(!filter.matches("x-sources.jar"));
        assert!(filter.matches("x.jar"));
    }

    #[test]
    fn test_empty_table_matches_nothing() {
        let filter = ArtifactFilter::new(Vec::new());
        assert!(!filter.matches("plugin.jar"));
    }

    #[test]
    fn test_scan_sorts_and_ignores_directories() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        fs::write(tmp.path().join("b.jar"), "b").expect("write should succeed");
        fs::write(tmp.path().join("a.jar"), "a").expect("write should succeed");
        fs::write(tmp.path().join("a-sources.jar"), "s").expect("write should succeed");
        fs::create_dir_all(tmp.path().join("nested.jar")).expect("create_dir_all should succeed");

        let scan = scan_artifacts(tmp.path(), &ArtifactFilter::default())
            .expect("scan should succeed");
        let names: Vec<&str> = scan
            .qualifying
            .iter()
            .map(|artifact| artifact.file_name.as_str())
            .collect();

        assert_eq!(names, vec!["a.jar", "b.jar"]);
        assert_eq!(scan.rejected, vec!["a-sources.jar".to_string()]);
    }

    #[test]
    fn test_discover_missing_directory() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let dir = tmp.path().join("build").join("libs");

        let err = discover_artifacts(&dir, &ArtifactFilter::default()).unwrap_err();
        assert!(matches!(err, StageError::MissingBuildOutputDirectory { path } if path == dir));
    }

    #[test]
    fn test_discover_only_excluded_is_error() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        fs::write(tmp.path().join("plugin-sources.jar"), "s").expect("write should succeed");

        let err = discover_artifacts(tmp.path(), &ArtifactFilter::default()).unwrap_err();
        assert!(matches!(err, StageError::NoMatchingBuildArtifact { .. }));
    }
}
