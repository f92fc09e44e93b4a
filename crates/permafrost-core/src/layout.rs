//! Project directory layout and requirement file discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pinned snapshot of everything installed into the environment.
pub const FREEZE_FILENAME: &str = "requirements.freeze";
/// Checksum record stored inside the environment directory.
pub const CHECKSUM_FILENAME: &str = "requirements.sha256";
/// Local package cache used for offline installs.
pub const DOWNLOAD_DIRNAME: &str = "requirements";
/// Requirement file patterns, expanded in order. A single `*` wildcard per
/// pattern is supported.
pub const REQUIREMENT_PATTERNS: &[&str] = &["requirements.txt", "requirements.*.txt"];

/// Where a project keeps its requirement inputs, freeze snapshot, and
/// download cache. All paths derive from one project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn freeze_file(&self) -> PathBuf {
        self.root.join(FREEZE_FILENAME)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.root.join(DOWNLOAD_DIRNAME)
    }

    /// The checksum record lives inside the environment it seals, so it is
    /// destroyed together with the environment.
    pub fn checksum_file(&self, env_dir: &Path) -> PathBuf {
        env_dir.join(CHECKSUM_FILENAME)
    }

    /// A project is frozen once its freeze snapshot exists.
    pub fn is_frozen(&self) -> bool {
        self.freeze_file().is_file()
    }

    /// Expand every requirement pattern against the project root.
    ///
    /// Patterns are processed in [`REQUIREMENT_PATTERNS`] order and matches
    /// are sorted within each pattern, so the result is deterministic for a
    /// given directory content. Patterns that match nothing contribute
    /// nothing.
    pub fn discover_requirements(&self) -> Result<Vec<PathBuf>, io::Error> {
        let mut found = Vec::new();
        for pattern in REQUIREMENT_PATTERNS {
            let mut matches = self.expand_pattern(pattern)?;
            matches.sort();
            found.append(&mut matches);
        }
        Ok(found)
    }

    fn expand_pattern(&self, pattern: &str) -> Result<Vec<PathBuf>, io::Error> {
        let Some((prefix, suffix)) = pattern.split_once('*') else {
            let literal = self.root.join(pattern);
            return Ok(if literal.is_file() { vec![literal] } else { Vec::new() });
        };
        let mut matches = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
                && entry.file_type()?.is_file()
            {
                matches.push(self.root.join(name));
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with(files: &[&str]) -> (tempfile::TempDir, ProjectLayout) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            fs::write(dir.path().join(file), "").unwrap();
        }
        let layout = ProjectLayout::new(dir.path());
        (dir, layout)
    }

    fn names(found: &[PathBuf]) -> Vec<String> {
        found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn literal_pattern_comes_before_wildcard_matches() {
        let (_dir, layout) = layout_with(&[
            "requirements.dev.txt",
            "requirements.txt",
            "requirements.ci.txt",
        ]);
        let found = layout.discover_requirements().unwrap();
        assert_eq!(
            names(&found),
            ["requirements.txt", "requirements.ci.txt", "requirements.dev.txt"]
        );
    }

    #[test]
    fn wildcard_matches_are_sorted() {
        let (_dir, layout) = layout_with(&["requirements.zz.txt", "requirements.aa.txt"]);
        let found = layout.discover_requirements().unwrap();
        assert_eq!(names(&found), ["requirements.aa.txt", "requirements.zz.txt"]);
    }

    #[test]
    fn wildcard_does_not_rematch_the_literal() {
        let (_dir, layout) = layout_with(&["requirements.txt"]);
        let found = layout.discover_requirements().unwrap();
        assert_eq!(names(&found), ["requirements.txt"]);
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let (dir, layout) = layout_with(&["requirements.freeze", "setup.py", "notes.txt"]);
        fs::create_dir(dir.path().join("requirements")).unwrap();
        fs::create_dir(dir.path().join("requirements.local.txt")).unwrap();
        let found = layout.discover_requirements().unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn empty_project_discovers_nothing() {
        let (_dir, layout) = layout_with(&[]);
        assert!(layout.discover_requirements().unwrap().is_empty());
    }

    #[test]
    fn frozen_means_the_snapshot_file_exists() {
        let (dir, layout) = layout_with(&[]);
        assert!(!layout.is_frozen());
        fs::write(dir.path().join(FREEZE_FILENAME), "alpha==1.0\n").unwrap();
        assert!(layout.is_frozen());
    }

    #[test]
    fn checksum_record_sits_inside_the_env() {
        let layout = ProjectLayout::new("/proj");
        assert_eq!(
            layout.checksum_file(Path::new("/proj/venv")),
            Path::new("/proj/venv/requirements.sha256")
        );
    }
}
