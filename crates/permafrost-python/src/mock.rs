//! Deterministic installer double for exercising the freeze lifecycle
//! without a Python toolchain.
//!
//! The mock keeps its state under the environment directory the same way a
//! real venv owns its site-packages: requirement files are "resolved" into
//! pinned lines stored in `.mock-installed`, `freeze` replays them, and
//! `download` drops one artifact marker per pinned package. Every call is
//! appended to `.mock-pip-log` so tests can assert on what was invoked.

use crate::pip::Installer;
use crate::venv::venv_root_of;
use crate::PythonError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Invocation log filename, one line per installer call.
pub const MOCK_LOG_FILENAME: &str = ".mock-pip-log";

const INSTALLED_FILENAME: &str = ".mock-installed";

pub struct MockInstaller {
    env_dir: PathBuf,
}

impl MockInstaller {
    /// Accepts the same targets as the pip adapter: a venv directory, or an
    /// interpreter path from which the venv root is derived.
    pub fn new(target: &Path) -> Self {
        let env_dir = if target.is_dir() {
            target.to_path_buf()
        } else {
            venv_root_of(target).unwrap_or_else(|| target.to_path_buf())
        };
        Self { env_dir }
    }

    fn log(&self, line: &str) -> Result<(), PythonError> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.env_dir.join(MOCK_LOG_FILENAME))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn installed_file(&self) -> PathBuf {
        self.env_dir.join(INSTALLED_FILENAME)
    }

    /// Pin a loose requirement line the way a resolver would.
    fn pin(line: &str) -> String {
        if line.contains("==") {
            line.to_owned()
        } else {
            format!("{line}==0.0.0")
        }
    }
}

impl Installer for MockInstaller {
    fn install(&self, params: &[&str]) -> Result<(), PythonError> {
        self.log(&format!("install {}", params.join(" ")))
    }

    fn install_from_files(
        &self,
        req_files: &[PathBuf],
        use_index: bool,
        requirements_folder: &Path,
    ) -> Result<(), PythonError> {
        let mut rendered = vec!["install-files".to_owned()];
        if !use_index {
            rendered.push("--no-index".to_owned());
        }
        if requirements_folder.is_dir() {
            rendered.push("-f".to_owned());
            rendered.push(requirements_folder.display().to_string());
        }
        let mut pinned = Vec::new();
        for file in req_files {
            rendered.push("-r".to_owned());
            rendered.push(file.display().to_string());
            for line in fs::read_to_string(file)?.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                pinned.push(Self::pin(line));
            }
        }
        pinned.sort();
        pinned.dedup();
        let mut listing = pinned.join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        fs::write(self.installed_file(), listing)?;
        self.log(&rendered.join(" "))
    }

    fn freeze(&self, freeze_file: &Path) -> Result<(), PythonError> {
        let listing = match fs::read_to_string(self.installed_file()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        fs::write(freeze_file, listing)?;
        self.log(&format!("freeze {}", freeze_file.display()))
    }

    fn download(&self, download_dir: &Path, params: &[&str]) -> Result<(), PythonError> {
        fs::create_dir_all(download_dir)?;
        let mut iter = params.iter();
        while let Some(param) = iter.next() {
            if *param != "-r" {
                continue;
            }
            let Some(source) = iter.next() else { break };
            for line in fs::read_to_string(source)?.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let artifact = format!("{}.tar.gz", line.replace("==", "-"));
                fs::write(download_dir.join(artifact), "")?;
            }
        }
        self.log(&format!("download -d {} {}", download_dir.display(), params.join(" ")))
    }
}
