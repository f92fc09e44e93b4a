//! Package installer adapters.
//!
//! [`Installer`] is the seam between the freeze state machine and pip. The
//! real adapter shells out to the environment's own interpreter with
//! `-Im pip` so resolution happens in isolated mode inside the venv; the
//! mock in [`crate::mock`] replays the same contract without a toolchain.

use crate::venv::{resolve_python_target, venv_root_of};
use crate::{render_command, run_checked, PythonError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;
use tracing::debug;

/// One environment's package installer.
pub trait Installer {
    /// Pass-through `pip install` with the given parameters.
    fn install(&self, params: &[&str]) -> Result<(), PythonError>;

    /// Install from requirement files, one `-r` flag per file in order.
    /// Adds `--no-index` when `use_index` is false and points pip at
    /// `requirements_folder` as a local find-links source when that folder
    /// exists.
    fn install_from_files(
        &self,
        req_files: &[PathBuf],
        use_index: bool,
        requirements_folder: &Path,
    ) -> Result<(), PythonError>;

    /// Capture `pip freeze` and write the pinned listing to `freeze_file`
    /// with line endings normalized to `\n`. The listing is fully buffered
    /// before the file is touched: on failure nothing is written and any
    /// existing file is left unchanged.
    fn freeze(&self, freeze_file: &Path) -> Result<(), PythonError>;

    /// `pip download -d download_dir` with the given extra parameters.
    fn download(&self, download_dir: &Path, params: &[&str]) -> Result<(), PythonError>;
}

/// Select an installer implementation by name: `pip` for the real adapter,
/// `mock` for a deterministic double that needs no Python toolchain.
pub fn select_installer(kind: &str, target: &Path) -> Result<Box<dyn Installer>, PythonError> {
    match kind {
        "pip" => Ok(Box::new(PipInstaller::new(target))),
        "mock" => Ok(Box::new(crate::mock::MockInstaller::new(target))),
        other => Err(PythonError::UnknownInstaller(other.to_owned())),
    }
}

/// Pip adapter bound to one environment's interpreter.
///
/// The interpreter is resolved once at construction: a directory target is
/// treated as a venv root and the platform executable inside it is used, a
/// file target is used directly. When the executable sits inside a venv the
/// adapter also exports `VIRTUAL_ENV` for tools that inspect it.
pub struct PipInstaller {
    python: PathBuf,
    venv_root: Option<PathBuf>,
}

impl PipInstaller {
    pub fn new(target: &Path) -> Self {
        let python = resolve_python_target(target);
        let venv_root = venv_root_of(&python);
        Self { python, venv_root }
    }

    fn pip_command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-Im", "pip", subcommand]);
        if let Some(root) = &self.venv_root {
            cmd.env("VIRTUAL_ENV", root);
        }
        cmd
    }
}

impl Installer for PipInstaller {
    fn install(&self, params: &[&str]) -> Result<(), PythonError> {
        let mut cmd = self.pip_command("install");
        cmd.args(params);
        run_checked(&mut cmd)
    }

    fn install_from_files(
        &self,
        req_files: &[PathBuf],
        use_index: bool,
        requirements_folder: &Path,
    ) -> Result<(), PythonError> {
        let mut cmd = self.pip_command("install");
        if !use_index {
            cmd.arg("--no-index");
        }
        if requirements_folder.is_dir() {
            cmd.arg("-f").arg(requirements_folder);
        }
        for file in req_files {
            cmd.arg("-r").arg(file);
        }
        run_checked(&mut cmd)
    }

    fn freeze(&self, freeze_file: &Path) -> Result<(), PythonError> {
        let mut cmd = self.pip_command("freeze");
        cmd.stderr(Stdio::inherit());
        let command = render_command(&cmd);
        debug!("running `{command}`");
        let output = cmd.output().map_err(|e| PythonError::Spawn {
            command: command.clone(),
            source: e,
        })?;
        if !output.status.success() {
            return Err(PythonError::CommandFailed {
                command,
                status: output.status,
            });
        }
        let listing = String::from_utf8_lossy(&output.stdout)
            .replace("\r\n", "\n")
            .replace('\r', "\n");
        let dir = freeze_file.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(listing.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(freeze_file)
            .map_err(|e| PythonError::Io(e.error))?;
        Ok(())
    }

    fn download(&self, download_dir: &Path, params: &[&str]) -> Result<(), PythonError> {
        let mut cmd = self.pip_command("download");
        cmd.arg("-d").arg(download_dir);
        cmd.args(params);
        run_checked(&mut cmd)
    }
}
