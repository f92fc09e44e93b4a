//! Virtual environment creation and interpreter discovery.

use crate::{run_checked, PythonError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Environment variable that overrides base interpreter discovery.
pub const PYTHON_ENV_VAR: &str = "PERMAFROST_PYTHON";

/// Locate the base interpreter used to create new environments.
///
/// Honors the `PERMAFROST_PYTHON` override when set, then probes the
/// conventional interpreter names with `--version` and returns the first one
/// that runs successfully.
pub fn find_base_python() -> Result<PathBuf, PythonError> {
    if let Ok(exe) = std::env::var(PYTHON_ENV_VAR) {
        if !exe.is_empty() {
            debug!("using interpreter from {PYTHON_ENV_VAR}: {exe}");
            return Ok(PathBuf::from(exe));
        }
    }
    let candidates: &[&str] = if cfg!(windows) {
        &["python", "python3"]
    } else {
        &["python3", "python"]
    };
    for candidate in candidates {
        let probe = Command::new(candidate)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if probe.is_ok_and(|status| status.success()) {
            debug!("found base interpreter: {candidate}");
            return Ok(PathBuf::from(candidate));
        }
    }
    Err(PythonError::InterpreterNotFound)
}

/// Create a fresh virtual environment at `env_dir` with `python -m venv`.
///
/// `--clear` wipes any previous contents first, so creation always starts
/// from scratch. `symlinks` selects `--symlinks` over `--copies` where
/// symlinking is not the platform default.
pub fn create_venv(python: &Path, env_dir: &Path, symlinks: bool) -> Result<(), PythonError> {
    let mut cmd = Command::new(python);
    cmd.args(["-m", "venv", "--clear"]);
    cmd.arg(if symlinks { "--symlinks" } else { "--copies" });
    cmd.arg(env_dir);
    run_checked(&mut cmd)
}

/// Conventional interpreter path inside a venv: `bin/python3` on unix,
/// `Scripts\python.exe` on windows.
pub fn venv_python_exe(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("python.exe")
    } else {
        env_dir.join("bin").join("python3")
    }
}

/// Resolve an installer target to a concrete interpreter path. A directory is
/// treated as a venv root; a file path is used as-is.
pub fn resolve_python_target(target: &Path) -> PathBuf {
    if target.is_dir() {
        venv_python_exe(target)
    } else {
        target.to_path_buf()
    }
}

/// The venv root owning `python`, if the executable sits in a conventional
/// binary subfolder.
pub fn venv_root_of(python: &Path) -> Option<PathBuf> {
    let bin = python.parent()?;
    let name = bin.file_name()?.to_str()?;
    if name == "bin" || name == "Scripts" {
        bin.parent().map(Path::to_path_buf)
    } else {
        None
    }
}
