//! Python toolchain layer for Permafrost.
//!
//! Everything that touches an external process lives here: base interpreter
//! discovery, virtual environment creation through `python -m venv`, and the
//! [`Installer`] trait with its pip-backed and mock implementations. All
//! invocations are synchronous and block until the child exits; a nonzero
//! exit status is always an error, never a warning.

pub mod mock;
pub mod pip;
pub mod venv;

pub use mock::MockInstaller;
pub use pip::{select_installer, Installer, PipInstaller};
pub use venv::{
    create_venv, find_base_python, resolve_python_target, venv_python_exe, venv_root_of,
};

use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PythonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no python interpreter found (tried python3 and python; set PERMAFROST_PYTHON to override)")]
    InterpreterNotFound,

    #[error("unknown installer '{0}' (expected pip or mock)")]
    UnknownInstaller(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status})")]
    CommandFailed { command: String, status: ExitStatus },
}

/// Render a command line for log and error messages.
pub(crate) fn render_command(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Run a command to completion with inherited stdio, mapping a nonzero exit
/// status to [`PythonError::CommandFailed`].
pub(crate) fn run_checked(cmd: &mut Command) -> Result<(), PythonError> {
    let command = render_command(cmd);
    tracing::debug!("running `{command}`");
    let status = cmd.status().map_err(|e| PythonError::Spawn {
        command: command.clone(),
        source: e,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(PythonError::CommandFailed { command, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_program_and_args() {
        let mut cmd = Command::new("python3");
        cmd.args(["-Im", "pip", "install", "-r", "requirements.txt"]);
        assert_eq!(
            render_command(&cmd),
            "python3 -Im pip install -r requirements.txt"
        );
    }

    #[test]
    fn spawn_failure_names_the_command() {
        let mut cmd = Command::new("permafrost-no-such-binary");
        cmd.arg("--version");
        let err = run_checked(&mut cmd).unwrap_err();
        match err {
            PythonError::Spawn { command, .. } => {
                assert!(command.starts_with("permafrost-no-such-binary"));
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }
}
