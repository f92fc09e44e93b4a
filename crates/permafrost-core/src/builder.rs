//! Environment builder seam.
//!
//! [`EnvBuilder`] hides how an environment comes into existence; the freeze
//! manager only learns about the result through the [`CreatedHook`] callback
//! it passes in. The real builder shells out to `python -m venv`, the mock
//! fabricates the directory skeleton so lifecycle tests run without a
//! toolchain.

use crate::CoreError;
use permafrost_python::{create_venv, find_base_python, venv_python_exe};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A freshly created environment, as handed to [`CreatedHook::on_created`].
#[derive(Debug, Clone)]
pub struct EnvContext {
    pub env_dir: PathBuf,
    pub env_exe: PathBuf,
}

/// Callback invoked exactly once after the environment directory exists,
/// while it is still empty of packages.
pub trait CreatedHook {
    fn on_created(&self, ctx: &EnvContext) -> Result<(), CoreError>;
}

/// Creates an environment from scratch at a given directory.
pub trait EnvBuilder {
    fn create(&self, env_dir: &Path, hook: &dyn CreatedHook) -> Result<(), CoreError>;
}

/// Builder backed by `python -m venv`.
pub struct VenvBuilder {
    symlinks: bool,
}

impl VenvBuilder {
    pub fn new(symlinks: bool) -> Self {
        Self { symlinks }
    }
}

impl EnvBuilder for VenvBuilder {
    fn create(&self, env_dir: &Path, hook: &dyn CreatedHook) -> Result<(), CoreError> {
        let python = find_base_python()?;
        info!("creating virtual environment at {}", env_dir.display());
        create_venv(&python, env_dir, self.symlinks)?;
        let ctx = EnvContext {
            env_dir: env_dir.to_path_buf(),
            env_exe: venv_python_exe(env_dir),
        };
        hook.on_created(&ctx)
    }
}

/// Builder double that fabricates a venv-shaped directory skeleton.
pub struct MockEnvBuilder;

impl EnvBuilder for MockEnvBuilder {
    fn create(&self, env_dir: &Path, hook: &dyn CreatedHook) -> Result<(), CoreError> {
        if env_dir.exists() {
            fs::remove_dir_all(env_dir)?;
        }
        let env_exe = venv_python_exe(env_dir);
        if let Some(bin_dir) = env_exe.parent() {
            fs::create_dir_all(bin_dir)?;
        }
        fs::write(&env_exe, "")?;
        fs::write(env_dir.join("pyvenv.cfg"), "include-system-site-packages = false\n")?;
        let ctx = EnvContext {
            env_dir: env_dir.to_path_buf(),
            env_exe,
        };
        hook.on_created(&ctx)
    }
}
