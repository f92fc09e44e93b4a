//! Freeze state machine: verify, rebuild, seal.
//!
//! An environment is only ever reused when its checksum record proves it was
//! built from the current freeze snapshot. Anything less (missing
//! environment, missing snapshot, missing record, stale record) routes
//! through the same from-scratch rebuild, so a crash at any point leaves the
//! next run to rebuild rather than trust a half-built environment. The
//! checksum record is written strictly last.

use crate::builder::{CreatedHook, EnvBuilder, EnvContext, VenvBuilder};
use crate::checksum::checksum_file;
use crate::layout::ProjectLayout;
use crate::CoreError;
use permafrost_python::select_installer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Verdict of the environment validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
}

/// Why an environment cannot be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The environment directory does not exist.
    MissingEnv,
    /// The project has no freeze snapshot yet.
    Unfrozen,
    /// The environment carries no checksum record.
    MissingChecksum,
    /// The checksum record no longer matches the freeze snapshot.
    ChecksumMismatch,
}

/// What `setup` did with the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The existing environment was proven valid and left untouched.
    Reused,
    /// The environment was recreated from scratch and sealed.
    Rebuilt,
}

/// Knobs for environment setup.
#[derive(Debug, Clone, Copy)]
pub struct FreezeOptions {
    /// Allow contacting the package index. Off means `--no-index`: install
    /// only from local sources such as the download cache.
    pub use_index: bool,
    /// Upgrade pip inside the fresh environment before installing.
    pub update_pip: bool,
    /// Upgrade setuptools inside the fresh environment before installing.
    pub update_setuptools: bool,
    /// Prefer symlinks when creating the venv.
    pub symlinks: bool,
}

impl Default for FreezeOptions {
    fn default() -> Self {
        Self {
            use_index: true,
            update_pip: false,
            update_setuptools: false,
            symlinks: false,
        }
    }
}

/// Drives the verify-or-rebuild lifecycle for one project directory.
///
/// The manager owns the project layout and delegates environment creation to
/// an [`EnvBuilder`]; it receives the fresh environment back through the
/// created-hook and performs install, freeze, and sealing there.
pub struct FreezeManager {
    layout: ProjectLayout,
    options: FreezeOptions,
    builder: Box<dyn EnvBuilder>,
    installer: String,
}

impl FreezeManager {
    /// Manager for `project_dir` using the venv builder and pip.
    pub fn new(project_dir: impl Into<PathBuf>, options: FreezeOptions) -> Self {
        let builder = Box::new(VenvBuilder::new(options.symlinks));
        Self::with_backends(project_dir, options, builder, "pip")
    }

    /// Manager with explicit builder and installer backends.
    pub fn with_backends(
        project_dir: impl Into<PathBuf>,
        options: FreezeOptions,
        builder: Box<dyn EnvBuilder>,
        installer: impl Into<String>,
    ) -> Self {
        Self {
            layout: ProjectLayout::new(project_dir),
            options,
            builder,
            installer: installer.into(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Classify the environment at `env_dir` without modifying anything.
    ///
    /// The ladder runs cheapest check first and stops at the first failure;
    /// the checksum comparison is byte-for-byte against the record's full
    /// content. Read errors on existing files propagate rather than
    /// classify.
    pub fn check(&self, env_dir: &Path) -> Result<Validity, CoreError> {
        if !env_dir.is_dir() {
            info!("no environment found at {}", env_dir.display());
            return Ok(Validity::Invalid(InvalidReason::MissingEnv));
        }
        if !self.layout.is_frozen() {
            info!("environment is not frozen yet");
            return Ok(Validity::Invalid(InvalidReason::Unfrozen));
        }
        info!("checking existing environment");
        let record_path = self.layout.checksum_file(env_dir);
        if !record_path.is_file() {
            info!("no checksum record found");
            return Ok(Validity::Invalid(InvalidReason::MissingChecksum));
        }
        let recorded = fs::read_to_string(&record_path)?;
        let current = checksum_file(&self.layout.freeze_file())?;
        if recorded != current {
            info!("freeze snapshot checksum changed");
            return Ok(Validity::Invalid(InvalidReason::ChecksumMismatch));
        }
        info!("environment is valid");
        Ok(Validity::Valid)
    }

    /// Bring the environment into a valid state, rebuilding only when the
    /// validity check fails. Safe to run any number of times.
    pub fn setup(&self, env_dir: &Path) -> Result<SetupOutcome, CoreError> {
        if self.check(env_dir)? == Validity::Valid {
            return Ok(SetupOutcome::Reused);
        }
        info!("recreating environment at {}", env_dir.display());
        self.builder.create(env_dir, self)?;
        Ok(SetupOutcome::Rebuilt)
    }

    /// Download every pinned requirement into the local cache folder.
    ///
    /// Requires an existing freeze snapshot: downloads mirror the sealed
    /// state, not the loose requirement files.
    pub fn download(&self, env_dir: &Path) -> Result<(), CoreError> {
        let freeze_file = self.layout.freeze_file();
        if !self.layout.is_frozen() {
            return Err(CoreError::NotFrozen { freeze_file });
        }
        let installer = select_installer(&self.installer, env_dir)?;
        let download_dir = self.layout.download_dir();
        info!(
            "downloading frozen requirements into {}",
            download_dir.display()
        );
        let freeze_arg = freeze_file.to_string_lossy();
        installer.download(&download_dir, &["-r", freeze_arg.as_ref()])?;
        Ok(())
    }
}

impl CreatedHook for FreezeManager {
    /// Populate and seal a freshly created environment.
    ///
    /// When a freeze snapshot already exists it is the only install source;
    /// requirement files are never consulted again once frozen. Otherwise
    /// the requirement files are installed and the result is captured as the
    /// new snapshot. Either way the checksum record is written only after
    /// every other step has succeeded.
    fn on_created(&self, ctx: &EnvContext) -> Result<(), CoreError> {
        let installer = select_installer(&self.installer, &ctx.env_exe)?;
        if self.options.update_setuptools {
            info!("updating setuptools");
            installer.install(&["-U", "setuptools"])?;
        }
        if self.options.update_pip {
            info!("updating pip");
            installer.install(&["-U", "pip"])?;
        }

        let freeze_file = self.layout.freeze_file();
        let download_dir = self.layout.download_dir();
        if self.layout.is_frozen() {
            info!("installing from freeze snapshot {}", freeze_file.display());
            installer.install_from_files(
                &[freeze_file.clone()],
                self.options.use_index,
                &download_dir,
            )?;
        } else {
            let req_files = self.layout.discover_requirements()?;
            if req_files.is_empty() {
                return Err(CoreError::NoRequirements {
                    dir: self.layout.root().to_path_buf(),
                });
            }
            info!("installing from {} requirement file(s)", req_files.len());
            installer.install_from_files(&req_files, self.options.use_index, &download_dir)?;
            info!("capturing freeze snapshot at {}", freeze_file.display());
            installer.freeze(&freeze_file)?;
        }

        let digest = checksum_file(&freeze_file)?;
        debug!("sealing environment with checksum {digest}");
        write_record(&self.layout.checksum_file(&ctx.env_dir), &digest)?;
        Ok(())
    }
}

/// Atomically write the checksum record, plain hex with no trailing newline.
fn write_record(path: &Path, digest: &str) -> Result<(), CoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(digest.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}
