//! Freeze lifecycle engine for Permafrost.
//!
//! A project directory holds requirement files, a freeze snapshot
//! (`requirements.freeze`), and a managed virtual environment; the
//! environment carries a checksum record tying it to the snapshot it was
//! built from. [`FreezeManager`] verifies that pairing and rebuilds the
//! environment from scratch whenever it cannot prove the environment
//! matches the snapshot.

pub mod builder;
pub mod checksum;
pub mod freezer;
pub mod layout;

pub use builder::{CreatedHook, EnvBuilder, EnvContext, MockEnvBuilder, VenvBuilder};
pub use checksum::checksum_file;
pub use freezer::{FreezeManager, FreezeOptions, InvalidReason, SetupOutcome, Validity};
pub use layout::{
    ProjectLayout, CHECKSUM_FILENAME, DOWNLOAD_DIRNAME, FREEZE_FILENAME, REQUIREMENT_PATTERNS,
};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("python error: {0}")]
    Python(#[from] permafrost_python::PythonError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment is not frozen (missing {}); run setup first", .freeze_file.display())]
    NotFrozen { freeze_file: PathBuf },

    #[error("no requirement files found in {}", .dir.display())]
    NoRequirements { dir: PathBuf },
}
