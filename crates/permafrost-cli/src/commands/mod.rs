pub mod completions;
pub mod download;
pub mod setup;

use permafrost_core::{FreezeManager, FreezeOptions, MockEnvBuilder};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Build the freeze manager for the current working directory.
///
/// `PERMAFROST_INSTALLER=mock` swaps in the mock builder and installer so the
/// CLI can be exercised end to end without a Python toolchain.
pub fn make_manager(options: FreezeOptions) -> FreezeManager {
    if std::env::var("PERMAFROST_INSTALLER").as_deref() == Ok("mock") {
        FreezeManager::with_backends(".", options, Box::new(MockEnvBuilder), "mock")
    } else {
        FreezeManager::new(".", options)
    }
}
