use super::{json_pretty, make_manager, EXIT_SUCCESS};
use console::style;
use permafrost_core::{CoreError, FreezeOptions};
use std::path::Path;
use tracing::error;

pub fn run(env_dir: &Path, json: bool) -> Result<u8, String> {
    let manager = make_manager(FreezeOptions::default());
    match manager.download(env_dir) {
        Ok(()) => {
            let download_dir = manager.layout().download_dir();
            if json {
                let payload = serde_json::json!({
                    "download_dir": download_dir,
                    "status": "downloaded",
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!(
                    "{} frozen requirements downloaded into {}",
                    style("✓").green(),
                    download_dir.display()
                );
            }
            Ok(EXIT_SUCCESS)
        }
        // Recoverable by running setup, so it is reported without failing
        // the invocation.
        Err(e @ CoreError::NotFrozen { .. }) => {
            error!("{e}");
            Ok(EXIT_SUCCESS)
        }
        Err(e) => Err(e.to_string()),
    }
}
