use super::{json_pretty, make_manager, EXIT_SUCCESS};
use console::style;
use permafrost_core::{FreezeOptions, SetupOutcome};
use std::path::Path;

pub fn run(env_dir: &Path, options: FreezeOptions, json: bool) -> Result<u8, String> {
    let manager = make_manager(options);
    let outcome = manager.setup(env_dir).map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "env_dir": env_dir,
            "freeze_file": manager.layout().freeze_file(),
            "outcome": match outcome {
                SetupOutcome::Reused => "reused",
                SetupOutcome::Rebuilt => "rebuilt",
            },
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        match outcome {
            SetupOutcome::Reused => println!(
                "{} environment {} is up to date",
                style("✓").green(),
                env_dir.display()
            ),
            SetupOutcome::Rebuilt => println!(
                "{} environment {} rebuilt and sealed",
                style("✓").green(),
                env_dir.display()
            ),
        }
    }
    Ok(EXIT_SUCCESS)
}
