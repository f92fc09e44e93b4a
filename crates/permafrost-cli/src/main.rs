mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::EXIT_FAILURE;
use permafrost_core::FreezeOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "permafrost",
    version,
    about = "Reproducible Python virtual environments with frozen, checksummed dependencies"
)]
struct Cli {
    /// Path to the managed virtual environment directory.
    #[arg(short, long, default_value = "venv", global = true)]
    path: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Verify the environment and rebuild it from requirements when needed.
    Setup {
        /// Upgrade pip inside a freshly created environment.
        #[arg(long, default_value_t = false)]
        update_pip: bool,
        /// Upgrade setuptools inside a freshly created environment.
        #[arg(long, default_value_t = false)]
        update_setuptools: bool,
        /// Prefer symlinks when creating the environment.
        #[arg(long, default_value_t = false)]
        symlinks: bool,
        /// Never contact the package index; install from local sources only.
        #[arg(long, default_value_t = false)]
        no_index: bool,
    },
    /// Download all frozen requirements into the local package cache.
    Download,
    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Setup {
            update_pip: false,
            update_setuptools: false,
            symlinks: false,
            no_index: false,
        }
    }
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // Logs go to stderr so stdout stays parseable under --json.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PERMAFROST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command.unwrap_or_default() {
        Commands::Setup {
            update_pip,
            update_setuptools,
            symlinks,
            no_index,
        } => {
            let options = FreezeOptions {
                use_index: !no_index,
                update_pip,
                update_setuptools,
                symlinks,
            };
            commands::setup::run(&cli.path, options, cli.json)
        }
        Commands::Download => commands::download::run(&cli.path, cli.json),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
