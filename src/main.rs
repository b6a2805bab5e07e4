//! vidtask command-line entry point
//!
//! ```bash
//! vidtask run --config tasks.json
//! vidtask split --input talk.mp4 --output-name parts/talk --max-size 25MB
//! vidtask clip --input talk.mp4 --output-name clips/talk --interval 00:01:00-00:02:00
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use vidtask::cli::{commands, Cli};
use vidtask::config_initialization::initialize_configuration_hierarchy;
use vidtask::utils::logging::init_logging;

/// Exit status when a command could not run at all
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let layer = cli.settings_layer();
    let settings = match initialize_configuration_hierarchy(cli.settings.as_deref(), layer) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };
    init_logging(settings.log_level, settings.log_format);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting vidtask");

    match commands::execute(cli.command, &settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}
