//! The `warden` management binary.

use std::path::Path;
use std::process::ExitCode;

use warden_cli::{default_registry, load_settings};
use warden_core::logging::setup_logging;
use warden_core::SETTINGS;

#[tokio::main]
async fn main() -> ExitCode {
    let registry = default_registry();
    let matches = registry.build_cli().get_matches();

    let settings_path = matches.get_one::<String>("settings").map(Path::new);
    let settings = match load_settings(settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.code());
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);
    SETTINGS.configure(settings);

    match registry.execute(&matches, SETTINGS.get()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), "command failed: {e}");
            eprintln!("error [{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
