//! Kodegen Bundler Deploy - package a published application for Linux and Windows.

use kodegen_bundler_deploy::cli;
use kodegen_bundler_deploy::cli::OutputManager;
use std::process;

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    )
    .init();

    match cli::run() {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new();
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.error_detail("");
                output.error_detail("Recovery suggestions:");
                for suggestion in suggestions {
                    output.error_detail(&format!("  {}", suggestion));
                }
            }

            process::exit(1);
        }
    }
}
