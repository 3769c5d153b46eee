use {anyhow::Result, clap::Subcommand};

use pdfsqueeze_config::{Severity, validate};

use crate::LoadedConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration and report errors/warnings.
    Check,
    /// Print the effective configuration with secrets redacted.
    Show,
}

pub fn handle_config(action: ConfigAction, loaded: &LoadedConfig) -> Result<()> {
    match action {
        ConfigAction::Check => check(loaded),
        ConfigAction::Show => {
            print!("{}", loaded.config.to_redacted_toml()?);
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(loaded: &LoadedConfig) -> Result<()> {
    let result = validate(&loaded.config, loaded.path.clone());

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
