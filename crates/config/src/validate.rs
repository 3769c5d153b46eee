//! Semantic checks on a loaded configuration.
//!
//! Parsing already rejects malformed files; this catches values that parse
//! but would make the bridge fail at startup or at first use.

use std::path::PathBuf;

use secrecy::{ExposeSecret, Secret};

use crate::schema::PdfsqueezeConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. `slack.app_token`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded config. `config_path` is only recorded for reporting.
pub fn validate(config: &PdfsqueezeConfig, config_path: Option<PathBuf>) -> ValidationResult {
    let mut result = ValidationResult {
        diagnostics: Vec::new(),
        config_path,
    };

    check_token(
        &mut result,
        "slack.bot_token",
        config.slack.bot_token.as_ref(),
        "xoxb-",
        "SLACK_BOT_TOKEN",
    );
    check_token(
        &mut result,
        "slack.app_token",
        config.slack.app_token.as_ref(),
        "xapp-",
        "SLACK_APP_TOKEN",
    );

    if config.slack.platform_domain.trim().is_empty() {
        result.push(
            Severity::Warning,
            "slack.platform_domain",
            "empty; shared links will never be downloaded with the bot token",
        );
    }

    if config.drive.callback_port == 0 {
        result.push(
            Severity::Error,
            "drive.callback_port",
            "must be a fixed port registered as a redirect URI",
        );
    }

    if config.pipeline.ghostscript.trim().is_empty() {
        result.push(
            Severity::Error,
            "pipeline.ghostscript",
            "ghostscript program must not be empty",
        );
    }

    result
}

fn check_token(
    result: &mut ValidationResult,
    path: &str,
    token: Option<&Secret<String>>,
    prefix: &str,
    env_var: &str,
) {
    let Some(token) = token.map(|t| t.expose_secret().trim()).filter(|t| !t.is_empty()) else {
        result.push(
            Severity::Error,
            path,
            format!("missing; set it in the config file or via {env_var}"),
        );
        return;
    };

    if token.contains("${") {
        result.push(
            Severity::Error,
            path,
            "contains an unresolved ${...} placeholder",
        );
    } else if !token.starts_with(prefix) {
        result.push(
            Severity::Warning,
            path,
            format!("expected a token starting with `{prefix}`"),
        );
    }
}
