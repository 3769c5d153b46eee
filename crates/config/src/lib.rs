//! Configuration loading, env substitution, overrides, and validation.
//!
//! Config files: `pdfsqueeze.toml`, `pdfsqueeze.yaml`, or `pdfsqueeze.json`
//! Searched in `./` then `~/.config/pdfsqueeze/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
    },
    schema::{DriveConfig, PdfsqueezeConfig, PipelineConfig, SlackConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
