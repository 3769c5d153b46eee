use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::PdfsqueezeConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "pdfsqueeze.toml",
    "pdfsqueeze.yaml",
    "pdfsqueeze.yml",
    "pdfsqueeze.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PdfsqueezeConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./pdfsqueeze.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/pdfsqueeze/pdfsqueeze.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PdfsqueezeConfig::default()` if no config file is found or the
/// one found cannot be parsed.
pub fn discover_and_load() -> PdfsqueezeConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return PdfsqueezeConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        PdfsqueezeConfig::default()
    })
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/pdfsqueeze/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pdfsqueeze").map(|d| d.config_dir().to_path_buf())
}

/// Apply the environment variables that take precedence over file values.
///
/// | variable | field |
/// |---|---|
/// | `SLACK_BOT_TOKEN` | `slack.bot_token` |
/// | `SLACK_APP_TOKEN` | `slack.app_token` |
/// | `GOOGLE_CLIENT_SECRET` | `drive.client_secret_path` |
/// | `PDFSQUEEZE_TOKEN_PATH` | `drive.token_path` |
/// | `PDFSQUEEZE_SCRATCH_DIR` | `pipeline.scratch_dir` |
/// | `PDFSQUEEZE_GHOSTSCRIPT` | `pipeline.ghostscript` |
pub fn apply_env_overrides(config: PdfsqueezeConfig) -> PdfsqueezeConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: PdfsqueezeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> PdfsqueezeConfig {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("SLACK_BOT_TOKEN") {
        config.slack.bot_token = Some(Secret::new(v));
    }
    if let Some(v) = var("SLACK_APP_TOKEN") {
        config.slack.app_token = Some(Secret::new(v));
    }
    if let Some(v) = var("GOOGLE_CLIENT_SECRET") {
        config.drive.client_secret_path = PathBuf::from(v);
    }
    if let Some(v) = var("PDFSQUEEZE_TOKEN_PATH") {
        config.drive.token_path = PathBuf::from(v);
    }
    if let Some(v) = var("PDFSQUEEZE_SCRATCH_DIR") {
        config.pipeline.scratch_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = var("PDFSQUEEZE_GHOSTSCRIPT") {
        config.pipeline.ghostscript = v;
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PdfsqueezeConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_each_format() {
        let dir = tempfile::tempdir().unwrap();
        let toml = write(
            dir.path(),
            "pdfsqueeze.toml",
            "[pipeline]\nghostscript = \"gswin64c\"\n",
        );
        let yaml = write(
            dir.path(),
            "pdfsqueeze.yaml",
            "pipeline:\n  ghostscript: gswin64c\n",
        );
        let json = write(
            dir.path(),
            "pdfsqueeze.json",
            r#"{"pipeline": {"ghostscript": "gswin64c"}}"#,
        );
        for path in [toml, yaml, json] {
            let cfg = load_config(&path).unwrap();
            assert_eq!(cfg.pipeline.ghostscript, "gswin64c", "{}", path.display());
        }
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "pdfsqueeze.ini", "x=1");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "pdfsqueeze.toml", "[drive]\ncallback_port = \"x\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut cfg = PdfsqueezeConfig::default();
        cfg.slack.bot_token = Some(Secret::new("xoxb-from-file".into()));

        let cfg = apply_env_overrides_with(cfg, |name| match name {
            "SLACK_BOT_TOKEN" => Some("xoxb-from-env".into()),
            "SLACK_APP_TOKEN" => Some("xapp-from-env".into()),
            "GOOGLE_CLIENT_SECRET" => Some("/etc/pdfsqueeze/secret.json".into()),
            "PDFSQUEEZE_TOKEN_PATH" => Some("/var/lib/pdfsqueeze/token.json".into()),
            "PDFSQUEEZE_SCRATCH_DIR" => Some("/scratch".into()),
            "PDFSQUEEZE_GHOSTSCRIPT" => Some("/usr/local/bin/gs".into()),
            _ => None,
        });

        assert_eq!(
            cfg.slack.bot_token.as_ref().unwrap().expose_secret(),
            "xoxb-from-env"
        );
        assert_eq!(
            cfg.slack.app_token.as_ref().unwrap().expose_secret(),
            "xapp-from-env"
        );
        assert_eq!(
            cfg.drive.client_secret_path,
            PathBuf::from("/etc/pdfsqueeze/secret.json")
        );
        assert_eq!(
            cfg.drive.token_path,
            PathBuf::from("/var/lib/pdfsqueeze/token.json")
        );
        assert_eq!(cfg.pipeline.scratch_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(cfg.pipeline.ghostscript, "/usr/local/bin/gs");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = PdfsqueezeConfig::default();
        cfg.slack.bot_token = Some(Secret::new("xoxb-from-file".into()));
        let cfg = apply_env_overrides_with(cfg, |_| Some("  ".into()));
        assert_eq!(
            cfg.slack.bot_token.as_ref().unwrap().expose_secret(),
            "xoxb-from-file"
        );
        assert_eq!(cfg.pipeline.ghostscript, "gs");
    }
}
