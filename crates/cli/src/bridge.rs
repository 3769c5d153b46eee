//! Wires config into the running Slack bridge.

use std::sync::Arc;

use {
    anyhow::{Context, Result, bail},
    pdfsqueeze_config::{PdfsqueezeConfig, Severity, validate},
    pdfsqueeze_drive::{DRIVE_FILE_SCOPE, DriveStorage, LazyCredentials},
    pdfsqueeze_oauth::{GoogleClientSecret, OAuthFlow, TokenStore},
    pdfsqueeze_pipeline::{
        Acquirer, DialogueController, GhostscriptCompressor, InputResolver, Publisher,
    },
    pdfsqueeze_slack::{SlackApi, SlackPlatform, SocketModeConfig, run_socket_mode},
    tracing::{error, info, warn},
};

use crate::LoadedConfig;

pub async fn run(loaded: LoadedConfig) -> Result<()> {
    let report = validate(&loaded.config, loaded.path.clone());
    for d in &report.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
        }
    }
    if report.has_errors() {
        bail!(
            "configuration has {} error(s); run `pdfsqueeze config check`",
            report.count(Severity::Error)
        );
    }

    let config = loaded.config;
    let (Some(bot_token), Some(app_token)) =
        (config.slack.bot_token.clone(), config.slack.app_token.clone())
    else {
        bail!("slack bot and app tokens are required");
    };

    let http = reqwest::Client::new();
    let controller = Arc::new(build_controller(&config, http)?);
    info!(
        scratch = %config.pipeline.scratch_root().display(),
        ghostscript = %config.pipeline.ghostscript,
        "pipeline ready"
    );

    run_socket_mode(
        SocketModeConfig {
            bot_token,
            app_token,
        },
        controller,
    )
    .await
}

/// Drive OAuth flow for the configured client secret.
pub fn drive_flow(config: &PdfsqueezeConfig, http: reqwest::Client) -> Result<OAuthFlow> {
    let path = &config.drive.client_secret_path;
    let secret = GoogleClientSecret::load(path)
        .with_context(|| format!("loading Google client secret from {}", path.display()))?;
    let oauth = secret.oauth_config(&[DRIVE_FILE_SCOPE], config.drive.callback_port);
    Ok(OAuthFlow::with_client(oauth, http))
}

fn build_controller(
    config: &PdfsqueezeConfig,
    http: reqwest::Client,
) -> Result<DialogueController> {
    let Some(bot_token) = config.slack.bot_token.clone() else {
        bail!("slack bot token is required");
    };

    // The Drive session itself is established on the first publish.
    let credentials = Arc::new(LazyCredentials::new(
        drive_flow(config, http.clone())?,
        TokenStore::with_path(&config.drive.token_path),
        config.drive.callback_port,
    ));
    let storage = Arc::new(DriveStorage::new(
        http.clone(),
        config.drive.api_base.clone(),
        credentials,
    ));
    let platform = Arc::new(SlackPlatform::new(SlackApi::new(
        http.clone(),
        config.slack.api_base.clone(),
        bot_token.clone(),
    )));

    Ok(DialogueController::new(
        platform,
        InputResolver::new(config.slack.platform_domain.clone()),
        Acquirer::new(http, bot_token),
        Arc::new(GhostscriptCompressor::new(&config.pipeline.ghostscript)),
        Publisher::with_link_host(storage, config.drive.link_host.clone()),
        config.pipeline.scratch_root(),
    ))
}
