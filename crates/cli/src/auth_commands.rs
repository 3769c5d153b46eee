use std::time::{SystemTime, UNIX_EPOCH};

use {
    anyhow::Result,
    clap::Subcommand,
    pdfsqueeze_config::PdfsqueezeConfig,
    pdfsqueeze_drive::{TOKEN_PROVIDER, authorize_interactively},
    pdfsqueeze_oauth::{OAuthTokens, TokenStore},
};

use crate::bridge::drive_flow;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Authorize Google Drive access in the browser and store the grant.
    Login,
    /// Show whether a Drive grant is stored and when it expires.
    Status,
    /// Remove the stored Drive grant.
    Logout,
}

pub async fn handle_auth(action: AuthAction, config: &PdfsqueezeConfig) -> Result<()> {
    let store = TokenStore::with_path(&config.drive.token_path);
    match action {
        AuthAction::Login => login(config, &store).await,
        AuthAction::Status => status(&store),
        AuthAction::Logout => logout(&store),
    }
}

async fn login(config: &PdfsqueezeConfig, store: &TokenStore) -> Result<()> {
    let flow = drive_flow(config, reqwest::Client::new())?;
    let port = config.drive.callback_port;

    println!("Waiting for callback on http://127.0.0.1:{port}/auth/callback ...");
    let tokens = authorize_interactively(&flow, store, port).await?;

    println!("Stored Google Drive grant in {}", store.path().display());
    if tokens.refresh_token.is_none() {
        println!("warning: no refresh token was issued; the grant cannot be renewed");
    }
    Ok(())
}

fn status(store: &TokenStore) -> Result<()> {
    let lines = status_lines(store, now());
    if lines.is_empty() {
        println!(
            "Not authorized. Run `pdfsqueeze auth login` (looked in {}).",
            store.path().display()
        );
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// One line per grant in the token file, Drive's included.
fn status_lines(store: &TokenStore, now: u64) -> Vec<String> {
    store
        .list()
        .into_iter()
        .filter_map(|provider| {
            let tokens = store.load(&provider)?;
            Some(format!("{provider} [{}]", describe_expiry(&tokens, now)))
        })
        .collect()
}

fn logout(store: &TokenStore) -> Result<()> {
    if store.delete(TOKEN_PROVIDER)? {
        println!("Removed Google Drive grant from {}", store.path().display());
    } else {
        println!("No Google Drive grant stored.");
    }
    Ok(())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn describe_expiry(tokens: &OAuthTokens, now: u64) -> String {
    let renewable = if tokens.refresh_token.is_some() {
        ", renewable"
    } else {
        ""
    };
    match tokens.expires_at {
        None => format!("expiry unknown{renewable}"),
        Some(ts) if ts > now => {
            let remaining = ts - now;
            let hours = remaining / 3600;
            let mins = (remaining % 3600) / 60;
            format!("valid ({hours}h {mins}m remaining){renewable}")
        },
        Some(_) => format!("expired{renewable}"),
    }
}
