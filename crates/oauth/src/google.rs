//! Google installed-app client secrets (`client_secret.json`).

use std::path::Path;

use {secrecy::Secret, serde::Deserialize};

use crate::{Error, Result, types::OAuthConfig};

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Client credentials from a Google Cloud console download.
#[derive(Clone, Deserialize)]
pub struct GoogleClientSecret {
    pub client_id: String,
    #[serde(default)]
    client_secret: Option<Secret<String>>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The console wraps credentials in `installed` or `web`.
#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<GoogleClientSecret>,
    web: Option<GoogleClientSecret>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URL.into()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URL.into()
}

impl GoogleClientSecret {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            Error::external(
                format!("failed to read client secret {}", path.display()),
                source,
            )
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(raw)?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::message("client secret has neither an `installed` nor a `web` section")
        })
    }

    /// OAuth config for an offline-access grant of `scopes`, redirecting to
    /// the loopback callback on `port`.
    pub fn oauth_config(&self, scopes: &[&str], port: u16) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_url: self.auth_uri.clone(),
            token_url: self.token_uri.clone(),
            redirect_uri: format!("http://127.0.0.1:{port}/auth/callback"),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
            extra_auth_params: vec![
                ("access_type".into(), "offline".into()),
                ("prompt".into(), "consent".into()),
            ],
        }
    }
}

impl std::fmt::Debug for GoogleClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleClientSecret")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
