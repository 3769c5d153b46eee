use std::time::{Duration, SystemTime, UNIX_EPOCH};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// OAuth 2.0 client configuration for one provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    /// Installed-app clients still carry a (non-confidential) secret that
    /// some providers require on the token endpoint.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_secret: Option<Secret<String>>,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Extra query parameters to include in the authorization URL.
    #[serde(default)]
    pub extra_auth_params: Vec<(String, String)>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("extra_auth_params", &self.extra_auth_params)
            .finish()
    }
}

/// Stored OAuth tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<Secret<String>>,
    /// Unix timestamp when the access token expires.
    pub expires_at: Option<u64>,
}

impl OAuthTokens {
    /// True when the access token expires within `skew` from now. Tokens
    /// without a known expiry are treated as valid.
    pub fn expires_within(&self, skew: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        unix_now().saturating_add(skew.as_secs()) >= expires_at
    }
}

impl std::fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// PKCE challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

/// Serialize a `Secret<String>` by exposing its inner value. Only for data
/// that must round-trip through storage.
pub fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

pub fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
