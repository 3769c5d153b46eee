use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::{debug, info},
    url::Url,
};

use crate::{
    Error, Result,
    pkce::{generate_pkce, generate_state},
    types::{OAuthConfig, OAuthTokens, PkceChallenge, unix_now},
};

/// Manages the OAuth 2.0 authorization code flow with PKCE.
pub struct OAuthFlow {
    config: OAuthConfig,
    client: reqwest::Client,
}

/// Result of starting the OAuth flow.
pub struct AuthorizationRequest {
    pub url: String,
    pub pkce: PkceChallenge,
    pub state: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: OAuthConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Build the authorization URL and generate PKCE + state.
    pub fn start(&self) -> Result<AuthorizationRequest> {
        let pkce = generate_pkce();
        let state = generate_state();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|source| Error::external("invalid auth_url", source))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("code_challenge", &pkce.challenge)
                .append_pair("code_challenge_method", "S256")
                .append_pair("state", &state);
            if !self.config.scopes.is_empty() {
                query.append_pair("scope", &self.config.scopes.join(" "));
            }
            for (key, value) in &self.config.extra_auth_params {
                query.append_pair(key, value);
            }
        }

        Ok(AuthorizationRequest {
            url: url.into(),
            pkce,
            state,
        })
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange(&self, code: &str, verifier: &str) -> Result<OAuthTokens> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("client_id", self.config.client_id.clone()),
            ("code_verifier", verifier.to_string()),
        ];
        self.push_client_secret(&mut form);

        let response = self.post_token(&form).await?;
        info!("authorization code exchanged");
        Ok(into_tokens(response, None))
    }

    /// Refresh an access token. The current refresh token is kept when the
    /// provider does not rotate it.
    pub async fn refresh(&self, refresh_token: &Secret<String>) -> Result<OAuthTokens> {
        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.expose_secret().clone()),
            ("client_id", self.config.client_id.clone()),
        ];
        self.push_client_secret(&mut form);

        let response = self.post_token(&form).await?;
        debug!("access token refreshed");
        Ok(into_tokens(response, Some(refresh_token)))
    }

    fn push_client_secret(&self, form: &mut Vec<(&'static str, String)>) {
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.expose_secret().clone()));
        }
    }

    async fn post_token(&self, form: &[(&'static str, String)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

fn into_tokens(response: TokenResponse, previous_refresh: Option<&Secret<String>>) -> OAuthTokens {
    OAuthTokens {
        access_token: Secret::new(response.access_token),
        refresh_token: response
            .refresh_token
            .map(Secret::new)
            .or_else(|| previous_refresh.cloned()),
        expires_at: response.expires_in.map(|secs| unix_now() + secs),
    }
}
