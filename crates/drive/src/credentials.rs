use std::time::Duration;

use {
    async_trait::async_trait,
    pdfsqueeze_oauth::{CALLBACK_TIMEOUT, CallbackServer, OAuthFlow, OAuthTokens, TokenStore},
    secrecy::Secret,
    tokio::sync::{Mutex, OnceCell},
    tracing::{info, warn},
};

use crate::{Error, Result, TOKEN_PROVIDER};

/// Refresh this long before the provider-reported expiry.
const REFRESH_SKEW: Duration = Duration::from_secs(60);

/// Supplies bearer tokens for Drive calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<Secret<String>>;
}

/// Drive credentials established on first use and kept for the life of the
/// process.
///
/// The first call loads the stored grant, or runs the interactive browser
/// flow when none is stored. Later calls reuse the in-memory tokens and
/// refresh them shortly before they expire, persisting each refresh.
pub struct LazyCredentials {
    flow: OAuthFlow,
    store: TokenStore,
    callback_port: u16,
    session: OnceCell<Mutex<OAuthTokens>>,
}

impl LazyCredentials {
    pub fn new(flow: OAuthFlow, store: TokenStore, callback_port: u16) -> Self {
        Self {
            flow,
            store,
            callback_port,
            session: OnceCell::new(),
        }
    }

    async fn establish(&self) -> Result<Mutex<OAuthTokens>> {
        if let Some(tokens) = self.store.load(TOKEN_PROVIDER) {
            info!(path = %self.store.path().display(), "using stored Drive authorization");
            return Ok(Mutex::new(tokens));
        }
        info!("no stored Drive authorization, starting browser flow");
        let tokens = authorize_interactively(&self.flow, &self.store, self.callback_port).await?;
        Ok(Mutex::new(tokens))
    }
}

#[async_trait]
impl TokenSource for LazyCredentials {
    async fn access_token(&self) -> Result<Secret<String>> {
        let session = self.session.get_or_try_init(|| self.establish()).await?;
        let mut tokens = session.lock().await;
        if !tokens.expires_within(REFRESH_SKEW) {
            return Ok(tokens.access_token.clone());
        }

        let refresh_token = tokens.refresh_token.clone().ok_or_else(|| {
            Error::message(
                "stored Drive token expired and has no refresh token; run `pdfsqueeze auth login`",
            )
        })?;
        let refreshed = self.flow.refresh(&refresh_token).await?;
        if let Err(e) = self.store.save(TOKEN_PROVIDER, &refreshed) {
            warn!(error = %e, "failed to persist refreshed Drive token");
        }
        *tokens = refreshed;
        Ok(tokens.access_token.clone())
    }
}

/// Run the authorization-code flow in the user's browser and persist the
/// resulting grant.
pub async fn authorize_interactively(
    flow: &OAuthFlow,
    store: &TokenStore,
    callback_port: u16,
) -> Result<OAuthTokens> {
    let server = CallbackServer::bind(callback_port).await?;
    let request = flow.start()?;

    info!(url = %request.url, "open this URL to authorize Google Drive access");
    if let Err(e) = open::that(&request.url) {
        warn!(error = %e, "could not open a browser; visit the URL manually");
    }

    let code = server
        .wait_for_code(&request.state, CALLBACK_TIMEOUT)
        .await?;
    let tokens = flow.exchange(&code, &request.pkce.verifier).await?;
    store.save(TOKEN_PROVIDER, &tokens)?;
    Ok(tokens)
}
