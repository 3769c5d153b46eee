//! OAuth 2.0 authorization-code flow with PKCE for installed apps: loopback
//! callback server, token exchange and refresh, and on-disk token storage.

pub mod callback_server;
pub mod error;
pub mod flow;
pub mod google;
pub mod pkce;
pub mod storage;
pub mod types;

pub use {
    callback_server::{CALLBACK_TIMEOUT, CallbackServer},
    flow::{AuthorizationRequest, OAuthFlow},
    google::GoogleClientSecret,
    storage::TokenStore,
    types::{OAuthConfig, OAuthTokens, PkceChallenge, serialize_option_secret, serialize_secret},
};

pub use error::{Error, Result};
