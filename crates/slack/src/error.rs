#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Slack answered with `"ok": false`.
    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },

    #[error("{method} returned HTTP {status}")]
    Status { method: &'static str, status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
