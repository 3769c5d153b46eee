use std::error::Error as StdError;

use async_trait::async_trait;

use crate::{
    replies::Reply,
    request::{InboundRequest, ReplyTarget},
};

/// Faults raised by the chat platform's own API.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The platform answered but refused the call.
    #[error("{method} failed: {error}")]
    Api { method: String, error: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl PlatformError {
    #[must_use]
    pub fn api(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            error: error.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// The chat platform as seen by the pipeline.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a threaded reply.
    async fn send_reply(&self, target: &ReplyTarget, reply: &Reply) -> Result<(), PlatformError>;

    /// Display name the request's artifacts are filed under: the user's name
    /// for direct messages, the channel's name otherwise.
    async fn destination_name(&self, request: &InboundRequest) -> Result<String, PlatformError>;
}
