use {
    async_trait::async_trait,
    pdfsqueeze_pipeline::{ChatPlatform, InboundRequest, PlatformError, Reply, ReplyTarget},
};

use crate::{Error, api::SlackApi};

/// [`ChatPlatform`] backed by the Slack Web API.
#[derive(Debug)]
pub struct SlackPlatform {
    api: SlackApi,
}

impl SlackPlatform {
    pub fn new(api: SlackApi) -> Self {
        Self { api }
    }
}

fn to_platform_error(err: Error) -> PlatformError {
    match err {
        Error::Api { method, error } => PlatformError::api(method, error),
        other => PlatformError::external("slack web api", other),
    }
}

#[async_trait]
impl ChatPlatform for SlackPlatform {
    async fn send_reply(&self, target: &ReplyTarget, reply: &Reply) -> Result<(), PlatformError> {
        self.api
            .post_message(target, reply)
            .await
            .map_err(to_platform_error)
    }

    async fn destination_name(&self, request: &InboundRequest) -> Result<String, PlatformError> {
        let name = if request.is_direct_message() {
            self.api.user_name(&request.user_id).await
        } else {
            self.api.channel_name(&request.channel_id).await
        };
        name.map_err(to_platform_error)
    }
}
