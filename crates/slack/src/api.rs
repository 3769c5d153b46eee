//! Minimal Slack Web API client for the three methods the bridge calls.

use {
    pdfsqueeze_pipeline::{Reply, ReplyTarget},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{Error, Result};

/// Every Web API response shares this envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: Option<T>,
}

#[derive(Deserialize)]
struct UserInfo {
    user: NamedObject,
}

#[derive(Deserialize)]
struct ChannelInfo {
    channel: NamedObject,
}

#[derive(Deserialize)]
struct NamedObject {
    name: String,
}

#[derive(Deserialize)]
struct Ignored {}

pub struct SlackApi {
    http: reqwest::Client,
    api_base: String,
    bot_token: Secret<String>,
}

impl std::fmt::Debug for SlackApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackApi")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

impl SlackApi {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        bot_token: Secret<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token,
        }
    }

    /// `chat.postMessage`, threaded under `target.thread_ts`.
    pub async fn post_message(&self, target: &ReplyTarget, reply: &Reply) -> Result<()> {
        let mut payload = json!({
            "channel": target.channel_id,
            "thread_ts": target.thread_ts,
            "text": reply.text,
        });
        if let Some(blocks) = reply_blocks(reply)
            && let Some(obj) = payload.as_object_mut()
        {
            obj.insert("blocks".into(), blocks);
        }

        let request = self
            .http
            .post(self.url("chat.postMessage"))
            .json(&payload);
        let _: Ignored = self.call("chat.postMessage", request).await?;
        debug!(channel = %target.channel_id, "reply posted");
        Ok(())
    }

    /// `users.info` → the user's handle.
    pub async fn user_name(&self, user_id: &str) -> Result<String> {
        let request = self
            .http
            .get(self.url("users.info"))
            .query(&[("user", user_id)]);
        let info: UserInfo = self.call("users.info", request).await?;
        Ok(info.user.name)
    }

    /// `conversations.info` → the channel's name.
    pub async fn channel_name(&self, channel_id: &str) -> Result<String> {
        let request = self
            .http
            .get(self.url("conversations.info"))
            .query(&[("channel", channel_id)]);
        let info: ChannelInfo = self.call("conversations.info", request).await?;
        Ok(info.channel.name)
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                method,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.ok {
            return Err(Error::Api {
                method,
                error: envelope.error.unwrap_or_else(|| "unknown_error".into()),
            });
        }
        envelope.body.ok_or_else(|| Error::Api {
            method,
            error: "unexpected response shape".into(),
        })
    }
}

/// Section + image blocks for illustrated replies.
fn reply_blocks(reply: &Reply) -> Option<Value> {
    let rich = reply.rich.as_ref()?;
    Some(json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": rich.markdown },
        },
        {
            "type": "image",
            "image_url": rich.image_url,
            "alt_text": rich.alt_text,
        },
    ]))
}
