//! `app_mention` payload as the pipeline needs it.

use {
    pdfsqueeze_pipeline::{FileDescriptor, InboundRequest},
    serde::Deserialize,
};

/// The fields of an `app_mention` event the bridge reads, in Slack's wire
/// shape.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    pub ts: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub files: Vec<MentionFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentionFile {
    #[serde(default)]
    pub filetype: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url_private_download: Option<String>,
}

impl MentionEvent {
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn into_request(self) -> InboundRequest {
        InboundRequest {
            channel_id: self.channel,
            user_id: self.user.unwrap_or_default(),
            thread_ts: self.ts,
            files: self
                .files
                .into_iter()
                .map(|f| FileDescriptor {
                    filetype: f.filetype,
                    name: f.name,
                    download_url: f.url_private_download,
                })
                .collect(),
            text: self.text,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn attachment_mention_maps_to_request() {
        let event = MentionEvent::from_value(json!({
            "type": "app_mention",
            "user": "U0ALICE",
            "text": "<@U0BOT> shrink please",
            "ts": "1712345678.000200",
            "channel": "C0PLANS",
            "event_ts": "1712345678.000200",
            "files": [{
                "id": "F0FILE",
                "name": "floor plan.pdf",
                "filetype": "pdf",
                "mimetype": "application/pdf",
                "url_private_download": "https://files.slack.com/files-pri/T1-F0FILE/download/floor%20plan.pdf"
            }]
        }))
        .unwrap();

        let request = event.into_request();
        assert_eq!(request.channel_id, "C0PLANS");
        assert_eq!(request.user_id, "U0ALICE");
        assert_eq!(request.thread_ts, "1712345678.000200");
        assert_eq!(request.text.as_deref(), Some("<@U0BOT> shrink please"));
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].filetype.as_deref(), Some("pdf"));
        assert_eq!(request.files[0].name.as_deref(), Some("floor plan.pdf"));
        assert!(
            request.files[0]
                .download_url
                .as_deref()
                .unwrap()
                .starts_with("https://files.slack.com/")
        );
    }

    #[test]
    fn text_only_mention_has_no_files() {
        let event = MentionEvent::from_value(json!({
            "user": "U0ALICE",
            "text": "<@U0BOT> https://example.com/a.pdf",
            "ts": "1.2",
            "channel": "D0DM"
        }))
        .unwrap();
        let request = event.into_request();
        assert!(request.files.is_empty());
        assert!(request.is_direct_message());
    }

    #[test]
    fn sender_metadata_does_not_filter_mentions() {
        let event = MentionEvent::from_value(json!({
            "bot_id": "B0OTHER",
            "user": "U0BOTUSER",
            "text": "<@U0BOT> https://example.com/a.pdf",
            "ts": "1.2",
            "channel": "C1"
        }))
        .unwrap();
        let request = event.into_request();
        assert_eq!(request.user_id, "U0BOTUSER");
        assert_eq!(request.text.as_deref(), Some("<@U0BOT> https://example.com/a.pdf"));
    }

    #[test]
    fn missing_channel_is_rejected() {
        assert!(MentionEvent::from_value(json!({"ts": "1.2"})).is_err());
    }
}
