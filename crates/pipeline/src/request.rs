/// A file attached to a mention event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Declared file type as reported by the platform (e.g. `pdf`, `png`).
    pub filetype: Option<String>,
    pub name: Option<String>,
    /// Download URL that requires the bot's own credentials.
    pub download_url: Option<String>,
}

/// One inbound mention, immutable for the lifetime of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub channel_id: String,
    pub user_id: String,
    /// Timestamp of the mentioning message; every reply threads under it.
    pub thread_ts: String,
    pub files: Vec<FileDescriptor>,
    pub text: Option<String>,
}

impl InboundRequest {
    /// Direct-message channels are identified by a `D` prefix.
    pub fn is_direct_message(&self) -> bool {
        self.channel_id.starts_with('D')
    }

    pub fn reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            channel_id: self.channel_id.clone(),
            thread_ts: self.thread_ts.clone(),
        }
    }
}

/// Where replies for a request are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub channel_id: String,
    pub thread_ts: String,
}
