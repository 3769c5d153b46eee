//! Fixed reply templates for every user-visible outcome.

use crate::resolver::Rejection;

const DOES_NOT_WORK_GIF: &str = "https://media0.giphy.com/media/3ofT5Mn9OWRL8PBR3G/giphy.gif";
const WRONG_LINK_GIF: &str = "https://media1.giphy.com/media/rGEIoqUoIMPylWCwpk/giphy.gif";
const WORKING_GIF: &str = "https://media3.giphy.com/media/tQliIp3sn1T44/giphy-downsized.gif";
const PROBLEM_GIF: &str = "https://media0.giphy.com/media/4Hx5nJBfi8FzFWxztb/giphy.gif";

/// Markdown section followed by an illustrative image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichBody {
    pub markdown: String,
    pub image_url: String,
    pub alt_text: String,
}

/// An outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Plain-text fallback (notifications, clients without block support).
    pub text: String,
    pub rich: Option<RichBody>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rich: None,
        }
    }

    fn illustrated(markdown: &str, image_url: &str, alt_text: &str) -> Self {
        Self {
            text: markdown.to_string(),
            rich: Some(RichBody {
                markdown: markdown.to_string(),
                image_url: image_url.to_string(),
                alt_text: alt_text.to_string(),
            }),
        }
    }

    pub fn rejection(reason: Rejection) -> Self {
        match reason {
            Rejection::TooManyAttachments => Self::illustrated(
                "Easy now... only one PDF at a time there cowboy...",
                DOES_NOT_WORK_GIF,
                "one at a time",
            ),
            Rejection::UnsupportedAttachment => Self::illustrated(
                "that doesn't work... no, just not gonna work...",
                DOES_NOT_WORK_GIF,
                "that doesn't work",
            ),
            Rejection::NoUsableLink => Self::illustrated(
                "this is not the right kind of link... ",
                WRONG_LINK_GIF,
                "wrong link",
            ),
        }
    }

    pub fn work_started() -> Self {
        Self::illustrated("working on that... ", WORKING_GIF, "compressing plans")
    }

    /// Final message carrying the shareable link (Slack `<url|label>` markup).
    pub fn done(link: &str) -> Self {
        Self::plain(format!(
            "Here's your optimized file: <{link}|Download it here>"
        ))
    }

    pub fn apology() -> Self {
        Self::illustrated("uh oh... we have a problem ", PROBLEM_GIF, "we have a problem")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rejection_is_illustrated() {
        for reason in [
            Rejection::TooManyAttachments,
            Rejection::UnsupportedAttachment,
            Rejection::NoUsableLink,
        ] {
            let reply = Reply::rejection(reason);
            let rich = reply.rich.expect("rejections carry an image");
            assert!(rich.image_url.starts_with("https://"));
            assert_eq!(rich.markdown, reply.text);
        }
    }

    #[test]
    fn rejection_texts_are_distinct() {
        let too_many = Reply::rejection(Rejection::TooManyAttachments).text;
        let unsupported = Reply::rejection(Rejection::UnsupportedAttachment).text;
        let no_link = Reply::rejection(Rejection::NoUsableLink).text;
        assert!(too_many.contains("only one PDF"));
        assert!(unsupported.contains("doesn't work"));
        assert!(no_link.contains("link"));
        assert_ne!(too_many, unsupported);
        assert_ne!(unsupported, no_link);
    }

    #[test]
    fn done_embeds_link() {
        let reply = Reply::done("https://drive.google.com/file/d/abc/view");
        assert_eq!(
            reply.text,
            "Here's your optimized file: <https://drive.google.com/file/d/abc/view|Download it here>"
        );
        assert!(reply.rich.is_none());
    }
}
