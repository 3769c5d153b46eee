//! Decides which PDF a mention refers to.
//!
//! Resolution is pure classification over event data: attachments win over
//! links, exactly one attachment is accepted, and a link is only usable when
//! its path ends in `.pdf`.

use url::Url;

use crate::request::{FileDescriptor, InboundRequest};

/// Filename used when an attachment carries no declared name.
const FALLBACK_FILENAME: &str = "document.pdf";

/// How the acquirer should fetch a resolved source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMethod {
    /// Plain GET without credentials.
    Direct,
    /// GET carrying the bot's bearer token (chat platform hosted files).
    Authenticated,
}

/// The single acquisition target chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub locator: Url,
    pub filename: String,
    pub method: AcquisitionMethod,
}

impl ResolvedSource {
    /// Name the compressed artifact is published under.
    pub fn output_filename(&self) -> String {
        compressed_filename(&self.filename)
    }
}

/// Why a request was turned away before any I/O happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("too many attachments")]
    TooManyAttachments,
    #[error("unsupported attachment type")]
    UnsupportedAttachment,
    #[error("no usable link")]
    NoUsableLink,
}

/// Classifies inbound requests into a [`ResolvedSource`] or a [`Rejection`].
#[derive(Debug, Clone)]
pub struct InputResolver {
    platform_domain: String,
}

impl InputResolver {
    /// `platform_domain` is the chat platform's own domain (e.g. `slack.com`);
    /// links under it are fetched with the bot's credentials.
    pub fn new(platform_domain: impl Into<String>) -> Self {
        Self {
            platform_domain: platform_domain.into().to_ascii_lowercase(),
        }
    }

    pub fn resolve(&self, request: &InboundRequest) -> Result<ResolvedSource, Rejection> {
        match request.files.as_slice() {
            [] => self.resolve_link(request.text.as_deref().unwrap_or_default()),
            [file] => self.resolve_attachment(file),
            _ => Err(Rejection::TooManyAttachments),
        }
    }

    fn resolve_link(&self, text: &str) -> Result<ResolvedSource, Rejection> {
        let raw = extract_url(text).ok_or(Rejection::NoUsableLink)?;
        let locator = Url::parse(raw).map_err(|_| Rejection::NoUsableLink)?;
        if !is_pdf_url(&locator) {
            return Err(Rejection::NoUsableLink);
        }

        let filename = locator
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| segment.to_string())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

        Ok(ResolvedSource {
            method: self.method_for(&locator),
            locator,
            filename,
        })
    }

    fn resolve_attachment(&self, file: &FileDescriptor) -> Result<ResolvedSource, Rejection> {
        let is_pdf = file
            .filetype
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(Rejection::UnsupportedAttachment);
        }

        let locator = file
            .download_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .ok_or(Rejection::UnsupportedAttachment)?;

        let filename = file
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

        Ok(ResolvedSource {
            method: self.method_for(&locator),
            locator,
            filename,
        })
    }

    /// Only locators on the platform's own domain get the bot credential,
    /// whether they came from an attachment or a link.
    fn method_for(&self, locator: &Url) -> AcquisitionMethod {
        if locator
            .host_str()
            .is_some_and(|host| host_in_domain(host, &self.platform_domain))
        {
            AcquisitionMethod::Authenticated
        } else {
            AcquisitionMethod::Direct
        }
    }
}

/// Return the first `http://` or `https://` URL in `text`, verbatim.
///
/// The URL ends at whitespace or at one of Slack's link delimiters
/// (`<`, `>`, `|`).
pub fn extract_url(text: &str) -> Option<&str> {
    let start = text.match_indices("http").find_map(|(idx, _)| {
        let rest = &text[idx + 4..];
        (rest.starts_with("://") || rest.starts_with("s://")).then_some(idx)
    })?;

    let candidate = &text[start..];
    let end = candidate
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '|'))
        .unwrap_or(candidate.len());
    let url = &candidate[..end];

    let scheme_len = if url.starts_with("https://") { 8 } else { 7 };
    (url.len() > scheme_len).then_some(url)
}

/// Whether the URL path ends in `.pdf`, ignoring case. Query and fragment
/// are not considered.
pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Strip a trailing `.pdf` (any case) and append `_cmp.pdf`.
pub fn compressed_filename(name: &str) -> String {
    let stem = name
        .len()
        .checked_sub(4)
        .and_then(|split| {
            let suffix = name.get(split..)?;
            suffix
                .eq_ignore_ascii_case(".pdf")
                .then(|| name.get(..split))
                .flatten()
        })
        .unwrap_or(name);
    format!("{stem}_cmp.pdf")
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
