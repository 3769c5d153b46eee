//! Slack side of the bridge: Socket Mode intake of `app_mention` events and
//! Web API replies.

pub mod api;
pub mod error;
pub mod event;
pub mod platform;
pub mod socket;

pub use {
    api::SlackApi,
    error::{Error, Result},
    event::MentionEvent,
    platform::SlackPlatform,
    socket::{SocketModeConfig, run_socket_mode},
};
