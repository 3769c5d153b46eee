//! Socket Mode intake for Slack.
//!
//! Uses slack-morphism's socket mode listener to receive events over a
//! WebSocket, so the bridge needs no public HTTP endpoint.

use std::sync::Arc;

use {
    anyhow::Result,
    pdfsqueeze_pipeline::DialogueController,
    secrecy::{ExposeSecret, Secret},
    slack_morphism::prelude::*,
    tracing::{debug, info, warn},
};

use crate::event::MentionEvent;

/// Tokens for the Socket Mode connection.
pub struct SocketModeConfig {
    /// Bot token (`xoxb-`), used for `auth.test`.
    pub bot_token: Secret<String>,
    /// App-level token (`xapp-`), used to open the socket.
    pub app_token: Secret<String>,
}

/// Shared state for socket mode callbacks.
#[derive(Clone)]
struct BridgeState {
    controller: Arc<DialogueController>,
}

/// Connect and dispatch mentions to `controller` until the process is asked
/// to stop.
pub async fn run_socket_mode(
    config: SocketModeConfig,
    controller: Arc<DialogueController>,
) -> Result<()> {
    let client = Arc::new(SlackClient::new(SlackClientHyperConnector::new()?));

    let bot_token = SlackApiToken::new(config.bot_token.expose_secret().clone().into());
    let auth_test = client.open_session(&bot_token).auth_test().await?;
    info!(
        bot_user_id = %auth_test.user_id,
        bot_user = ?auth_test.user,
        "slack bot authenticated"
    );

    let callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_events);
    let listener_env = Arc::new(
        SlackClientEventsListenerEnvironment::new(Arc::clone(&client))
            .with_user_state(BridgeState { controller }),
    );
    let socket_listener = SlackClientSocketModeListener::new(
        &SlackClientSocketModeConfig::new(),
        listener_env,
        callbacks,
    );

    let app_token = SlackApiToken::new(config.app_token.expose_secret().clone().into());
    socket_listener.listen_for(&app_token).await?;
    info!("socket mode connected, waiting for mentions");

    socket_listener.serve().await;
    info!("socket mode listener stopped");
    Ok(())
}

async fn handle_push_events(
    event: SlackPushEventCallback,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let controller = {
        let guard = states.read().await;
        let state = guard
            .get_user_state::<BridgeState>()
            .ok_or("missing bridge state")?;
        Arc::clone(&state.controller)
    };

    match &event.event {
        SlackEventCallbackBody::AppMention(mention) => dispatch_mention(controller, mention),
        SlackEventCallbackBody::Message(message) => {
            if message.sender.bot_id.is_none() && message.subtype.is_none() {
                debug!(channel = ?message.origin.channel, "ignoring plain message");
            }
        },
        _ => debug!("ignoring event callback type"),
    }
    Ok(())
}

/// Decode the mention and run the pipeline on its own task so the socket
/// acknowledgement is not held up.
fn dispatch_mention(controller: Arc<DialogueController>, mention: &SlackAppMentionEvent) {
    let event = match serde_json::to_value(mention).and_then(MentionEvent::from_value) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "failed to decode app_mention event");
            return;
        },
    };
    let request = event.into_request();
    tokio::spawn(async move {
        let report = controller.handle(request).await;
        debug!(
            job_id = %report.job_id,
            outcome = ?report.terminal(),
            "mention handled"
        );
    });
}
