use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    axum::{Router, extract::Query, response::Html, routing::get},
    tokio::{net::TcpListener, sync::oneshot},
    tracing::{info, warn},
};

use crate::{Error, Result};

/// How long the browser round-trip may take.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

type CodeSender = oneshot::Sender<std::result::Result<String, String>>;

/// One-shot loopback server receiving the authorization redirect.
pub struct CallbackServer {
    listener: TcpListener,
}

impl CallbackServer {
    /// Bind `127.0.0.1:{port}`. Binding happens before the browser is opened
    /// so a busy port fails fast.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.map_err(|source| {
            Error::external(format!("failed to bind callback port {port}"), source)
        })?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Serve `GET /auth/callback` until one request carrying `state` arrives,
    /// then return its `code`.
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let tx: Arc<Mutex<Option<CodeSender>>> = Arc::new(Mutex::new(Some(tx)));
        let expected_state = expected_state.to_string();

        let app = Router::new().route(
            "/auth/callback",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let outcome = check_callback(&params, &expected_state);
                let page = match &outcome {
                    Ok(_) => Html(
                        "<h1>Authorized</h1><p>You can close this window.</p>".to_string(),
                    ),
                    Err(reason) => Html(format!("<h1>Authorization failed</h1><p>{reason}</p>")),
                };
                let sender = tx.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(sender) = sender {
                    let _ = sender.send(outcome);
                }
                async move { page }
            }),
        );

        let port = self.port()?;
        info!(port, "waiting for authorization callback");

        // The server drains the in-flight response before resolving, so the
        // browser always gets its page.
        let (relay_tx, relay_rx) = oneshot::channel();
        let shutdown = async move {
            let _ = relay_tx.send(rx.await);
        };
        let server = axum::serve(self.listener, app).with_graceful_shutdown(shutdown);

        tokio::select! {
            served = server.into_future() => served?,
            _ = tokio::time::sleep(timeout) => {
                return Err(Error::callback(format!(
                    "no callback within {}s",
                    timeout.as_secs()
                )));
            },
        }

        match relay_rx.await {
            Ok(Ok(Ok(code))) => Ok(code),
            Ok(Ok(Err(reason))) => {
                warn!(reason = %reason, "authorization callback rejected");
                Err(Error::callback(reason))
            },
            _ => Err(Error::callback("callback server exited unexpectedly")),
        }
    }
}

fn check_callback(
    params: &HashMap<String, String>,
    expected_state: &str,
) -> std::result::Result<String, String> {
    if let Some(error) = params.get("error") {
        return Err(format!("provider returned error: {error}"));
    }
    match params.get("state") {
        Some(state) if state == expected_state => {},
        Some(_) => return Err("state mismatch".into()),
        None => return Err("missing state".into()),
    }
    params
        .get("code")
        .filter(|c| !c.is_empty())
        .cloned()
        .ok_or_else(|| "missing code".into())
}
