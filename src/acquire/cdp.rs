//! Minimal Chrome DevTools Protocol client.
//!
//! Speaks just enough CDP over a WebSocket to drive a remote browser:
//! create a page target, attach to it, navigate, evaluate JavaScript, and
//! close the target again. Commands are issued strictly one at a time, so a
//! single read loop that skips protocol events while waiting for the
//! matching response id is all the plumbing required.

use futures_util::{SinkExt, StreamExt};
use miette::Diagnostic;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Errors from the DevTools wire protocol.
#[derive(Debug, Error, Diagnostic)]
pub enum CdpError {
    /// WebSocket connect, send, or receive failure.
    #[error("devtools websocket error: {0}")]
    #[diagnostic(code(gistsmith::cdp::websocket))]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The browser rejected a command.
    #[error("devtools command {method} failed: {message}")]
    #[diagnostic(code(gistsmith::cdp::command))]
    Command { method: String, message: String },

    /// The connection closed while a response was outstanding.
    #[error("devtools connection closed while awaiting response to {method}")]
    #[diagnostic(code(gistsmith::cdp::closed))]
    ConnectionClosed { method: String },

    /// A frame could not be parsed as a protocol message.
    #[error("malformed devtools frame: {0}")]
    #[diagnostic(code(gistsmith::cdp::frame))]
    Frame(#[from] serde_json::Error),

    /// A command response was missing an expected field.
    #[error("devtools response to {method} lacked field {field}")]
    #[diagnostic(code(gistsmith::cdp::shape))]
    MissingField {
        method: &'static str,
        field: &'static str,
    },
}

/// One live DevTools connection.
///
/// The connection owns the socket; commands borrow it mutably, which makes
/// the one-outstanding-command discipline a compile-time property.
pub struct CdpConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl CdpConnection {
    /// Connects to a DevTools WebSocket endpoint.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let (socket, _response) = connect_async(endpoint).await?;
        tracing::debug!("devtools connection established");
        Ok(Self { socket, next_id: 0 })
    }

    /// Issues a browser-level command and awaits its response.
    pub async fn command(&mut self, method: &str, params: Value) -> Result<Value, CdpError> {
        self.send_command(method, params, None).await
    }

    /// Issues a command scoped to an attached target session.
    pub async fn session_command(
        &mut self,
        session_id: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, CdpError> {
        self.send_command(method, params, Some(session_id)).await
    }

    /// Closes the underlying socket. Errors are ignored: by this point the
    /// scrape outcome is already decided.
    pub async fn close(mut self) {
        let _ = self.socket.close(None).await;
    }

    async fn send_command(
        &mut self,
        method: &str,
        params: Value,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        self.next_id += 1;
        let id = self.next_id;

        let mut frame = json!({
            "id": id,
            "method": method,
            "params": params,
        });
        if let Some(session_id) = session_id {
            frame["sessionId"] = json!(session_id);
        }

        self.socket
            .send(Message::Text(frame.to_string().into()))
            .await?;

        // Skip events and stale frames until the matching response arrives.
        while let Some(incoming) = self.socket.next().await {
            let message = incoming?;
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => {
                    return Err(CdpError::ConnectionClosed {
                        method: method.to_string(),
                    });
                }
                _ => continue,
            };

            let reply: Value = serde_json::from_str(text.as_str())?;
            if reply.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }

            if let Some(error) = reply.get("error") {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(CdpError::Command {
                    method: method.to_string(),
                    message,
                });
            }

            return Ok(reply.get("result").cloned().unwrap_or(Value::Null));
        }

        Err(CdpError::ConnectionClosed {
            method: method.to_string(),
        })
    }
}

/// A page target attached on top of a [`CdpConnection`].
pub struct PageSession {
    target_id: String,
    session_id: String,
}

impl PageSession {
    /// Creates a blank page target and attaches to it in flat mode.
    pub async fn open(connection: &mut CdpConnection) -> Result<Self, CdpError> {
        let created = connection
            .command("Target.createTarget", json!({ "url": "about:blank" }))
            .await?;
        let target_id = created
            .get("targetId")
            .and_then(Value::as_str)
            .ok_or(CdpError::MissingField {
                method: "Target.createTarget",
                field: "targetId",
            })?
            .to_string();

        let attached = connection
            .command(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
            )
            .await?;
        let session_id = attached
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(CdpError::MissingField {
                method: "Target.attachToTarget",
                field: "sessionId",
            })?
            .to_string();

        connection
            .session_command(&session_id, "Page.enable", json!({}))
            .await?;

        Ok(Self {
            target_id,
            session_id,
        })
    }

    /// Navigates the page.
    pub async fn navigate(
        &self,
        connection: &mut CdpConnection,
        url: &str,
    ) -> Result<(), CdpError> {
        connection
            .session_command(&self.session_id, "Page.navigate", json!({ "url": url }))
            .await?;
        Ok(())
    }

    /// Evaluates a JavaScript expression, returning its value by copy.
    pub async fn evaluate(
        &self,
        connection: &mut CdpConnection,
        expression: &str,
    ) -> Result<Value, CdpError> {
        let result = connection
            .session_command(
                &self.session_id,
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Closes the page target. Best-effort: the connection may already be
    /// torn down when this runs on a failure path.
    pub async fn close(self, connection: &mut CdpConnection) {
        let result = connection
            .command("Target.closeTarget", json!({ "targetId": self.target_id }))
            .await;
        if let Err(err) = result {
            tracing::debug!(error = %err, "failed to close devtools target");
        }
    }
}
