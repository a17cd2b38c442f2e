//! WebSocket handler streaming research progress

use super::state::AppState;
use super::templates::markdown_to_html;
use crate::research::{progress_channel, ProgressEvent, ResearchError, ResearchOutput};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a research run
    Research { query: String },
    /// Ping for keepalive
    Ping,
}

/// Outgoing WebSocket message to client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// One progress line
    Progress {
        line: String,
        warning: bool,
        event: ProgressEvent,
    },
    /// Empty query notice; no run happened
    Advisory { message: String },
    /// Finished report
    Report {
        markdown: String,
        html: String,
        name: String,
        findings: usize,
        searches: usize,
    },
    /// Run aborted or bad request
    Error { message: String },
    /// Pong response
    Pong,
}

impl From<ProgressEvent> for ServerMessage {
    fn from(event: ProgressEvent) -> Self {
        ServerMessage::Progress {
            line: event.to_string(),
            warning: event.is_warning(),
            event,
        }
    }
}

impl From<Result<ResearchOutput, ResearchError>> for ServerMessage {
    fn from(outcome: Result<ResearchOutput, ResearchError>) -> Self {
        match outcome {
            Ok(ResearchOutput::Advisory(message)) => ServerMessage::Advisory { message },
            Ok(ResearchOutput::Completed(run)) => ServerMessage::Report {
                html: markdown_to_html(&run.report.markdown_report),
                name: run
                    .saved_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                findings: run.findings,
                searches: run.searches,
                markdown: run.report.markdown_report,
            },
            Err(e) => ServerMessage::Error {
                message: format!("❌ Error: {}", e),
            },
        }
    }
}

type Sender = SplitSink<WebSocket, Message>;

/// WebSocket handler
pub async fn research_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send one message; false once the client is gone
async fn send(sender: &mut Sender, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(json)).await.is_ok()
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let reply = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => ServerMessage::Pong,
            Ok(ClientMessage::Research { query }) => {
                match run_streaming(&state, &query, &mut sender).await {
                    Some(reply) => reply,
                    None => return,
                }
            }
            Err(e) => ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            },
        };

        if !send(&mut sender, &reply).await {
            return;
        }
    }
}

/// Run one query, forwarding progress as it happens
///
/// Returns `None` if the client disconnected, which drops the run and its
/// in-flight searches.
async fn run_streaming(state: &AppState, query: &str, sender: &mut Sender) -> Option<ServerMessage> {
    let (tx, mut rx) = progress_channel();
    let run = state.manager.run_with_progress(query, Some(tx));
    tokio::pin!(run);

    let outcome = loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                if !send(sender, &ServerMessage::from(event)).await {
                    tracing::info!("Client disconnected, abandoning research run");
                    return None;
                }
            }
            outcome = &mut run => break outcome,
        }
    };

    while let Ok(event) = rx.try_recv() {
        if !send(sender, &ServerMessage::from(event)).await {
            return None;
        }
    }

    Some(ServerMessage::from(outcome))
}
