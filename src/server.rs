//! WebSocket event channel and static asset hosting
//!
//! Each WebSocket connection gets its own session: a writer task drains
//! pipeline narration into JSON text frames while the reader loop waits for
//! `run_test` requests. Requests on one connection run strictly one after
//! another; separate connections run independently and share nothing.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    client::GatewayProbeClient,
    config::Config,
    error::Result,
    events::{ChannelSink, ClientEvent, EventSink, FanoutSink, LogEvent, ServerEvent, TerminalEcho},
    pipeline::DiagnosticPipeline,
};

/// Shared state handed to every connection
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<DiagnosticPipeline>,
    config: Arc<Config>,
}

impl AppState {
    /// Create the shared state for the router
    pub fn new(pipeline: Arc<DiagnosticPipeline>, config: Arc<Config>) -> Self {
        Self { pipeline, config }
    }
}

/// Build the application router: the event channel endpoint plus static
/// hosting for the bundled web console
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.server.public_dir);

    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until a shutdown signal arrives
pub async fn serve(config: Config) -> Result<()> {
    let client = Arc::new(GatewayProbeClient::new());
    let pipeline = Arc::new(DiagnosticPipeline::new(client, config.pipeline.clone()));
    let config = Arc::new(config);
    let state = AppState::new(pipeline, Arc::clone(&config));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    print_banner(local.port(), config.server.enable_color);
    info!(address = %local, "server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let session_id = Uuid::new_v4();
    info!(%session_id, "event channel connected");
    ws.on_upgrade(move |socket| session(socket, state, session_id))
}

/// Drive one event channel session to completion
async fn session(socket: WebSocket, state: AppState, session_id: Uuid) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<LogEvent>();

    // Writer task: narration drains into JSON text frames until the channel
    // closes or the peer goes away.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&ServerEvent::Log(event)) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!("failed to serialize log event: {}", error);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let sink = build_sink(tx, &state);

    while let Some(message) = ws_rx.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                debug!(%session_id, "event channel read error: {}", error);
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::RunTest(request)) => {
                    info!(
                        %session_id,
                        gateway = request.gateway(),
                        location = %request.location,
                        "run_test received"
                    );
                    state.pipeline.run(&request, sink.as_ref()).await;
                }
                Err(error) => {
                    debug!(%session_id, "ignoring unrecognized frame: {}", error);
                }
            },
            Message::Close(_) => break,
            // Ping/pong and binary frames need no application response
            _ => {}
        }
    }

    // Dropping the sink closes the channel, which lets the writer finish
    // draining and exit.
    drop(sink);
    let _ = writer.await;
    info!(%session_id, "event channel closed");
}

/// Assemble the narration sink for one session
fn build_sink(tx: UnboundedSender<LogEvent>, state: &AppState) -> Box<dyn EventSink> {
    if state.config.server.echo_sessions {
        let mut fanout = FanoutSink::new();
        fanout.push(Box::new(ChannelSink::new(tx)));
        fanout.push(Box::new(TerminalEcho::new(state.config.server.enable_color)));
        Box::new(fanout)
    } else {
        Box::new(ChannelSink::new(tx))
    }
}

/// Print the startup banner
fn print_banner(port: u16, use_color: bool) {
    use colored::Colorize;

    let border = "=========================================";
    let lines = [
        border.to_string(),
        format!("PRO-AGENT SERVER ACTIVE ON PORT {}", port),
        format!("URL: http://localhost:{}", port),
        border.to_string(),
    ];

    println!();
    for line in lines {
        if use_color {
            println!("    {}", line.green().bold());
        } else {
            println!("    {}", line);
        }
    }
    println!();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(error) => {
            warn!("failed to install ctrl-c handler: {}", error);
            // Without a signal handler there is nothing to wait for
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogColor;

    fn test_state(echo: bool) -> AppState {
        let mut config = Config::default();
        config.server.echo_sessions = echo;
        config.server.enable_color = false;
        let client = Arc::new(GatewayProbeClient::new());
        let pipeline = Arc::new(DiagnosticPipeline::new(client, config.pipeline.clone()));
        AppState::new(pipeline, Arc::new(config))
    }

    #[test]
    fn test_router_builds() {
        let _router = router(test_state(false));
    }

    #[test]
    fn test_build_sink_forwards_to_channel() {
        let state = test_state(false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = build_sink(tx, &state);

        sink.emit(LogEvent::with_color("hello", LogColor::Info));
        let received = rx.try_recv().unwrap();
        assert_eq!(received.message, "hello");
    }

    #[test]
    fn test_build_sink_with_echo_still_forwards() {
        let state = test_state(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = build_sink(tx, &state);

        sink.emit(LogEvent::plain("mirrored"));
        assert_eq!(rx.try_recv().unwrap().message, "mirrored");
    }
}
