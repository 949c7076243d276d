//! WebSocket transport and companion server.

use super::protocol::{Envelope, LeaderboardEntry, SyncError};
use super::receiver::{CompanionReceiver, Received};
use super::replicator::Transport;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Producer-side transport. Connects lazily and reconnects on the next send
/// after a failure.
pub struct WsTransport {
    url: String,
    stream: Option<ClientStream>,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), SyncError> {
        if self.stream.is_none() {
            let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
                .await
                .map_err(|e| SyncError::Transport(e.to_string()))?;
            info!(url = %self.url, "connected to companion");
            self.stream = Some(stream);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(SyncError::TransportClosed);
        };
        if let Err(e) = stream.send(Message::Binary(bytes)).await {
            self.stream = None;
            return Err(SyncError::Transport(e.to_string()));
        }
        Ok(())
    }
}

/// Accepts producer connections and feeds every message to `receiver`.
pub async fn start_companion_server(
    port: u16,
    receiver: Arc<Mutex<CompanionReceiver>>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(port, "companion listening on ws://localhost:{}", port);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, receiver).await {
                        warn!(%addr, error = %e, "companion connection error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "accept error");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    receiver: Arc<Mutex<CompanionReceiver>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!(%addr, "producer connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Binary(bytes)) => {
                let result = receiver.lock().await.receive_bytes(&bytes);
                match result {
                    Ok(Received::Applied { sequence }) => {
                        debug!(sequence, "applied snapshot");
                    }
                    Ok(Received::Stale { sequence }) => {
                        debug!(sequence, "stale snapshot discarded");
                    }
                    Ok(Received::LeaderboardRequested { leaderboard_id }) => {
                        let reply = local_leaderboard(&*receiver.lock().await);
                        debug!(%leaderboard_id, entries = reply.len(), "answering leaderboard request");
                        let bytes = Envelope::LeaderboardResponse { entries: reply }.encode()?;
                        ws_sender.send(Message::Binary(bytes)).await?;
                    }
                    Ok(Received::Leaderboard(entries)) => {
                        debug!(entries = entries.len(), "leaderboard received");
                    }
                    Err(e) => warn!(%addr, error = %e, "rejected message"),
                }
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    info!(%addr, "producer disconnected");
    Ok(())
}

/// A one-entry board holding the local player's score.
fn local_leaderboard(receiver: &CompanionReceiver) -> Vec<LeaderboardEntry> {
    match (receiver.state(), receiver.leaderboard_score()) {
        (Some(state), Some(score)) => vec![LeaderboardEntry {
            rank: 1,
            player_id: state.player_id.clone(),
            score,
        }],
        _ => Vec::new(),
    }
}
