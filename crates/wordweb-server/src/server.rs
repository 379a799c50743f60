//! WebSocket server implementation.
//!
//! Accepts client connections, routes JSON-RPC requests to the handlers and
//! forwards session broadcasts to every client.

use crate::handlers::{
    handle_back, handle_clear_error, handle_expand, handle_load, handle_reset,
    handle_set_max_nodes, handle_set_max_related, handle_snapshot, handle_stats,
    handle_toggle_physics,
};
use crate::protocol::{LimitParams, PhysicsParams, Request, Response, WordParams};
use crate::SharedExplorer;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, watch, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use wordweb_session::{Explorer, Phase, SessionEvent, Snapshot, WordSource};

pub const DEFAULT_PORT: u16 = 7540;

const BROADCAST_CAPACITY: usize = 256;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::local(DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// Loopback only.
    pub fn local(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
        }
    }

    /// All interfaces, for containers and remote UIs.
    pub fn headless(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        }
    }
}

/// Messages pushed to every connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum BroadcastMessage {
    /// The full session state after a change.
    GraphUpdate(Snapshot),
    /// A lookup started.
    Loading(LoadingPayload),
    /// A navigation failed; the graph was left as it was.
    Failed(FailedPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadingPayload {
    pub word: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedPayload {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionHandle
// ─────────────────────────────────────────────────────────────────────────────

/// A cloneable handle to the shared session and its broadcast channel.
///
/// The explorer lock is held for the whole of a lookup, so reads go through
/// `state`, the last committed snapshot, instead.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) explorer: SharedExplorer,
    state: Arc<watch::Sender<Snapshot>>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
}

impl SessionHandle {
    /// The last committed session state. Never waits on a lookup.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Pushes a snapshot to every client.
    pub fn publish(&self, snapshot: Snapshot) {
        let _ = self.broadcast_tx.send(BroadcastMessage::GraphUpdate(snapshot));
    }

    /// Returns a receiver for server broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Flags the cached state as loading. Called with the explorer lock held.
    pub(crate) fn mark_loading(&self) {
        self.state.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.phase = Phase::Loading;
        });
    }

    /// Stores the state left by a handler, publishing it when it changed.
    pub(crate) fn commit(&self, snapshot: Snapshot, changed: bool) {
        self.state.send_replace(snapshot.clone());
        if changed {
            self.publish(snapshot);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WordWebServer
// ─────────────────────────────────────────────────────────────────────────────

/// The WordWeb WebSocket server.
pub struct WordWebServer {
    config: ServerConfig,
    session: SessionHandle,
}

impl WordWebServer {
    /// Creates a server around an explorer. The explorer may already be loaded.
    pub fn new(explorer: Explorer<Box<dyn WordSource>>, config: ServerConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (state, _) = watch::channel(explorer.snapshot());

        Self {
            config,
            session: SessionHandle {
                explorer: Arc::new(Mutex::new(explorer)),
                state: Arc::new(state),
                broadcast_tx,
            },
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns a cloneable handle to the session.
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Returns a broadcast receiver for server messages.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.session.subscribe()
    }

    /// Binds the configured address and serves forever.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.addr).await?;
        info!("WordWeb server listening on ws://{}", self.config.addr);
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let events = self.session.explorer.lock().await.subscribe();
        tokio::spawn(forward_session_events(
            events,
            self.session.broadcast_tx.clone(),
        ));

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let session = self.session.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, addr, session).await {
                            warn!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Relays lookup progress and failures from the session to clients.
///
/// Graph changes are published by the handlers themselves, with the
/// snapshot taken under the same lock as the change.
async fn forward_session_events(
    mut events: broadcast::Receiver<SessionEvent>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
) {
    loop {
        let message = match events.recv().await {
            Ok(SessionEvent::Loading { word }) => {
                BroadcastMessage::Loading(LoadingPayload { word })
            }
            Ok(SessionEvent::Failed { message }) => {
                BroadcastMessage::Failed(FailedPayload { message })
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Session event relay lagged by {} events", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let _ = broadcast_tx.send(message);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client Connection Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Handles a single WebSocket client connection.
async fn handle_client(
    stream: TcpStream,
    addr: SocketAddr,
    session: SessionHandle,
) -> Result<(), ServerError> {
    let mut broadcast_rx = session.subscribe();
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    info!("WebSocket connection established with {}", addr);

    let json = serde_json::to_string(&BroadcastMessage::GraphUpdate(session.snapshot()))?;
    write.send(Message::Text(json)).await?;
    debug!("Sent initial snapshot to {}", addr);

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = process_message(&text, &session).await;
                        let json = serde_json::to_string(&response)?;
                        write.send(Message::Text(json)).await?;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("Message error from {}: {}", addr, e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            msg = broadcast_rx.recv() => {
                match msg {
                    Ok(broadcast) => {
                        let json = serde_json::to_string(&broadcast)?;
                        if write.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client {} lagged by {} messages", addr, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

/// Processes a JSON-RPC message and returns a response.
pub(crate) async fn process_message(text: &str, session: &SessionHandle) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    if !request.jsonrpc.is_empty() && request.jsonrpc != "2.0" {
        return Response::invalid_request(id);
    }

    let method = request.method.as_str();
    debug!("Processing method: {}", method);

    match method {
        "session.snapshot" => handle_snapshot(session, id).await,
        "graph.stats" => handle_stats(session, id).await,

        "navigate.load" => match serde_json::from_value::<WordParams>(request.params) {
            Ok(params) => handle_load(session, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "navigate.expand" => match serde_json::from_value::<WordParams>(request.params) {
            Ok(params) => handle_expand(session, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "navigate.back" => handle_back(session, id).await,
        "navigate.reset" => handle_reset(session, id).await,

        "settings.set_max_nodes" => match serde_json::from_value::<LimitParams>(request.params) {
            Ok(params) => handle_set_max_nodes(session, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "settings.set_max_related" => match serde_json::from_value::<LimitParams>(request.params)
        {
            Ok(params) => handle_set_max_related(session, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "settings.toggle_physics" => {
            let params = if request.params.is_null() {
                Ok(PhysicsParams::default())
            } else {
                serde_json::from_value::<PhysicsParams>(request.params)
            };
            match params {
                Ok(params) => handle_toggle_physics(session, id, params).await,
                Err(e) => Response::invalid_params(id, e.to_string()),
            }
        }

        "error.clear" => handle_clear_error(session, id).await,

        _ => Response::method_not_found(id, method),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND, NAVIGATION_FAILED, PARSE_ERROR};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wordweb_session::{ExplorerConfig, Settings, StaticSource};

    fn test_server() -> WordWebServer {
        let source: Box<dyn WordSource> = Box::new(StaticSource::builtin());
        let explorer = Explorer::new(source, ExplorerConfig::default(), Settings::default());
        WordWebServer::new(explorer, ServerConfig::local(0))
    }

    async fn call(session: &SessionHandle, method: &str, params: Value) -> Value {
        let request = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
        let response = process_message(&request.to_string(), session).await;
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let session = test_server().handle();

        let response = process_message("not json", &session).await;
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);

        let response = call(&session, "graph.delete", Value::Null).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = call(&session, "navigate.load", json!({})).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_load_replies_and_broadcasts() {
        let server = test_server();
        let session = server.handle();
        let mut updates = server.subscribe();

        let response = call(&session, "navigate.load", json!({"word": "Kitap"})).await;

        assert_eq!(response["result"]["centerId"], "kitap");
        assert_eq!(response["result"]["phase"], "loaded");
        assert!(response["result"]["nodes"].as_array().unwrap().len() > 1);
        assert!(matches!(
            updates.try_recv(),
            Ok(BroadcastMessage::GraphUpdate(snapshot)) if snapshot.center_id.as_deref() == Some("kitap")
        ));
    }

    #[tokio::test]
    async fn test_navigation_and_back() {
        let session = test_server().handle();

        call(&session, "navigate.load", json!({"word": "kitap"})).await;
        let response = call(&session, "navigate.expand", json!({"word": "roman"})).await;
        assert_eq!(response["result"]["history"], json!(["kitap", "roman"]));

        let response = call(&session, "navigate.back", Value::Null).await;
        assert_eq!(response["result"]["centerId"], "kitap");
        assert_eq!(response["result"]["history"], json!(["kitap"]));

        let response = call(&session, "graph.stats", Value::Null).await;
        assert_eq!(response["result"]["visitedCount"], 2);
    }

    #[tokio::test]
    async fn test_failed_navigation_carries_snapshot() {
        let session = test_server().handle();
        call(&session, "navigate.load", json!({"word": "kitap"})).await;

        let response = call(&session, "navigate.expand", json!({"word": "kitap99"})).await;

        assert_eq!(response["error"]["code"], NAVIGATION_FAILED);
        assert_eq!(response["error"]["data"]["phase"], "error");
        assert_eq!(response["error"]["data"]["centerId"], "kitap");

        let response = call(&session, "error.clear", Value::Null).await;
        assert_eq!(response["result"]["phase"], "loaded");
        assert!(response["result"]["error"].is_null());
    }

    #[tokio::test]
    async fn test_markup_in_word_is_rejected() {
        let session = test_server().handle();

        for word in ["ki<tap", "ki<ta;p"] {
            let response = call(&session, "navigate.load", json!({ "word": word })).await;
            assert_eq!(response["error"]["code"], NAVIGATION_FAILED);
            assert!(response["error"]["data"]["centerId"].is_null());
            assert_eq!(response["error"]["data"]["nodes"], json!([]));
        }
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_lookup() {
        let source: Box<dyn WordSource> =
            Box::new(StaticSource::builtin().with_latency(Duration::from_millis(300)));
        let explorer = Explorer::new(source, ExplorerConfig::default(), Settings::default());
        let session = WordWebServer::new(explorer, ServerConfig::local(0)).handle();

        let loading = {
            let session = session.clone();
            tokio::spawn(async move {
                call(&session, "navigate.load", json!({"word": "kitap"})).await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = tokio::time::timeout(
            Duration::from_millis(100),
            call(&session, "session.snapshot", Value::Null),
        )
        .await
        .expect("snapshot waited on the lookup");
        assert_eq!(response["result"]["isLoading"], true);
        assert_eq!(response["result"]["phase"], "loading");

        let stats = tokio::time::timeout(
            Duration::from_millis(100),
            call(&session, "graph.stats", Value::Null),
        )
        .await
        .expect("stats waited on the lookup");
        assert_eq!(stats["result"]["nodeCount"], 0);

        let loaded = loading.await.unwrap();
        assert_eq!(loaded["result"]["isLoading"], false);
        let response = call(&session, "session.snapshot", Value::Null).await;
        assert_eq!(response["result"]["phase"], "loaded");
        assert_eq!(response["result"]["centerId"], "kitap");
    }

    #[tokio::test]
    async fn test_skipped_requests_do_not_broadcast() {
        let server = test_server();
        let session = server.handle();
        let mut updates = server.subscribe();

        call(&session, "navigate.load", json!({"word": "kitap"})).await;
        while updates.try_recv().is_ok() {}

        let response = call(&session, "navigate.expand", json!({"word": "kitap"})).await;
        assert_eq!(response["result"]["centerId"], "kitap");
        let response = call(&session, "navigate.back", Value::Null).await;
        assert_eq!(response["result"]["history"], json!(["kitap"]));
        call(&session, "error.clear", Value::Null).await;

        assert!(updates.try_recv().is_err());

        call(&session, "navigate.expand", json!({"word": "roman"})).await;
        assert!(matches!(
            updates.try_recv(),
            Ok(BroadcastMessage::GraphUpdate(snapshot)) if snapshot.center_id.as_deref() == Some("roman")
        ));
    }

    #[tokio::test]
    async fn test_settings_methods() {
        let session = test_server().handle();

        let response = call(&session, "settings.set_max_nodes", json!({"value": 10})).await;
        assert_eq!(response["result"]["settings"]["maxNodes"], 50);

        let response = call(&session, "settings.set_max_related", json!({"value": 12})).await;
        assert_eq!(response["result"]["settings"]["maxRelatedPerNode"], 12);

        let response = call(&session, "settings.toggle_physics", Value::Null).await;
        assert_eq!(response["result"]["settings"]["physicsEnabled"], false);

        let response =
            call(&session, "settings.toggle_physics", json!({"enabled": true})).await;
        assert_eq!(response["result"]["settings"]["physicsEnabled"], true);
    }

    #[test]
    fn test_broadcast_message_serialization() {
        let msg = BroadcastMessage::Loading(LoadingPayload {
            word: "kitap".to_string(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "Loading");
        assert_eq!(json["payload"]["word"], "kitap");
    }

    #[test]
    fn test_headless_binds_all_interfaces() {
        assert!(ServerConfig::headless(7540).addr.ip().is_unspecified());
        assert!(ServerConfig::default().addr.ip().is_loopback());
        assert_eq!(ServerConfig::default().addr.port(), DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_websocket_round_trip() {
        let server = test_server();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();

        async fn next_json<S>(ws: &mut S) -> Value
        where
            S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
        {
            loop {
                let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
                    .await
                    .unwrap()
                    .unwrap()
                    .unwrap();
                if let Message::Text(text) = msg {
                    return serde_json::from_str(&text).unwrap();
                }
            }
        }

        let initial = next_json(&mut ws).await;
        assert_eq!(initial["type"], "GraphUpdate");
        assert_eq!(initial["payload"]["phase"], "empty");

        let request = json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "navigate.load",
            "params": {"word": "kitap"}
        });
        ws.send(Message::Text(request.to_string())).await.unwrap();

        loop {
            let msg = next_json(&mut ws).await;
            if msg["id"] == 42 {
                assert_eq!(msg["result"]["centerId"], "kitap");
                break;
            }
        }
    }
}
