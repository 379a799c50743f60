//! WordWeb Server - WebSocket surface for a navigation session
//!
//! A UI layer drives one shared [`Explorer`] over JSON-RPC 2.0:
//!
//! - `session.snapshot`, `graph.stats`
//! - `navigate.load`, `navigate.expand`, `navigate.back`, `navigate.reset`
//! - `settings.set_max_nodes`, `settings.set_max_related`, `settings.toggle_physics`
//! - `error.clear`
//!
//! Every call that changes the session answers with the new snapshot and
//! pushes a `GraphUpdate` to all connected clients. Calls the session skips
//! push nothing. Requests are queued on the session lock, so two clients
//! navigating at once are applied in arrival order. Reads are answered from
//! the last committed snapshot and show `isLoading` while a lookup runs.

use std::sync::Arc;
use tokio::sync::Mutex;
use wordweb_session::{Explorer, WordSource};

/// The session shared by every connection.
pub type SharedExplorer = Arc<Mutex<Explorer<Box<dyn WordSource>>>>;

mod handlers;
mod protocol;
mod server;

pub use protocol::{Request, Response, RpcError};
pub use server::{
    BroadcastMessage, FailedPayload, LoadingPayload, ServerConfig, ServerError, SessionHandle,
    WordWebServer, DEFAULT_PORT,
};
