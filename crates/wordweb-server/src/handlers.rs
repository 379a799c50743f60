//! Request handlers for protocol methods.
//!
//! Each handler implements one method. Handlers that change the session
//! reply with the new snapshot and publish it to every client. Requests the
//! session skipped are answered without a broadcast.

use crate::protocol::{LimitParams, PhysicsParams, Response, WordParams, NAVIGATION_FAILED};
use crate::server::SessionHandle;
use serde_json::Value;
use tracing::debug;
use wordweb_graph::GraphStats;
use wordweb_session::{Explorer, ExplorerError, NavOutcome, Snapshot, WordSource};

/// Handles the session.snapshot method.
///
/// Served from the cached snapshot, so it answers while a lookup holds the
/// session lock.
pub async fn handle_snapshot(session: &SessionHandle, id: Option<Value>) -> Response {
    Response::success(id, session.snapshot())
}

/// Handles the graph.stats method.
pub async fn handle_stats(session: &SessionHandle, id: Option<Value>) -> Response {
    let snapshot = session.snapshot();
    Response::success(
        id,
        GraphStats {
            node_count: snapshot.nodes.len(),
            edge_count: snapshot.links.len(),
            visited_count: snapshot.nodes.iter().filter(|n| n.is_visited).count(),
            center: snapshot.center_id,
        },
    )
}

/// Handles the navigate.load method.
pub async fn handle_load(session: &SessionHandle, id: Option<Value>, params: WordParams) -> Response {
    debug!("Load: {:?}", params.word);

    let (result, snapshot) = {
        let mut explorer = session.explorer.lock().await;
        session.mark_loading();
        let result = explorer.load_initial(&params.word).await;
        (result, explorer.snapshot())
    };
    navigation_response(session, id, result, snapshot)
}

/// Handles the navigate.expand method.
pub async fn handle_expand(
    session: &SessionHandle,
    id: Option<Value>,
    params: WordParams,
) -> Response {
    debug!("Expand: {:?}", params.word);

    let (result, snapshot) = {
        let mut explorer = session.explorer.lock().await;
        session.mark_loading();
        let result = explorer.expand_to(&params.word).await;
        (result, explorer.snapshot())
    };
    navigation_response(session, id, result, snapshot)
}

/// Handles the navigate.reset method.
pub async fn handle_reset(session: &SessionHandle, id: Option<Value>) -> Response {
    let (result, snapshot) = {
        let mut explorer = session.explorer.lock().await;
        session.mark_loading();
        let result = explorer.reset().await;
        (result, explorer.snapshot())
    };
    navigation_response(session, id, result, snapshot)
}

/// Handles the navigate.back method.
pub async fn handle_back(session: &SessionHandle, id: Option<Value>) -> Response {
    apply(session, id, |explorer| {
        if explorer.go_back() == NavOutcome::Skipped {
            debug!("Back: already at the first center");
            return false;
        }
        true
    })
    .await
}

/// Handles the settings.set_max_nodes method.
pub async fn handle_set_max_nodes(
    session: &SessionHandle,
    id: Option<Value>,
    params: LimitParams,
) -> Response {
    apply(session, id, |explorer| {
        explorer.set_max_nodes(params.value);
        true
    })
    .await
}

/// Handles the settings.set_max_related method.
pub async fn handle_set_max_related(
    session: &SessionHandle,
    id: Option<Value>,
    params: LimitParams,
) -> Response {
    apply(session, id, |explorer| {
        explorer.set_max_related_per_node(params.value);
        true
    })
    .await
}

/// Handles the settings.toggle_physics method.
pub async fn handle_toggle_physics(
    session: &SessionHandle,
    id: Option<Value>,
    params: PhysicsParams,
) -> Response {
    apply(session, id, |explorer| {
        match params.enabled {
            Some(enabled) => explorer.set_physics_enabled(enabled),
            None => {
                explorer.toggle_physics();
            }
        }
        true
    })
    .await
}

/// Handles the error.clear method.
pub async fn handle_clear_error(session: &SessionHandle, id: Option<Value>) -> Response {
    apply(session, id, |explorer| {
        let had_error = explorer.error().is_some();
        explorer.clear_error();
        had_error
    })
    .await
}

/// Runs a synchronous change under the session lock. `change` reports
/// whether anything moved; only then is the snapshot published.
async fn apply<F>(session: &SessionHandle, id: Option<Value>, change: F) -> Response
where
    F: FnOnce(&mut Explorer<Box<dyn WordSource>>) -> bool,
{
    let (changed, snapshot) = {
        let mut explorer = session.explorer.lock().await;
        let changed = change(&mut explorer);
        (changed, explorer.snapshot())
    };
    session.commit(snapshot.clone(), changed);
    Response::success(id, snapshot)
}

fn navigation_response(
    session: &SessionHandle,
    id: Option<Value>,
    result: Result<NavOutcome, ExplorerError>,
    snapshot: Snapshot,
) -> Response {
    // A skipped request left the session as it was. Failures still publish
    // because they move the session into the error phase.
    let changed = !matches!(result, Ok(NavOutcome::Skipped));
    session.commit(snapshot.clone(), changed);
    match result {
        Ok(_) => Response::success(id, snapshot),
        // The snapshot rides along so the client can show the preserved graph.
        Err(e) => Response::error_with_data(id, NAVIGATION_FAILED, e.to_string(), snapshot),
    }
}
