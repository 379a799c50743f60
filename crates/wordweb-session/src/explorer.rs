//! The navigation session.
//!
//! An [`Explorer`] is the single owner of the word graph and the history of
//! centers. Navigation methods take `&mut self`, so one explorer can never
//! run two navigations at once; callers sharing an explorer put it behind a
//! `tokio::sync::Mutex`, which queues them.
//!
//! Nothing is written until the provider has answered. Dropping a
//! navigation future while it waits (or hitting the fetch timeout) leaves
//! the session exactly as it was.

use crate::error::{ExplorerError, ProviderError, StoreError};
use crate::settings::Settings;
use crate::source::WordSource;
use crate::store::SettingsStore;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wordweb_core::{is_valid_word, normalize_word, WordError, WordPayload};
use wordweb_graph::{
    merge, prune, MergeOutcome, PruneOutcome, WordEdge, WordGraph, WordNode,
};

const EVENT_CAPACITY: usize = 64;

/// Session configuration that is not a user setting.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Word loaded by [`Explorer::reset`].
    pub default_word: String,
    /// Upper bound on a single provider lookup.
    pub fetch_timeout: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            default_word: "kitap".to_string(),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// Coarse session state, derived from the fields of the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet.
    Empty,
    /// A lookup is in flight.
    Loading,
    /// A graph is loaded around a center.
    Loaded,
    /// The last operation failed; the graph is the last good one.
    Error,
}

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// A lookup was merged around a new center.
    Navigated {
        center: String,
        merge: MergeOutcome,
        prune: PruneOutcome,
    },
    /// Only the center flag moved back through history.
    Rewound { center: String },
    /// The request did not change anything.
    Skipped,
}

/// Notifications published while the session changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Loading {
        word: String,
    },
    GraphChanged {
        center: Option<String>,
        node_count: usize,
        edge_count: usize,
    },
    SettingsChanged {
        settings: Settings,
    },
    Failed {
        message: String,
    },
    ErrorCleared,
}

/// A read-only copy of everything a UI needs to draw the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<WordNode>,
    pub links: Vec<WordEdge>,
    pub center_id: Option<String>,
    pub history: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub phase: Phase,
    pub settings: Settings,
}

/// Raises the loading flag for as long as it lives.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Navigation session over a word graph.
pub struct Explorer<S> {
    source: S,
    config: ExplorerConfig,
    settings: Settings,
    store: Option<SettingsStore>,

    graph: WordGraph,
    center_id: Option<String>,
    history: Vec<String>,
    visited: HashSet<String>,

    loading: bool,
    error: Option<String>,

    events: broadcast::Sender<SessionEvent>,
}

impl<S: WordSource> Explorer<S> {
    /// Creates an empty session.
    pub fn new(source: S, config: ExplorerConfig, settings: Settings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            source,
            config,
            settings: settings.sanitized(),
            store: None,
            graph: WordGraph::new(),
            center_id: None,
            history: Vec::new(),
            visited: HashSet::new(),
            loading: false,
            error: None,
            events,
        }
    }

    /// Creates an empty session whose settings are loaded from and saved to `store`.
    pub fn with_store(
        source: S,
        config: ExplorerConfig,
        store: SettingsStore,
    ) -> Result<Self, StoreError> {
        let settings = store.load_or_default()?;
        let mut explorer = Self::new(source, config, settings);
        explorer.store = Some(store);
        Ok(explorer)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────

    /// Replaces the whole graph with a fresh one centered on `word`.
    pub async fn load_initial(&mut self, word: &str) -> Result<NavOutcome, ExplorerError> {
        let id = match validate(word) {
            Ok(id) => id,
            Err(e) => return Err(self.fail(e)),
        };
        let payload = match self.fetch(&id).await {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        let mut graph = WordGraph::new();
        let merged = merge(&mut graph, &payload, &id, self.settings.max_related_per_node);
        let history = vec![id.clone()];
        let pruned = prune(&mut graph, Some(id.as_str()), &history, self.settings.max_nodes);

        self.visited = HashSet::from([id.clone()]);
        graph.mark_visited(&self.visited);

        self.graph = graph;
        self.history = history;
        self.center_id = Some(id.clone());
        self.error = None;

        info!(
            "Loaded {:?}: {} nodes, {} edges",
            id,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.emit_graph_changed();

        Ok(NavOutcome::Navigated {
            center: id,
            merge: merged,
            prune: pruned,
        })
    }

    /// Re-centers on `word`, merging its related words into the current graph.
    ///
    /// The graph accumulates across expansions and is pruned back under the
    /// node ceiling afterwards. Requests for an empty word, or for the word
    /// that is already the visited center, are skipped without a lookup.
    pub async fn expand_to(&mut self, word: &str) -> Result<NavOutcome, ExplorerError> {
        let id = normalize_word(word);
        if id.is_empty() {
            debug!("Ignoring expand to empty word");
            return Ok(NavOutcome::Skipped);
        }
        if self.center_id.as_deref() == Some(id.as_str()) && self.visited.contains(&id) {
            debug!("Already centered on {:?}", id);
            return Ok(NavOutcome::Skipped);
        }
        if !is_valid_word(&id) {
            return Err(self.fail(WordError::invalid(word).into()));
        }

        let payload = match self.fetch(&id).await {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        let merged = merge(
            &mut self.graph,
            &payload,
            &id,
            self.settings.max_related_per_node,
        );
        self.history.push(id.clone());
        self.visited.insert(id.clone());
        self.center_id = Some(id.clone());

        let pruned = prune(
            &mut self.graph,
            Some(id.as_str()),
            &self.history,
            self.settings.max_nodes,
        );
        self.graph.mark_visited(&self.visited);
        self.error = None;

        info!(
            "Expanded to {:?}: +{} nodes, +{} edges, -{} pruned ({} total)",
            id,
            merged.nodes_added,
            merged.edges_added,
            pruned.nodes_removed,
            self.graph.node_count()
        );
        self.emit_graph_changed();

        Ok(NavOutcome::Navigated {
            center: id,
            merge: merged,
            prune: pruned,
        })
    }

    /// Steps back to the previous center without fetching anything.
    ///
    /// The node and edge sets stay as they are; only the center moves.
    pub fn go_back(&mut self) -> NavOutcome {
        if self.history.len() <= 1 {
            return NavOutcome::Skipped;
        }

        self.history.pop();
        let Some(previous) = self.history.last().cloned() else {
            return NavOutcome::Skipped;
        };

        self.graph.set_center(&previous);
        self.center_id = Some(previous.clone());

        debug!("Back to {:?} ({} in history)", previous, self.history.len());
        self.emit_graph_changed();

        NavOutcome::Rewound { center: previous }
    }

    /// Clears the session and loads the configured default word.
    ///
    /// Settings survive a reset.
    pub async fn reset(&mut self) -> Result<NavOutcome, ExplorerError> {
        self.graph.clear();
        self.history.clear();
        self.visited.clear();
        self.center_id = None;
        self.error = None;
        self.emit_graph_changed();

        let word = self.config.default_word.clone();
        self.load_initial(&word).await
    }

    /// Drops the current error without retrying anything.
    pub fn clear_error(&mut self) {
        if self.error.take().is_some() {
            let _ = self.events.send(SessionEvent::ErrorCleared);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────

    /// Sets the node ceiling, clamped into range, and prunes right away if
    /// the graph is over it.
    pub fn set_max_nodes(&mut self, n: usize) -> PruneOutcome {
        let max_nodes = Settings::clamp_max_nodes(n);
        self.settings.max_nodes = max_nodes;
        self.settings_changed();

        let pruned = prune(
            &mut self.graph,
            self.center_id.as_deref(),
            &self.history,
            max_nodes,
        );
        if !pruned.is_noop() {
            self.emit_graph_changed();
        }
        pruned
    }

    /// Sets the per-merge related word cap, clamped into range.
    pub fn set_max_related_per_node(&mut self, n: usize) -> usize {
        let max_related = Settings::clamp_max_related(n);
        self.settings.max_related_per_node = max_related;
        self.settings_changed();
        max_related
    }

    pub fn set_physics_enabled(&mut self, enabled: bool) {
        self.settings.physics_enabled = enabled;
        self.settings_changed();
    }

    pub fn toggle_physics(&mut self) -> bool {
        self.set_physics_enabled(!self.settings.physics_enabled);
        self.settings.physics_enabled
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read access
    // ─────────────────────────────────────────────────────────────────────

    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    pub fn center_id(&self) -> Option<&str> {
        self.center_id.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn visited_centers(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.center_id.is_none() {
            Phase::Empty
        } else {
            Phase::Loaded
        }
    }

    /// Copies the current state for a UI.
    pub fn snapshot(&self) -> Snapshot {
        let export = self.graph.export();
        Snapshot {
            nodes: export.nodes,
            links: export.links,
            center_id: self.center_id.clone(),
            history: self.history.clone(),
            is_loading: self.loading,
            error: self.error.clone(),
            phase: self.phase(),
            settings: self.settings,
        }
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    async fn fetch(&mut self, id: &str) -> Result<WordPayload, ExplorerError> {
        let _ = self.events.send(SessionEvent::Loading {
            word: id.to_string(),
        });
        debug!("Fetching {:?} from {} source", id, self.source.name());

        let timeout = self.config.fetch_timeout;
        let _loading = LoadingGuard::new(&mut self.loading);

        match tokio::time::timeout(timeout, self.source.fetch_word(id)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ProviderError::Timeout(timeout).into()),
        }
    }

    fn fail(&mut self, err: ExplorerError) -> ExplorerError {
        let message = err.to_string();
        warn!("Navigation failed: {}", message);
        self.error = Some(message.clone());
        let _ = self.events.send(SessionEvent::Failed { message });
        err
    }

    fn settings_changed(&mut self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.settings) {
                warn!("Failed to save settings: {}", e);
            }
        }
        let _ = self.events.send(SessionEvent::SettingsChanged {
            settings: self.settings,
        });
    }

    fn emit_graph_changed(&self) {
        let _ = self.events.send(SessionEvent::GraphChanged {
            center: self.center_id.clone(),
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        });
    }
}

/// Normalizes and validates a navigation target.
fn validate(word: &str) -> Result<String, ExplorerError> {
    let id = normalize_word(word);
    if id.is_empty() || !is_valid_word(&id) {
        return Err(WordError::invalid(word).into());
    }
    Ok(id)
}
