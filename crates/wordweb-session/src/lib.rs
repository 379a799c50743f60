//! WordWeb Session - Navigating the word graph
//!
//! This crate drives the graph engine from user navigation. An
//! [`Explorer`] normalizes the requested word, asks a [`WordSource`] for
//! related words, merges the answer into its graph, prunes it back under
//! the configured ceiling and records the move in its history.
//!
//! Only the user-facing [`Settings`] outlive a session; they are stored with
//! [`SettingsStore`]. The graph is always rebuilt from scratch.
//!
//! # Example
//!
//! ```no_run
//! use wordweb_session::{Explorer, ExplorerConfig, Settings, StaticSource};
//!
//! # async fn run() {
//! let mut explorer = Explorer::new(StaticSource::builtin(), ExplorerConfig::default(), Settings::default());
//! explorer.load_initial("Kitap").await.ok();
//! explorer.expand_to("roman").await.ok();
//! explorer.go_back();
//!
//! assert_eq!(explorer.center_id(), Some("kitap"));
//! # }
//! ```

mod error;
mod explorer;
mod settings;
mod source;
mod store;

pub use error::{ExplorerError, ProviderError, StoreError};
pub use explorer::{Explorer, ExplorerConfig, NavOutcome, Phase, SessionEvent, Snapshot};
pub use settings::{
    Settings, DEFAULT_MAX_NODES, DEFAULT_MAX_RELATED, MAX_NODES_RANGE, MAX_RELATED_RANGE,
};
pub use source::{DictionaryRow, DictionarySource, StaticSource, WordSource, DEFAULT_SOURCE_CAP};
pub use store::SettingsStore;
