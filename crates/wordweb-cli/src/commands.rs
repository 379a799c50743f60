//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use wordweb_core::{format_display_word, truncate_text};
use wordweb_graph::WordNode;
use wordweb_server::{ServerConfig, WordWebServer};
use wordweb_session::{
    DictionarySource, Explorer, ExplorerConfig, Settings, SettingsStore, StaticSource, WordSource,
    MAX_NODES_RANGE, MAX_RELATED_RANGE,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub type CliExplorer = Explorer<Box<dyn WordSource>>;

/// Neighbours listed under the center before the rest are summarised.
const NEIGHBOR_PREVIEW: usize = 24;

const LABEL_WIDTH: usize = 32;

/// Where words come from and where settings live.
pub struct Context {
    dictionary: Option<PathBuf>,
    data_dir: PathBuf,
}

impl Context {
    pub fn new(dictionary: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("wordweb"))
                .unwrap_or_else(|| PathBuf::from(".wordweb"))
        });
        Self {
            dictionary,
            data_dir,
        }
    }

    fn source(&self) -> Result<Box<dyn WordSource>> {
        match &self.dictionary {
            Some(path) => {
                let source = DictionarySource::from_path(path)?;
                println!(
                    "{} Loaded {} words from {}",
                    "✓".green(),
                    source.len().to_string().cyan(),
                    path.display()
                );
                Ok(Box::new(source))
            }
            None => Ok(Box::new(StaticSource::builtin())),
        }
    }

    fn store(&self) -> Result<SettingsStore> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(SettingsStore::open(self.data_dir.join("settings"))?)
    }

    /// An explorer whose settings are read from and written to the data dir.
    pub fn explorer(&self) -> Result<CliExplorer> {
        let source = self.source()?;
        let store = self.store()?;
        Ok(Explorer::with_store(source, ExplorerConfig::default(), store)?)
    }
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

/// Load a word, expand through the given words and print the session.
pub async fn show(ctx: &Context, word: &str, expand: &[String], json: bool) -> Result<()> {
    let mut explorer = ctx.explorer()?;

    let progress = spinner(&format!("Loading {}...", word))?;
    let loaded = explorer.load_initial(word).await;
    progress.finish_and_clear();
    loaded?;

    for next in expand {
        let progress = spinner(&format!("Expanding to {}...", next))?;
        let expanded = explorer.expand_to(next).await;
        progress.finish_and_clear();
        expanded?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&explorer.snapshot())?);
    } else {
        print_session(&explorer);
    }

    Ok(())
}

/// Show or update the persisted settings.
pub fn settings(
    ctx: &Context,
    max_nodes: Option<usize>,
    max_related: Option<usize>,
    physics: Option<bool>,
    reset: bool,
) -> Result<()> {
    let store = ctx.store()?;

    if reset {
        store.clear()?;
        println!("{} Settings reset to defaults", "✓".green());
    }

    let mut settings = store.load_or_default()?;
    let changed = max_nodes.is_some() || max_related.is_some() || physics.is_some();

    if let Some(n) = max_nodes {
        settings.max_nodes = Settings::clamp_max_nodes(n);
        if settings.max_nodes != n {
            println!(
                "{} max nodes must be within {}-{}, using {}",
                "⚠".yellow(),
                MAX_NODES_RANGE.start(),
                MAX_NODES_RANGE.end(),
                settings.max_nodes
            );
        }
    }
    if let Some(n) = max_related {
        settings.max_related_per_node = Settings::clamp_max_related(n);
        if settings.max_related_per_node != n {
            println!(
                "{} max related must be within {}-{}, using {}",
                "⚠".yellow(),
                MAX_RELATED_RANGE.start(),
                MAX_RELATED_RANGE.end(),
                settings.max_related_per_node
            );
        }
    }
    if let Some(enabled) = physics {
        settings.physics_enabled = enabled;
    }

    if changed {
        store.save(&settings)?;
        println!("{} Settings saved", "✓".green());
    }

    print_settings(&settings);
    println!("  {}", ctx.data_dir.display().to_string().dimmed());

    Ok(())
}

/// Start the WordWeb server.
pub async fn serve(ctx: &Context, port: u16, headless: bool, word: Option<&str>) -> Result<()> {
    if headless {
        println!("{}", "Starting WordWeb server in headless mode...".cyan());
    } else {
        println!("{}", "Starting WordWeb server...".cyan());
    }

    let mut explorer = ctx.explorer()?;
    if let Some(word) = word {
        explorer.load_initial(word).await?;
        println!(
            "{} Loaded {} ({} nodes)",
            "✓".green(),
            word.cyan(),
            explorer.graph().node_count()
        );
    }

    let config = if headless {
        ServerConfig::headless(port)
    } else {
        ServerConfig::local(port)
    };
    let addr = config.addr;
    let server = WordWebServer::new(explorer, config);

    println!("{} Listening on ws://{}", "✓".green(), addr);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// Prints the center, its neighbours and the history.
pub fn print_session(explorer: &CliExplorer) {
    let graph = explorer.graph();

    let Some(center) = explorer.center_id().and_then(|id| graph.get(id)) else {
        println!("{}", "Nothing loaded".dimmed());
        return;
    };

    println!(
        "\n  {} {}  {}",
        "●".yellow(),
        format_display_word(&center.label).bold(),
        format!(
            "({} nodes, {} edges)",
            graph.node_count(),
            graph.edge_count()
        )
        .dimmed()
    );

    let neighbors: Vec<&WordNode> = graph
        .neighbors(&center.id)
        .into_iter()
        .filter_map(|id| graph.get(id))
        .collect();

    if neighbors.is_empty() {
        println!("    {}", "no related words".dimmed());
    }
    for node in neighbors.iter().take(NEIGHBOR_PREVIEW) {
        println!("    {}", describe_node(node));
    }
    if neighbors.len() > NEIGHBOR_PREVIEW {
        println!("    ... and {} more", neighbors.len() - NEIGHBOR_PREVIEW);
    }

    print_history(explorer.history());
}

pub fn print_history(history: &[String]) {
    let path: Vec<String> = history.iter().map(|id| id.cyan().to_string()).collect();
    println!("\n  {} {}", "history:".dimmed(), path.join(" → "));
}

pub fn print_settings(settings: &Settings) {
    println!("  {:<14} {}", "max nodes", settings.max_nodes.to_string().cyan());
    println!(
        "  {:<14} {}",
        "max related",
        settings.max_related_per_node.to_string().cyan()
    );
    println!(
        "  {:<14} {}",
        "physics",
        if settings.physics_enabled {
            "on".green()
        } else {
            "off".red()
        }
    );
}

fn describe_node(node: &WordNode) -> String {
    let label = truncate_text(&node.label, LABEL_WIDTH);
    let label = if node.is_visited {
        label.green().to_string()
    } else {
        label
    };
    format!("{} {}", label, format!("({})", node.degree).dimmed())
}
