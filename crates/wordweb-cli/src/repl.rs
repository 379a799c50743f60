//! The interactive explorer.

use crate::commands::{print_history, print_session, print_settings, Context, Result};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use wordweb_session::NavOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Go(String),
    Back,
    Reset,
    MaxNodes(usize),
    MaxRelated(usize),
    Physics,
    History,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<ReplCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let number = |what: &str| {
        rest.parse::<usize>()
            .map_err(|_| format!("{} expects a number", what))
    };

    match head {
        "go" | "g" if !rest.is_empty() => Ok(ReplCommand::Go(rest.to_string())),
        "go" | "g" => Err("go expects a word".to_string()),
        "back" | "b" => Ok(ReplCommand::Back),
        "reset" => Ok(ReplCommand::Reset),
        "max-nodes" => number("max-nodes").map(ReplCommand::MaxNodes),
        "max-related" => number("max-related").map(ReplCommand::MaxRelated),
        "physics" => Ok(ReplCommand::Physics),
        "history" | "h" => Ok(ReplCommand::History),
        "show" | "s" => Ok(ReplCommand::Show),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("unknown command {:?}, try help", other)),
    }
}

fn print_help() {
    println!("  {:<16} center on a word", "go <word>");
    println!("  {:<16} return to the previous center", "back");
    println!("  {:<16} start over from the default word", "reset");
    println!("  {:<16} change the node ceiling", "max-nodes <n>");
    println!("  {:<16} change related words per expansion", "max-related <n>");
    println!("  {:<16} toggle renderer physics", "physics");
    println!("  {:<16} print the navigation history", "history");
    println!("  {:<16} print the current center", "show");
    println!("  {:<16} leave", "quit");
}

/// Runs the explorer until `quit` or end of input.
pub async fn explore(ctx: &Context, word: Option<&str>) -> Result<()> {
    let mut explorer = ctx.explorer()?;

    let start = match word {
        Some(word) => explorer.load_initial(word).await,
        None => explorer.reset().await,
    };
    match start {
        Ok(_) => print_session(&explorer),
        Err(e) => println!("{} {}", "error:".red().bold(), e),
    }
    println!("\n  Type {} for commands", "help".cyan());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "wordweb>".cyan());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{} {}", "⚠".yellow(), message);
                continue;
            }
        };

        match command {
            ReplCommand::Go(word) => match explorer.expand_to(&word).await {
                Ok(NavOutcome::Skipped) => println!("  {}", "already here".dimmed()),
                Ok(_) => print_session(&explorer),
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    explorer.clear_error();
                }
            },
            ReplCommand::Back => match explorer.go_back() {
                NavOutcome::Skipped => println!("  {}", "nothing to go back to".dimmed()),
                _ => print_session(&explorer),
            },
            ReplCommand::Reset => match explorer.reset().await {
                Ok(_) => print_session(&explorer),
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    explorer.clear_error();
                }
            },
            ReplCommand::MaxNodes(n) => {
                let pruned = explorer.set_max_nodes(n);
                if !pruned.is_noop() {
                    println!(
                        "{} Pruned {} nodes",
                        "✓".green(),
                        pruned.nodes_removed.to_string().cyan()
                    );
                }
                print_settings(&explorer.settings());
            }
            ReplCommand::MaxRelated(n) => {
                explorer.set_max_related_per_node(n);
                print_settings(&explorer.settings());
            }
            ReplCommand::Physics => {
                explorer.toggle_physics();
                print_settings(&explorer.settings());
            }
            ReplCommand::History => print_history(explorer.history()),
            ReplCommand::Show => print_session(&explorer),
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("go  ağaç dalı "),
            Ok(ReplCommand::Go("ağaç dalı".to_string()))
        );
        assert_eq!(parse_command("b"), Ok(ReplCommand::Back));
        assert_eq!(parse_command("max-nodes 120"), Ok(ReplCommand::MaxNodes(120)));
        assert_eq!(parse_command("quit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("go").is_err());
        assert!(parse_command("max-related many").is_err());
        assert!(parse_command("fly").is_err());
    }
}
