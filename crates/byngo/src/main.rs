//! Byngo CLI
//!
//! - `byngo highlight`: style the "free" cells of an HTML page or DOM snapshot
//! - `byngo cards`: generate a printable deck of bingo cards

use anyhow::{Context, Result};
use byngo::{CardDeck, CardOptions, GridSize};
use clap::{Args, Parser, Subcommand};
use dom::{DomService, HighlightPolicy};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bingo card generator and table-cell highlighter
#[derive(Parser, Debug)]
#[command(name = "byngo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Highlight table cells containing "free" and print the document
    Highlight(HighlightArgs),
    /// Generate bingo cards as one HTML page
    Cards(CardArgs),
}

#[derive(Args, Debug)]
struct HighlightArgs {
    /// HTML file to read (default: stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Styling policy: fixed (15px) or by-count (size from the cell count, bold)
    #[arg(short, long, default_value = "fixed")]
    policy: HighlightPolicy,

    /// Input is a DevTools DOM.getDocument JSON snapshot instead of HTML
    #[arg(long)]
    json: bool,

    /// Indent the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct CardArgs {
    /// Remove the free space
    #[arg(short = 'x', long)]
    no_free: bool,

    /// Number of players (one card each)
    #[arg(short = 'i', long, default_value_t = 1)]
    num_players: usize,

    /// Grid size: 3x3, 4x4 or 5x5
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(3..=5))]
    grid_size: u8,

    /// Minimum value to appear on the grid
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    min: i32,

    /// Maximum value to appear on the grid
    #[arg(short = 'n', long, default_value_t = 50, allow_negative_numbers = true)]
    max: i32,

    /// Title printed above each grid
    #[arg(short, long, default_value = byngo::card::DEFAULT_TITLE)]
    title: String,

    /// Styling policy for the free cell
    #[arg(short, long, default_value = "by-count")]
    policy: HighlightPolicy,

    /// Seed for reproducible cards
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    tracing::debug!("byngo v{}", env!("CARGO_PKG_VERSION"));

    let output = match cli.command {
        Command::Highlight(args) => highlight(args)?,
        Command::Cards(args) => cards(args)?,
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn highlight(args: HighlightArgs) -> Result<String> {
    let src = read_input(args.input.as_ref())?;

    let mut config = dom::DomServiceConfig::default();
    config.serializer.pretty = args.pretty;
    let mut service = DomService::with_config(config);

    if args.json {
        service
            .parse_cdp_json(&src)
            .context("Invalid DOM snapshot")?;
    } else {
        service.parse_html(&src)?;
    }

    service.highlight_cells(args.policy)?;
    Ok(service.to_html()?)
}

fn cards(args: CardArgs) -> Result<String> {
    let options = CardOptions {
        title: args.title,
        grid_size: GridSize::new(args.grid_size)?,
        min: args.min,
        max: args.max,
        free_space: !args.no_free,
        players: args.num_players,
        policy: args.policy,
        seed: args.seed,
    };

    let deck = CardDeck::generate(&options).context("Failed to generate cards")?;
    tracing::info!("Packaging {} card(s)", deck.len());
    Ok(deck.to_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::NamedTempFile;

    fn input_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn highlight_args(file: &NamedTempFile, policy: HighlightPolicy) -> HighlightArgs {
        HighlightArgs {
            input: Some(file.path().to_path_buf()),
            policy,
            json: false,
            pretty: false,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cards_flags() {
        let cli = Cli::parse_from(["byngo", "cards", "-x", "-i", "3", "-g", "4", "-m", "5", "-n", "60"]);
        let Command::Cards(args) = cli.command else {
            panic!("expected cards");
        };
        assert!(args.no_free);
        assert_eq!(args.num_players, 3);
        assert_eq!(args.grid_size, 4);
        assert_eq!((args.min, args.max), (5, 60));
        assert_eq!(args.policy, HighlightPolicy::ByCount);
    }

    #[test]
    fn test_grid_size_out_of_range() {
        assert!(Cli::try_parse_from(["byngo", "cards", "-g", "6"]).is_err());
    }

    #[test]
    fn test_highlight_policy_flag() {
        let cli = Cli::parse_from(["byngo", "highlight", "--policy", "by-count", "page.html"]);
        let Command::Highlight(args) = cli.command else {
            panic!("expected highlight");
        };
        assert_eq!(args.policy, HighlightPolicy::ByCount);
        assert_eq!(args.input, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn test_cards_output() {
        let args = CardArgs {
            no_free: false,
            num_players: 2,
            grid_size: 4,
            min: 1,
            max: 50,
            title: "Test".to_string(),
            policy: HighlightPolicy::ByCount,
            seed: Some(3),
        };
        let html = cards(args).unwrap();
        assert_eq!(
            html.matches("font-size: 20pt; font-weight: bold").count(),
            2
        );
    }

    #[test]
    fn test_highlight_html_file() {
        let file = input_file(
            r#"<table><tr><td>Free &mdash; &hearts;</td><td style="background: url(a;b.png)">2</td></tr></table>"#,
        );
        let html = highlight(highlight_args(&file, HighlightPolicy::Fixed)).unwrap();
        assert_eq!(
            html,
            r#"<table><tr><td style="font-size: 15px">Free — &hearts;</td><td style="background: url(a;b.png)">2</td></tr></table>"#
        );
    }

    #[test]
    fn test_highlight_json_snapshot() {
        let snapshot = serde_json::json!({
            "root": {
                "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
                "children": [{
                    "nodeId": 2, "backendNodeId": 2, "nodeType": 1, "nodeName": "TD",
                    "attributes": ["id", "x"],
                    "children": [{
                        "nodeId": 3, "backendNodeId": 3, "nodeType": 3,
                        "nodeName": "#text", "nodeValue": "FREE"
                    }]
                }]
            }
        });
        let file = input_file(&snapshot.to_string());
        let args = HighlightArgs {
            json: true,
            ..highlight_args(&file, HighlightPolicy::ByCount)
        };

        let html = highlight(args).unwrap();
        assert_eq!(
            html,
            r#"<td id="x" style="font-size: 25pt; font-weight: bold">FREE</td>"#
        );
    }

    #[test]
    fn test_highlight_bad_json_is_error() {
        let file = input_file("<td>free</td>");
        let args = HighlightArgs {
            json: true,
            ..highlight_args(&file, HighlightPolicy::Fixed)
        };
        assert!(highlight(args).is_err());
    }

    #[test]
    fn test_highlight_pretty_output_rehighlights_the_same() {
        let file = input_file(
            "<table>\n<tr><td><b>Fr</b>ee</td><td>1</td></tr>\n<tr><td>2</td><td>3</td></tr>\n</table>",
        );
        let args = HighlightArgs {
            pretty: true,
            ..highlight_args(&file, HighlightPolicy::ByCount)
        };
        let pretty = highlight(args).unwrap();
        assert_eq!(
            pretty,
            "<table>\n  <tr>\n    <td style=\"font-size: 25pt; font-weight: bold\"><b>Fr</b>ee</td>\n    <td>1</td>\n  </tr>\n  <tr>\n    <td>2</td>\n    <td>3</td>\n  </tr>\n</table>\n"
        );

        let again = input_file(&pretty);
        let args = HighlightArgs {
            pretty: true,
            ..highlight_args(&again, HighlightPolicy::ByCount)
        };
        assert_eq!(highlight(args).unwrap(), pretty);
    }

    #[test]
    fn test_missing_input_file() {
        let args = HighlightArgs {
            input: Some(PathBuf::from("/nonexistent/byngo/page.html")),
            policy: HighlightPolicy::Fixed,
            json: false,
            pretty: false,
        };
        let err = highlight(args).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
