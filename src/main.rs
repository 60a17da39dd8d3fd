//! AlKetab - command-line front end for the Quran AI search API

use alketab_lib::highlight::{self, Segment};
use alketab_lib::session::MIN_QUERY_CHARS;
use alketab_lib::{Outcome, Phase, SearchClient, SearchSession, SessionState, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alketab", version, about = "Natural-language Quran search")]
struct Cli {
    /// Extra config file merged over the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the Quran with a natural-language query
    Search {
        query: String,

        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Print the final session state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref())?;
    if settings.api_key.is_empty() {
        tracing::warn!("no API key configured; set ALKETAB_API_KEY or api_key in config.toml");
    }

    match cli.command {
        Command::Search { query, pages, json } => {
            let session = SearchSession::new(SearchClient::new(&settings)?);
            if session.start_search(&query).await == Outcome::Skipped {
                eprintln!("Query must be at least {} characters long.", MIN_QUERY_CHARS);
                return Ok(ExitCode::FAILURE);
            }

            for _ in 1..pages {
                if !session.snapshot().has_more_pages() {
                    break;
                }
                if session.load_more().await != Outcome::Applied
                    || session.snapshot().last_error.is_some()
                {
                    break;
                }
            }

            let state = session.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print_state(&state);
            }

            Ok(if state.phase == Phase::Error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

fn print_state(state: &SessionState) {
    if let Some(err) = &state.last_error {
        eprintln!("{}", err);
        if err.is_terminal_configuration() {
            eprintln!("Check the api_key setting and your AlKetab account credits.");
        }
        if state.phase == Phase::Error {
            return;
        }
    }

    if let Some(explain) = &state.ai_explanation {
        println!("{}\n", explain);
    }

    for verse in &state.verses {
        println!(
            "[{} {}:{}] {}",
            verse.surah_name_alt,
            verse.surah_id,
            verse.verse_number,
            render(&verse.text_highlighted)
        );
    }

    println!(
        "\nPage {}/{} · {} results · sorted by {}",
        state.current_page,
        state.total_pages,
        state.total_results,
        state.sort_order.display_name()
    );
}

/// Highlighted runs are bolded with ANSI escapes.
fn render(text: &str) -> String {
    highlight::segments(text)
        .iter()
        .map(|segment| match segment {
            Segment::Plain { text } => text.clone(),
            Segment::Highlight { text, .. } => format!("\x1b[1m{}\x1b[0m", text),
        })
        .collect()
}
