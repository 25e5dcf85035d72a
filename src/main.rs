//! Wingman mentions
//!
//! Compose posts from the terminal with `@mention` autocomplete backed by
//! the Wingman network search API.
//!
//! # Usage
//!
//! ```bash
//! # Interactive compose prompt
//! wingman-mentions --api-url https://api.wingman.example
//!
//! # One-shot commands
//! wingman-mentions match "hello @wo"
//! wingman-mentions search ann
//! ```

use std::sync::Arc;

use tracing::Level;

use wingman_mentions::api::{HttpUserSearch, UserSearch};
use wingman_mentions::cli::CliInterface;
use wingman_mentions::error::Result;
use wingman_mentions::repl::{ReplEngine, ReplInput, SharedState};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the compose prompt
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand().await? {
        return Ok(());
    }

    cli.print_banner();

    run_interactive_mode(&cli).await
}

/// Run the compose prompt until the user quits
async fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let search: Arc<dyn UserSearch> = Arc::new(HttpUserSearch::new(&cli.config().api)?);

    let shared_state = SharedState::new(cli.api_host());
    shared_state.set_color_enabled(cli.config().display.color_output);

    let mut repl = ReplEngine::new(cli.config(), search, shared_state)?;

    while repl.is_running() {
        let line = match repl.read_line()? {
            Some(line) => line,
            None => break,
        };

        match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => repl.stop(),
            ReplInput::Post(body) => {
                let post = repl.compose(&body);
                tracing::info!(tagged = post.tagged_users.len(), "post composed");
                let json = if cli.config().display.pretty_json {
                    serde_json::to_string_pretty(&post)?
                } else {
                    serde_json::to_string(&post)?
                };
                println!("{}", json);
            }
        }
    }

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so JSON on stdout stays machine-readable.
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(cli.config().display.color_output)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
