//! Command-line interface for wingman-mentions
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - One-shot subcommands (`match`, `search`, `config`, `completion`)

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::{HttpUserSearch, SearchQuery, UserSearch};
use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::mention::find_mention_match;

/// Strip scheme and path from a URL for display
///
/// # Arguments
/// * `url` - API base URL
///
/// # Returns
/// * `String` - `host[:port]`, or the input if it has no scheme
fn display_host(url: &str) -> String {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

/// Wingman mention autocomplete
#[derive(Parser, Debug)]
#[command(
    name = "wingman-mentions",
    version,
    about = "Compose posts with @mention autocomplete against the Wingman API",
    long_about = "Interactive compose prompt with @mention autocomplete backed by the Wingman
network search endpoint, plus one-shot commands for matching and searching."
)]
pub struct CliArgs {
    /// Base URL of the Wingman API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Debounce window for mention searches in milliseconds
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Number of candidates to request per search
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for wingman-mentions
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Print the mention token under the cursor as JSON
    Match {
        /// Text to inspect
        #[arg(value_name = "TEXT")]
        text: String,

        /// Cursor byte offset (defaults to the end of the text)
        #[arg(long, value_name = "OFFSET")]
        cursor: Option<usize>,
    },

    /// Search the network for mention candidates
    Search {
        /// Name to search for
        #[arg(value_name = "QUERY")]
        query: String,

        /// Result page
        #[arg(long, value_name = "N", default_value_t = 1)]
        page: u32,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file, environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration, or an error when the
    ///   effective settings after overrides are invalid
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        config.apply_env();
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Host part of the API URL, for prompts and banners
    pub fn api_host(&self) -> String {
        display_host(&self.config.api.base_url)
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_api_args(config, args);
        Self::apply_mention_args(config, args);
        Self::apply_logging_args(config, args);

        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply API-related CLI arguments to configuration
    fn apply_api_args(config: &mut Config, args: &CliArgs) {
        if let Some(url) = &args.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(token) = &args.token {
            config.api.token = Some(token.clone());
        }
        if let Some(timeout) = args.timeout {
            config.api.timeout = timeout;
        }
    }

    /// Apply mention-related CLI arguments to configuration
    fn apply_mention_args(config: &mut Config, args: &CliArgs) {
        if let Some(debounce) = args.debounce_ms {
            config.mentions.debounce_ms = debounce;
        }
        if let Some(limit) = args.limit.filter(|l| *l > 0) {
            config.mentions.page_size = limit;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub async fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            Some(Commands::Match { text, cursor }) => {
                self.handle_match_command(text, *cursor)?;
                Ok(true)
            }
            Some(Commands::Search { query, page }) => {
                self.handle_search_command(query, *page).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("wingman-mentions version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults apply");
            return Ok(());
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("{}", self.config.to_toml_with_comments()?);
        Ok(())
    }

    /// Print the match under the cursor
    fn handle_match_command(&self, text: &str, cursor: Option<usize>) -> Result<()> {
        let cursor = cursor.unwrap_or(text.len());
        let found = find_mention_match(text, cursor);
        println!("{}", self.to_json(&found)?);
        Ok(())
    }

    /// Run one search against the API and print the page
    async fn handle_search_command(&self, query: &str, page: u32) -> Result<()> {
        let client = HttpUserSearch::new(&self.config.api)?;
        let query = SearchQuery::new(query, self.config.mentions.page_size).with_page(page);
        let result = client.search_users(&query).await?;
        println!("{}", self.to_json(&result)?);
        Ok(())
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.config.display.pretty_json {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }

    /// Print banner with version and API info
    pub fn print_banner(&self) {
        if !self.args.quiet {
            println!("Wingman API: {}", self.config.api.base_url);
            println!(
                "wingman-mentions {} - type @name then Tab to mention someone, :q to quit",
                env!("CARGO_PKG_VERSION")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["wingman-mentions"]).unwrap();
        assert!(args.api_url.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_args_override_config() {
        let cli = cli(&[
            "wingman-mentions",
            "--api-url",
            "https://api.wingman.example",
            "--debounce-ms",
            "120",
            "--limit",
            "5",
            "--no-color",
            "-v",
        ]);
        let config = cli.config();
        assert_eq!(config.api.base_url, "https://api.wingman.example");
        assert_eq!(config.mentions.debounce_ms, 120);
        assert_eq!(config.mentions.page_size, 5);
        assert!(!config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_limit_is_ignored() {
        let cli = cli(&["wingman-mentions", "--limit", "0"]);
        assert_eq!(cli.config().mentions.page_size, 10);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let args = CliArgs::try_parse_from(["wingman-mentions", "--timeout", "0"]).unwrap();
        let err = CliInterface::load_config(&args).unwrap_err();
        assert!(err.to_string().contains("api.timeout"));
    }

    #[test]
    fn test_non_http_api_url_is_rejected() {
        let args =
            CliArgs::try_parse_from(["wingman-mentions", "--api-url", "ftp://x"]).unwrap();
        let err = CliInterface::load_config(&args).unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_valid_overrides_load() {
        let args = CliArgs::try_parse_from([
            "wingman-mentions",
            "--api-url",
            "https://api.wingman.example",
            "--timeout",
            "3",
        ])
        .unwrap();
        let config = CliInterface::load_config(&args).unwrap();
        assert_eq!(config.api.timeout, 3);
        assert_eq!(config.api.base_url, "https://api.wingman.example");
    }

    #[test]
    fn test_match_subcommand() {
        let args =
            CliArgs::try_parse_from(vec!["wingman-mentions", "match", "hi @jo", "--cursor", "6"])
                .unwrap();
        match args.command {
            Some(Commands::Match { text, cursor }) => {
                assert_eq!(text, "hi @jo");
                assert_eq!(cursor, Some(6));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_display_host() {
        assert_eq!(display_host("https://api.wingman.example/v1"), "api.wingman.example");
        assert_eq!(display_host("http://localhost:3000"), "localhost:3000");
        assert_eq!(display_host("localhost"), "localhost");
    }

    #[test]
    fn test_to_json_compact() {
        let mut cli = cli(&["wingman-mentions"]);
        cli.config.display.pretty_json = false;
        let found = find_mention_match("hello @wo", 9);
        assert_eq!(
            cli.to_json(&found).unwrap(),
            r#"{"index":6,"query":"wo","beforeMatch":"hello "}"#
        );
        assert_eq!(cli.to_json(&find_mention_match("x", 1)).unwrap(), "null");
    }
}
