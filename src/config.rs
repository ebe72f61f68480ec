//! Command-line and environment configuration.

use crate::card::DEFAULT_BATCH_SIZE;
use crate::lookup::DEFAULT_BIN_API_URL;
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Telegram bot generating Luhn-valid test card numbers.
#[derive(Parser, Debug, Clone)]
#[command(name = "cardgen")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// BIN lookup service base URL
    #[arg(long, env = "CARDGEN_BIN_API_URL", default_value = DEFAULT_BIN_API_URL, global = true)]
    pub bin_api_url: String,

    /// BIN lookup timeout in seconds
    #[arg(long, env = "CARDGEN_LOOKUP_TIMEOUT", default_value = "5", global = true)]
    pub lookup_timeout: u64,

    /// BIN lookup rate limit (requests per second)
    #[arg(long, default_value = "5", global = true)]
    pub rate_limit: u32,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the Telegram bot
    Serve(ServeConfig),
    /// Generate a batch locally and print it
    Gen(GenConfig),
    /// Look up a BIN and print the result
    Bin(BinConfig),
}

/// Configuration for the serve command.
#[derive(Parser, Debug, Clone)]
pub struct ServeConfig {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Long-polling timeout in seconds
    #[arg(long, default_value = "30")]
    pub poll_timeout: u64,

    /// Cards per generated batch
    #[arg(long, env = "CARDGEN_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Forget regeneration data after this many seconds (kept until restart if unset)
    #[arg(long, env = "CARDGEN_SESSION_TTL")]
    pub session_ttl: Option<u64>,
}

impl ServeConfig {
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl.map(Duration::from_secs)
    }
}

/// Configuration for the gen command.
#[derive(Parser, Debug, Clone)]
pub struct GenConfig {
    /// Card pattern, e.g. "411111xxxxxxxxxx|12|2026|123"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Number of cards to generate
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub count: usize,

    /// Skip the BIN lookup
    #[arg(long)]
    pub offline: bool,
}

/// Configuration for the bin command.
#[derive(Parser, Debug, Clone)]
pub struct BinConfig {
    /// BIN or card number; the first six digits are used
    pub bin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gen_subcommand() {
        let config = Config::try_parse_from(["cardgen", "gen", "411111|12|26", "--count", "3"]).unwrap();
        match config.command {
            Commands::Gen(gen) => {
                assert_eq!(gen.text, vec!["411111|12|26".to_string()]);
                assert_eq!(gen.count, 3);
                assert!(!gen.offline);
            }
            other => panic!("Expected gen, got {:?}", other),
        }
        assert_eq!(config.lookup_timeout, 5);
    }

    #[test]
    fn test_gen_text_with_spaces() {
        let config = Config::try_parse_from(["cardgen", "gen", "411111", "12/26", "123"]).unwrap();
        let Commands::Gen(gen) = config.command else {
            panic!("Expected gen");
        };
        assert_eq!(gen.text.join(" "), "411111 12/26 123");
    }

    #[test]
    fn test_parse_serve_subcommand() {
        let config =
            Config::try_parse_from(["cardgen", "serve", "--token", "1:abc", "--session-ttl", "60", "-v"]).unwrap();
        assert!(config.verbose);
        let Commands::Serve(serve) = config.command else {
            panic!("Expected serve");
        };
        assert_eq!(serve.token, "1:abc");
        assert_eq!(serve.session_ttl(), Some(Duration::from_secs(60)));
    }
}
