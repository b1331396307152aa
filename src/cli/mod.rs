//! CLI module - Command-line interface for `InvestAI`

pub mod commands;

use clap::{Parser, Subcommand};

/// `InvestAI` - investment assistant backend
#[derive(Parser)]
#[command(name = "investai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (default)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Write a default config.toml if none exists
    Init,

    /// Ask the search bar a question
    #[command(alias = "a")]
    Ask {
        /// Message to send
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Print the latest quote for a symbol
    #[command(alias = "q")]
    Quote {
        /// Ticker symbol, e.g. AAPL
        symbol: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::try_parse_from(["investai"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["investai", "ask", "how", "do", "bonds", "work"]).unwrap();
        match cli.command {
            Some(Commands::Ask { message }) => assert_eq!(message.join(" "), "how do bonds work"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_quote_requires_symbol() {
        assert!(Cli::try_parse_from(["investai", "quote"]).is_err());
        assert!(Cli::try_parse_from(["investai", "q", "MSFT"]).is_ok());
    }
}
