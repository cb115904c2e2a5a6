//! Command-line argument parsing for sqlward.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Natural-language to SQL with a query-safety gate.
#[derive(Parser, Debug)]
#[command(name = "sqlward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "SQLWARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Use mock oracle and warehouse (offline, for testing)
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a question into SQL through the safety pipeline
    Ask {
        /// The natural-language question
        question: String,

        /// Execute the generated query against the warehouse
        #[arg(long)]
        execute: bool,
    },

    /// Evaluate the base and fine-tuned models over a validation set
    Eval {
        /// JSONL file of {"question", "expected_sql"} cases
        #[arg(long, value_name = "PATH")]
        cases: PathBuf,

        /// Where to write the JSONL results (defaults to the state directory)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Classify questions as in- or out-of-scope
    Scope {
        /// Questions to classify (defaults to a built-in probe set)
        questions: Vec<String>,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}
