use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages, including planned SQL
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "vista")]
#[command(about = "vista - declarative data widgets over SQL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Explicit level wins over `--verbose`; info otherwise
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the configuration and widget data over HTTP
    Serve {
        /// YAML configuration file
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },

    /// Fetch one page of a widget and print it as JSON
    Query {
        /// YAML configuration file
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Widget id
        widget: String,

        /// Query parameters, same syntax as the HTTP API (can be repeated)
        /// Example: --param limit=20 --param status.in=open
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}
