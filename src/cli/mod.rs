//! CLI interface for medauth

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medauth")]
#[command(author = "Krakaw")]
#[command(version = "1.0.0")]
#[command(about = "Authentication gateway for the doctor appointment service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new medauth.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the config file (defaults to searching for medauth.toml)
        #[arg(short, long, env = "MEDAUTH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print a bcrypt hash for seeding an account
    HashPassword {
        /// The plaintext password
        password: String,

        /// bcrypt cost factor
        #[arg(short, long, default_value_t = bcrypt::DEFAULT_COST)]
        cost: u32,
    },

    /// Show which requirement the route policy resolves for a path
    Route {
        /// Request path, e.g. /api/v1/testing/me
        path: String,

        /// Path to the config file (defaults to searching for medauth.toml)
        #[arg(short, long, env = "MEDAUTH_CONFIG")]
        config: Option<PathBuf>,
    },
}
