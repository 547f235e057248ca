use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "podvault")]
#[command(author, version, about = "Podcast search and detail aggregation across providers")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search podcasts on one provider
    Search {
        /// Search terms
        #[arg(required = true)]
        query: String,

        /// Provider to search (itunes, taddy, podchaser)
        #[arg(short, long)]
        provider: Option<String>,

        /// Maximum number of results (1-50)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show hydrated podcast detail for an id or slug
    Detail {
        /// Podcast id or slug
        #[arg(required = true)]
        id: String,
    },

    /// Show credits (hosts, guests) for an id or slug
    Credits {
        /// Podcast id or slug
        #[arg(required = true)]
        id: String,
    },

    /// List the available providers
    Providers,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
