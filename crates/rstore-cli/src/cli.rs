use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rstore",
    about = "rstore: versioned remoteStorage document server",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root, overriding the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the storage over HTTP
    Serve(ServeArgs),
    /// Store a document
    Put(PutArgs),
    /// Print a document's content
    Get(PathArgs),
    /// Delete a document
    Rm(PathArgs),
    /// List a folder
    Ls(PathArgs),
    /// Show the version of a document or folder
    Version(PathArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the configuration
    #[arg(long)]
    pub bind: Option<std::net::SocketAddr>,
}

#[derive(Debug, Args)]
pub struct PutArgs {
    pub path: String,
    #[arg(short = 't', long = "type", default_value = "text/plain")]
    pub content_type: String,
    /// Read the content from a file
    #[arg(short, long, conflicts_with = "content")]
    pub file: Option<PathBuf>,
    /// Use the given string as content
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    pub path: String,
}
