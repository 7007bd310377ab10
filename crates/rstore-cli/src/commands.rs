use std::fs;
use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use rstore_core::{StorageCoordinator, StoragePath};
use rstore_server::{RstoreServer, ServerConfig};
use serde_json::json;
use tracing::{debug, info};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(data_dir = %config.storage.data_dir.display(), "dispatching command");
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Put(args) => cmd_put(&open(&config)?, args, &cli.format),
        Command::Get(args) => cmd_get(&open(&config)?, args),
        Command::Rm(args) => cmd_rm(&open(&config)?, args, &cli.format),
        Command::Ls(args) => cmd_ls(&open(&config)?, args, &cli.format),
        Command::Version(args) => cmd_version(&open(&config)?, args, &cli.format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    Ok(config)
}

fn open(config: &ServerConfig) -> anyhow::Result<StorageCoordinator> {
    let storage = config
        .storage
        .open_coordinator()
        .with_context(|| format!("opening storage at {}", config.storage.data_dir.display()))?;
    debug!(data_dir = %config.storage.data_dir.display(), "storage opened");
    Ok(storage)
}

fn parse(raw: &str) -> anyhow::Result<StoragePath> {
    Ok(StoragePath::parse(raw)?)
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    info!(bind = %config.bind_addr, data_dir = %config.storage.data_dir.display(), "starting server");
    let server = RstoreServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_put(storage: &StorageCoordinator, args: PutArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let path = parse(&args.path)?;
    let content = match (&args.file, args.content) {
        (Some(file), _) => fs::read(file).with_context(|| format!("reading {}", file.display()))?,
        (None, Some(content)) => content.into_bytes(),
        (None, None) => anyhow::bail!("either --file or --content is required"),
    };
    let version = storage.put_document(&path, &args.content_type, &content)?;
    info!(path = %path, version, "document stored");
    match format {
        OutputFormat::Json => println!("{}", json!({ "path": path, "version": version })),
        OutputFormat::Text => println!(
            "{} Stored {} ({} bytes, version {})",
            "✓".green().bold(),
            path.as_str().bold(),
            content.len(),
            version.to_string().yellow()
        ),
    }
    Ok(())
}

fn cmd_get(storage: &StorageCoordinator, args: PathArgs) -> anyhow::Result<()> {
    let path = parse(&args.path)?;
    let document = storage.get_document(&path)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&document.content)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_rm(storage: &StorageCoordinator, args: PathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let path = parse(&args.path)?;
    let removed = storage.delete_document(&path)?;
    info!(path = %path, removed = removed.len(), "document removed");
    match format {
        OutputFormat::Json => println!("{}", json!({ "removed": removed })),
        OutputFormat::Text => {
            for p in &removed {
                println!("  {} {}", "removed:".red(), p);
            }
        }
    }
    Ok(())
}

fn cmd_ls(storage: &StorageCoordinator, args: PathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let path = parse(&args.path)?;
    let listing = storage.folder(&path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => {
            if listing.is_empty() {
                println!("{} is empty.", path.as_str().bold());
            }
            for (name, item) in &listing.items {
                match (&item.content_type, item.content_length) {
                    (Some(ct), Some(len)) => println!(
                        "  {:<32} {:>6}  {:>10}  {}",
                        name,
                        item.etag.to_string().yellow(),
                        len,
                        ct.dimmed()
                    ),
                    _ => println!("  {:<32} {:>6}", name.blue().bold(), item.etag.to_string().yellow()),
                }
            }
        }
    }
    Ok(())
}

fn cmd_version(storage: &StorageCoordinator, args: PathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let path = parse(&args.path)?;
    let version = storage.version(&path)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "path": path, "version": version })),
        OutputFormat::Text => match version {
            Some(v) => println!("{} {}", path.as_str().bold(), v.to_string().yellow()),
            None => println!("{} {}", path.as_str().bold(), "absent".dimmed()),
        },
    }
    Ok(())
}
