mod cli;

use hls_sink::{config, resolver, server};
use hls_sink_playlist::MergeEngine;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting hls-sink server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hls_sink=trace,hls_sink_playlist=trace,hls_sink_common=debug,tower_http=debug"
                .to_string()
        } else {
            "hls_sink=debug,hls_sink_playlist=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Resolve { url } => resolve_url(&url, cli.config.as_deref()),
        Commands::Merge { playlist, incoming } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(merge_files(&playlist, &incoming, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("hls-sink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn resolve_url(url: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let target = resolver::resolve(&config.storage.root, url)?;

    println!("Directory: {}", target.dir.display());
    println!("File:      {}", target.file_name);
    println!("Kind:      {:?}", target.kind());

    Ok(())
}

async fn merge_files(playlist: &Path, incoming: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !playlist.exists() {
        anyhow::bail!("Playlist does not exist: {:?}", playlist);
    }

    let text = tokio::fs::read(incoming)
        .await
        .with_context(|| format!("Failed to read incoming playlist: {:?}", incoming))?;
    let text = String::from_utf8_lossy(&text);

    let engine = MergeEngine::new(config.merge.lock_scope);
    let outcome = engine
        .merge_append(playlist, &text)
        .await
        .with_context(|| format!("Failed to merge into {:?}", playlist))?;

    if outcome.is_noop() {
        println!("No new segments; {} unchanged", playlist.display());
    } else {
        println!(
            "Appended {} segment(s) ({} bytes) to {}",
            outcome.appended,
            outcome.bytes_written,
            playlist.display()
        );
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  URL header: {}", config.server.url_header);
            println!("  Max body: {} bytes", config.server.max_body_bytes);
            println!("  Storage root: {:?}", config.storage.root);
            println!("  Lock scope: {:?}", config.merge.lock_scope);
            println!(
                "  Verify duplicate segments: {}",
                config.segments.verify_duplicates
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Storage root: {:?}", config.storage.root);
        }
    }

    Ok(())
}
