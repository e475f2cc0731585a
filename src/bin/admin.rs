//! Client API Admin CLI
//!
//! Administrative CLI tool for inspecting and maintaining the JSON file used
//! by the file storage backend. It works on the file directly, so the server
//! doesn't need to be running.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_api::{Client, ClientStorage, FileStorage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "client-api-admin")]
#[command(about = "Client API Admin CLI - Inspect and maintain the client data file")]
#[command(version = "1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the client data file
    #[arg(long, env = "CLIENT_API__STORAGE__PATH", default_value = "clients.json")]
    file: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all clients
    List,

    /// Show a single client
    Get {
        /// Client ID to show
        client_id: i64,
    },

    /// Delete a specific client
    Delete {
        /// Client ID to delete
        client_id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },

    /// Show data file statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    let storage = FileStorage::new(&cli.file);
    info!("Using data file {}", storage.path().display());

    match cli.command {
        Commands::List => list_clients(&storage).await,
        Commands::Get { client_id } => get_client(&storage, client_id).await,
        Commands::Delete { client_id, confirm } => {
            delete_client(&storage, client_id, confirm).await
        }
        Commands::Stats => show_stats(&storage).await,
    }
}

async fn load(storage: &FileStorage) -> Result<Vec<Client>> {
    storage
        .load()
        .await
        .with_context(|| format!("failed to read {}", storage.path().display()))
}

async fn list_clients(storage: &FileStorage) -> Result<()> {
    let clients = load(storage).await?;
    println!("{}", serde_json::to_string_pretty(&clients)?);
    Ok(())
}

async fn get_client(storage: &FileStorage, client_id: i64) -> Result<()> {
    match storage.get_client(client_id).await? {
        Some(client) => println!("{}", serde_json::to_string_pretty(&client)?),
        None => bail!("Client {} not found", client_id),
    }
    Ok(())
}

async fn delete_client(storage: &FileStorage, client_id: i64, confirm: bool) -> Result<()> {
    if !confirm {
        warn!("Refusing to delete without --confirm");
        bail!("Deleting client {} requires --confirm", client_id);
    }

    if !storage.delete_client(client_id).await? {
        bail!("Client {} not found", client_id);
    }

    println!("✅ Deleted client {}", client_id);
    Ok(())
}

async fn show_stats(storage: &FileStorage) -> Result<()> {
    let clients = load(storage).await?;

    let mut seen: HashMap<i64, usize> = HashMap::new();
    for client in &clients {
        *seen.entry(client.id).or_insert(0) += 1;
    }
    let duplicate_ids = seen.values().filter(|count| **count > 1).count();
    let highest_id = clients.iter().map(|c| c.id).max();

    println!("📊 Client data statistics");
    println!("   File: {}", storage.path().display());
    println!("   Clients: {}", clients.len());
    match highest_id {
        Some(id) => println!("   Highest ID: {}", id),
        None => println!("   Highest ID: -"),
    }
    println!("   Duplicate IDs: {}", duplicate_ids);

    Ok(())
}
