//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use bitescan_core::Config;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: Config,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting BiteScan web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Sync endpoint: {}", config.sync.endpoint);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    bitescan_server::serve(db, config, host, port, static_dir_str).await?;

    Ok(())
}
