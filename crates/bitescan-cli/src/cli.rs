//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BiteScan - Track groceries from your receipts
#[derive(Parser)]
#[command(name = "bitescan")]
#[command(about = "Grocery receipt tracker: prices, pantry and nutrition", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "bitescan.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BITESCAN_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// User whose receipts to work with
    #[arg(short, long, default_value = "1", global = true)]
    pub user: i64,

    /// Config file (defaults to the data directory, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage receipts (list, add-scan, status, delete)
    Receipts {
        #[command(subcommand)]
        action: Option<ReceiptsAction>,
    },

    /// List purchased items
    Items {
        /// Only items of this receipt
        #[arg(short, long)]
        receipt: Option<i64>,
    },

    /// Compare prices across stores
    Prices {
        /// Filter products by name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show and edit the pantry
    Pantry {
        #[command(subcommand)]
        action: Option<PantryAction>,
    },

    /// Show nutrition and spending dashboard
    Dashboard,

    /// Pull receipts from the sync server
    Sync {
        /// Read a saved receipts API response instead of calling the server
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Export items or price history
    Export {
        /// What to export: items, prices
        #[arg(short, long, default_value = "items")]
        kind: String,

        /// Output format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ReceiptsAction {
    /// List receipts
    List {
        /// Filter by status: pending, processing, completed, failed
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Import an OCR scan result (JSON, optionally wrapped in text)
    AddScan {
        /// File holding the scanner's response
        file: PathBuf,
    },

    /// Set a receipt's status
    Status {
        /// Receipt ID
        receipt_id: i64,

        /// New status: pending, processing, completed, failed
        status: String,
    },

    /// Delete a receipt and its items
    Delete {
        /// Receipt ID
        receipt_id: i64,
    },
}

#[derive(Subcommand)]
pub enum PantryAction {
    /// List pantry items, longest-lasting first
    List,

    /// Add a pantry item, or update one with --id
    Add {
        /// Item name
        name: String,

        /// Quantity, e.g. "2" or "2 lbs"
        #[arg(short, long, default_value = "1")]
        quantity: String,

        /// Unit price
        #[arg(short, long, default_value = "0")]
        price: String,

        /// Purchase date (MM/DD/YYYY, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Store name
        #[arg(long, default_value = "")]
        store: String,

        /// Category: Grocery, Fruit, Veggies, Meat, Fish, Dairy
        #[arg(short, long, default_value = "")]
        category: String,

        /// Existing item to update
        #[arg(long)]
        id: Option<i64>,
    },

    /// Remove an item from the pantry
    Delete {
        /// Item ID
        id: i64,
    },
}
