//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `dashboard` - Nutrition and spending summary
//! - `export` - Item and price history export
//! - `items` - Purchased item listing
//! - `pantry` - Pantry listing and editing
//! - `prices` - Cross-store price comparison
//! - `receipts` - Receipt commands (list, add-scan, status, delete)
//! - `serve` - Web server command
//! - `sync` - Remote receipt sync

pub mod core;
pub mod dashboard;
pub mod export;
pub mod items;
pub mod pantry;
pub mod prices;
pub mod receipts;
pub mod serve;
pub mod sync;

// Re-export command functions for main.rs
pub use core::*;
pub use dashboard::*;
pub use export::*;
pub use items::*;
pub use pantry::*;
pub use prices::*;
pub use receipts::*;
pub use serve::*;
pub use sync::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
