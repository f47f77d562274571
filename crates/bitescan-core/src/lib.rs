//! BiteScan Core Library
//!
//! Shared functionality for the BiteScan grocery receipt tracker:
//! - Database access and migrations (receipts, items, scan imports)
//! - Receipt scan import from OCR/AI JSON
//! - Item name normalization and category inference
//! - Derived views: price tracker, pantry, nutrition, dashboard
//! - Remote receipt sync with last-write-wins reconciliation
//! - CSV/JSON export

pub mod categories;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod normalize;
pub mod nutrition;
pub mod pantry;
pub mod prices;
pub mod rules;
pub mod sync;

/// Test utilities including mock sync server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categories::{infer_category, resolve_category, ShelfLife};
pub use config::{Config, ConnectivityMode, SyncConfig};
pub use dashboard::{DashboardSnapshot, Insight, RecipeSuggestion};
pub use db::{Database, ImportResult};
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportKind};
pub use import::{PreparedImport, ScannedLineItem, ScannedReceipt};
pub use normalize::{normalize, title_case};
pub use nutrition::{aggregate, MacroBreakdown, Metrics, NutritionSummary};
pub use pantry::{PantryEntryInput, PantryItem, PantryView};
pub use prices::{PriceEntry, PriceGroup, PriceTrackerView};
pub use sync::{SyncReport, SyncService};
