//! Receipt sync: merge remote receipts into the local store
//!
//! # Architecture
//!
//! - [`reconcile`]: pure merge of a local and a remote list keyed by id
//! - [`RemoteSource`]: where remote receipts come from (`HttpRemoteSource`,
//!   `FileRemoteSource`)
//! - [`Connectivity`]: whether to attempt the fetch at all
//! - [`SyncService`]: ties the three together against a [`Database`]
//!
//! The remote side is authoritative: a record with a known id replaces the
//! local one wholesale when the two differ. Records are never merged field by
//! field and local-only records are never deleted.
//!
//! A sync never fails because of the network. When offline, when the fetch
//! fails, or when the remote data is invalid, the local receipts are returned
//! unchanged and the reason is logged. Remote records whose id already
//! belongs to another user are skipped.

pub mod connectivity;
pub mod remote;

pub use connectivity::{AssumeOnline, Connectivity, HttpProbe};
pub use remote::{FileRemoteSource, HttpRemoteSource, RemoteReceipt, RemoteSource};

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::db::{validate_item_values, Database};
use crate::error::{Error, Result};
use crate::models::{PurchasedItem, Receipt};

/// Records that carry a stable id across devices
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Receipt {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for PurchasedItem {
    fn key(&self) -> i64 {
        self.id
    }
}

/// Outcome of merging a remote list into a local one
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T> {
    /// Local order with replacements applied, then new remote records
    pub records: Vec<T>,
    /// Ids added from the remote side, in remote order
    pub inserted: Vec<i64>,
    /// Ids whose local record was replaced
    pub updated: Vec<i64>,
}

impl<T> Reconciliation<T> {
    pub fn is_unchanged(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty()
    }
}

/// Merge `remote` into `local`, remote wins on differing records
pub fn reconcile<T: Keyed + Clone + PartialEq>(local: &[T], remote: &[T]) -> Reconciliation<T> {
    let mut records: Vec<T> = local.to_vec();
    let mut positions: HashMap<i64, usize> = records
        .iter()
        .enumerate()
        .map(|(pos, r)| (r.key(), pos))
        .collect();
    let mut inserted = Vec::new();
    let mut updated = Vec::new();

    for incoming in remote {
        let id = incoming.key();
        match positions.get(&id) {
            Some(&pos) => {
                if records[pos] != *incoming {
                    debug!("Replacing record {}", id);
                    records[pos] = incoming.clone();
                    if !inserted.contains(&id) && !updated.contains(&id) {
                        updated.push(id);
                    }
                }
            }
            None => {
                debug!("Adding record {}", id);
                positions.insert(id, records.len());
                records.push(incoming.clone());
                inserted.push(id);
            }
        }
    }

    Reconciliation {
        records,
        inserted,
        updated,
    }
}

pub fn reconcile_receipts(local: &[Receipt], remote: &[Receipt]) -> Vec<Receipt> {
    reconcile(local, remote).records
}

pub fn reconcile_items(local: &[PurchasedItem], remote: &[PurchasedItem]) -> Vec<PurchasedItem> {
    reconcile(local, remote).records
}

/// Summary of one sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub user_id: i64,
    pub receipts_inserted: usize,
    pub receipts_updated: usize,
    pub items_inserted: usize,
    pub items_updated: usize,
    /// Why the fetch was skipped, if it was
    pub skipped: Option<String>,
    /// The user's receipts after the sync, newest first
    pub receipts: Vec<Receipt>,
}

/// Fetches remote receipts and writes the merge into the database
pub struct SyncService {
    source: Box<dyn RemoteSource>,
    connectivity: Box<dyn Connectivity>,
}

impl SyncService {
    pub fn new(source: Box<dyn RemoteSource>, connectivity: Box<dyn Connectivity>) -> Self {
        Self {
            source,
            connectivity,
        }
    }

    /// Receipts API client plus the configured connectivity check
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpRemoteSource::from_config(config)?),
            connectivity::from_config(config)?,
        ))
    }

    /// Sync one user's receipts and items
    ///
    /// Only database errors are returned; network problems leave the local
    /// data untouched and are reported through `SyncReport::skipped`.
    pub async fn sync_user(&self, db: &Database, user_id: i64) -> Result<SyncReport> {
        let mut report = SyncReport {
            user_id,
            ..Default::default()
        };

        if !self.connectivity.is_online().await {
            info!("Offline, skipping receipt sync for user {}", user_id);
            report.skipped = Some("offline".to_string());
            report.receipts = db.get_receipts_for_user(user_id)?;
            return Ok(report);
        }

        let remote = match self.source.fetch_receipts(user_id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    "Receipt fetch from {} failed, using local data: {}",
                    self.source.describe(),
                    e
                );
                report.skipped = Some(format!("fetch failed: {}", e));
                report.receipts = db.get_receipts_for_user(user_id)?;
                return Ok(report);
            }
        };

        match apply_remote(db, user_id, &remote, &mut report) {
            Ok(()) => {}
            Err(Error::InvalidData(msg)) => {
                warn!("Rejected remote receipts for user {}: {}", user_id, msg);
                report = SyncReport {
                    user_id,
                    skipped: Some(format!("invalid remote data: {}", msg)),
                    ..Default::default()
                };
                report.receipts = db.get_receipts_for_user(user_id)?;
                return Ok(report);
            }
            Err(e) => return Err(e),
        }
        report.receipts = db.get_receipts_for_user(user_id)?;

        info!(
            "Synced user {} from {}: {} new / {} updated receipts, {} new / {} updated items",
            user_id,
            self.source.describe(),
            report.receipts_inserted,
            report.receipts_updated,
            report.items_inserted,
            report.items_updated
        );
        Ok(report)
    }
}

/// Write the merge of `remote` into the database
///
/// Records owned by another user are skipped with a warning. Item values are
/// checked before anything is written, and the writes share one transaction.
pub fn apply_remote(
    db: &Database,
    user_id: i64,
    remote: &[RemoteReceipt],
    report: &mut SyncReport,
) -> Result<()> {
    let (remote_receipts, remote_items) = owned_records(db, user_id, remote)?;
    for item in &remote_items {
        validate_item_values(item.quantity, item.price)?;
    }

    let local_receipts = db.get_receipts_for_user(user_id)?;
    let receipts = reconcile(&local_receipts, &remote_receipts);
    let local_items = db.get_items_for_user(user_id)?;
    let items = reconcile(&local_items, &remote_items);

    let changed_receipts: Vec<Receipt> = changed(&receipts).cloned().collect();
    let changed_items: Vec<PurchasedItem> = changed(&items).cloned().collect();
    db.write_synced(user_id, &changed_receipts, &changed_items)?;

    report.receipts_inserted += receipts.inserted.len();
    report.receipts_updated += receipts.updated.len();
    report.items_inserted += items.inserted.len();
    report.items_updated += items.updated.len();
    Ok(())
}

/// Remote receipts and items minus those another user already owns
fn owned_records(
    db: &Database,
    user_id: i64,
    remote: &[RemoteReceipt],
) -> Result<(Vec<Receipt>, Vec<PurchasedItem>)> {
    let mut receipts = Vec::new();
    let mut items = Vec::new();

    for entry in remote {
        if let Some(owner) = db.receipt_owner(entry.receipt.id)? {
            if owner != user_id {
                warn!(
                    "Skipping remote receipt {}: owned by user {}",
                    entry.receipt.id, owner
                );
                continue;
            }
        }
        receipts.push(entry.receipt.clone());

        for item in &entry.items {
            match db.item_owner(item.id)? {
                Some(owner) if owner != user_id => {
                    warn!("Skipping remote item {}: owned by user {}", item.id, owner)
                }
                _ => items.push(item.clone()),
            }
        }
    }

    Ok((receipts, items))
}

fn changed<T: Keyed>(merge: &Reconciliation<T>) -> impl Iterator<Item = &T> {
    merge
        .records
        .iter()
        .filter(|r| merge.inserted.contains(&r.key()) || merge.updated.contains(&r.key()))
}
