//! Identity bridge: instructor external id → short code → teacher reference.
//!
//! Failures here are per row. A row whose instructor cannot be resolved is
//! set aside with all of its fields for manual reconciliation; the rest of
//! the batch carries on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use crate::directory::{DirectoryLookup, DirectoryRecord};
use crate::error::Result;
use crate::ingest::RawRow;
use crate::registry::ShortIdIndex;

/// Directory answers per distinct external id (`None` = nothing usable).
pub type DirectoryIndex = BTreeMap<String, Option<DirectoryRecord>>;

/// Distinct, trimmed, non-empty instructor ids in sorted order.
pub fn instructor_ids(rows: &[RawRow]) -> BTreeSet<&str> {
    rows.iter()
        .map(|r| r.instructor_id.trim())
        .filter(|id| !id.is_empty())
        .collect()
}

/// A row whose instructor resolved to a registry entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedRow {
    pub row: RawRow,
    pub short_id: String,
    pub teacher_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Directory had no short id for the instructor
    NoShortId,
    /// Short id has no registry entity
    UnregisteredShortId,
}

/// A dropped row, serialized with its original column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based position among the rows read
    pub row_number: usize,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(flatten)]
    pub row: RawRow,
}

#[derive(Debug, Default)]
pub struct BridgeOutcome {
    pub identified: Vec<IdentifiedRow>,
    pub skipped: Vec<SkippedRow>,
    pub directory_index: DirectoryIndex,
}

pub struct IdentityBridge<'a> {
    directory: &'a dyn DirectoryLookup,
    short_id_attribute: String,
    concurrency: usize,
}

impl<'a> IdentityBridge<'a> {
    pub fn new(directory: &'a dyn DirectoryLookup, short_id_attribute: impl Into<String>, concurrency: usize) -> Self {
        Self {
            directory,
            short_id_attribute: short_id_attribute.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Look up every distinct instructor id once.
    ///
    /// Lookups run `concurrency` at a time over the ids in sorted order and
    /// are collected in that same order. A failed lookup counts as not found.
    pub async fn lookup_instructors(&self, rows: &[RawRow]) -> DirectoryIndex {
        let ids = instructor_ids(rows);
        log::info!("Looking up {} distinct instructors in the directory", ids.len());

        let directory = self.directory;
        let results: Vec<(String, Result<Option<DirectoryRecord>>)> = stream::iter(ids)
            .map(|id| async move { (id.to_string(), directory.lookup(id).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut failed = 0;
        let index: DirectoryIndex = results
            .into_iter()
            .map(|(id, result)| {
                let record = result.unwrap_or_else(|e| {
                    log::debug!("Directory lookup failed for {}: {}", id, e);
                    failed += 1;
                    None
                });
                (id, record)
            })
            .collect();
        if failed > 0 {
            log::warn!("{} directory lookups failed; treated as not found", failed);
        }
        index
    }

    /// Split rows into identified and skipped, preserving input order.
    pub fn identify(&self, rows: Vec<RawRow>, directory_index: DirectoryIndex, registry_index: &ShortIdIndex) -> BridgeOutcome {
        let short_ids: HashMap<&str, &str> = directory_index
            .iter()
            .filter_map(|(id, record)| {
                let short = record.as_ref()?.get(&self.short_id_attribute)?.trim();
                (!short.is_empty()).then_some((id.as_str(), short))
            })
            .collect();

        let mut identified = Vec::new();
        let mut skipped = Vec::new();

        for (idx, row) in rows.into_iter().enumerate() {
            let short_id = short_ids.get(row.instructor_id.trim()).map(|s| s.to_string());
            let Some(short_id) = short_id else {
                log::debug!("Row {}: no short id for instructor {}", idx + 1, row.instructor_id);
                skipped.push(SkippedRow {
                    row_number: idx + 1,
                    reason: SkipReason::NoShortId,
                    short_id: None,
                    row,
                });
                continue;
            };

            match registry_index.get(&short_id) {
                Some(teacher_ref) => identified.push(IdentifiedRow {
                    teacher_ref: teacher_ref.clone(),
                    short_id,
                    row,
                }),
                None => {
                    log::debug!("Row {}: short id {} not in registry", idx + 1, short_id);
                    skipped.push(SkippedRow {
                        row_number: idx + 1,
                        reason: SkipReason::UnregisteredShortId,
                        short_id: Some(short_id),
                        row,
                    });
                }
            }
        }

        log::info!(
            "Identified {} rows, skipped {} (see skipped rows log)",
            identified.len(),
            skipped.len()
        );

        BridgeOutcome {
            identified,
            skipped,
            directory_index,
        }
    }

    /// Directory lookups followed by identification.
    pub async fn run(&self, rows: Vec<RawRow>, registry_index: &ShortIdIndex) -> BridgeOutcome {
        let directory_index = self.lookup_instructors(&rows).await;
        self.identify(rows, directory_index, registry_index)
    }
}
