//! Directory lookup: external instructor id → person attribute record.
//!
//! The directory is the institution's people service. Only the short-code
//! attribute matters downstream; the whole record is kept for the audit log.

mod http;

pub use http::HttpDirectory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// Attributes the directory returned for one person, keyed by attribute name.
pub type DirectoryRecord = BTreeMap<String, String>;

/// Anything that can resolve an external id to a directory record.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// `Ok(None)` when the directory has no entry for `external_id`.
    async fn lookup(&self, external_id: &str) -> Result<Option<DirectoryRecord>>;
}
