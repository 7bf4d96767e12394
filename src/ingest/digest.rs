use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::Result;

/// Compute SHA256 hash of the export, recorded in the run summary
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = hasher.finalize();
    Ok(format!("{:x}", hash))
}
