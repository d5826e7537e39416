//! SHA-256 helpers for deduplicating uploaded scene files.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// SHA-256 hex digest of the file at `path`, or `None` if it is not a file.
pub fn sha256_file(path: &Path) -> Result<Option<String>, CoreError> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(Some(format!("{:x}", hasher.finalize())))
}

/// Write `data` to `dest` unless `dest` already holds identical content.
///
/// Returns `true` if the file was written.
pub fn store_upload(data: &[u8], dest: &Path) -> Result<bool, CoreError> {
    if sha256_file(dest)?.as_deref() == Some(sha256_hex(data).as_str()) {
        tracing::debug!(dest = %dest.display(), "Upload identical to existing file, skipping write");
        return Ok(false);
    }
    std::fs::write(dest, data)?;
    tracing::info!(dest = %dest.display(), bytes = data.len(), "Stored uploaded file");
    Ok(true)
}
