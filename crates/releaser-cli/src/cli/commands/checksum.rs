//! `plugin-releaser checksum`: SHA-256 of a local file.

use anyhow::Result;
use releaser_core::checksum;
use std::path::Path;

/// Print the digest in `sha256sum` format.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
