//! SHA-256 fingerprints of release assets and the checksums file built from them.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ReleaseError;
use crate::url_model::asset_filename;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large archives.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Asset download URL → lowercase hex SHA-256, looked up case-insensitively.
///
/// Entries are written once by the resolver and read by the second render
/// pass. Keys are sorted so anything derived from the map is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetChecksumMap {
    /// lower-cased url → (url as first inserted, digest)
    entries: BTreeMap<String, (String, String)>,
}

impl AssetChecksumMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-normalized lookup key for a URL.
    pub fn key(url: &str) -> String {
        url.to_lowercase()
    }

    /// Insert a digest. Returns false (and keeps the first digest) if the URL
    /// is already present.
    pub fn insert(&mut self, url: &str, digest: String) -> bool {
        match self.entries.entry(Self::key(url)) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(v) => {
                v.insert((url.to_string(), digest));
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(&Self::key(url)).map(|(_, d)| d.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (url, digest) pairs in key order; urls keep their original case.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().map(|(u, d)| (u.as_str(), d.as_str()))
    }
}

impl FromIterator<(String, String)> for AssetChecksumMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = AssetChecksumMap::new();
        for (url, digest) in iter {
            map.insert(&url, digest);
        }
        map
    }
}

/// Render the checksums file: one `"<sha256>  <filename>"` line per URL
/// ending in `suffix`, in URL order, each line newline-terminated.
pub fn checksums_file(map: &AssetChecksumMap, suffix: &str) -> Result<String, ReleaseError> {
    let mut out = String::new();
    for (url, digest) in map.iter().filter(|(url, _)| url.ends_with(suffix)) {
        let name = asset_filename(url)?;
        out.push_str(digest);
        out.push_str("  ");
        out.push_str(&name);
        out.push('\n');
    }
    Ok(out)
}

/// Name of the uploaded checksums asset for a release tag.
pub fn checksums_asset_name(tag: &str) -> String {
    format!("checksums-{}.txt", tag.replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn map_keys_are_case_normalized_and_insert_once() {
        let mut map = AssetChecksumMap::new();
        assert!(map.insert("https://Example.com/A.tar.gz", "aa".to_string()));
        assert!(!map.insert("https://example.com/a.tar.gz", "bb".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("HTTPS://EXAMPLE.COM/A.TAR.GZ"), Some("aa"));
    }

    #[test]
    fn checksums_file_lists_only_suffix_matches() {
        let map: AssetChecksumMap = [
            (
                "https://example.com/v1/plugin-linux-amd64.tar.gz".to_string(),
                "1111".to_string(),
            ),
            (
                "https://example.com/v1/plugin-windows-amd64.zip".to_string(),
                "2222".to_string(),
            ),
        ]
        .into_iter()
        .collect();

        let out = checksums_file(&map, ".tar.gz").unwrap();
        assert_eq!(out, "1111  plugin-linux-amd64.tar.gz\n");
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn checksums_file_empty_when_nothing_matches() {
        let map: AssetChecksumMap =
            [("https://example.com/a.zip".to_string(), "00".to_string())]
                .into_iter()
                .collect();
        assert_eq!(checksums_file(&map, ".tar.gz").unwrap(), "");
    }

    #[test]
    fn checksums_asset_name_flattens_tag() {
        assert_eq!(checksums_asset_name("v0.1.0"), "checksums-v0.1.0.txt");
        assert_eq!(checksums_asset_name("plugin/v0.0.8"), "checksums-plugin-v0.0.8.txt");
    }
}
