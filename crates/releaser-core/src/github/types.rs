//! Subset of the GitHub releases API payloads.

use serde::Deserialize;

/// GitHub release metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// Hypermedia upload URL, e.g. `https://uploads.github.com/.../assets{?name,label}`.
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// GitHub release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}

impl Release {
    /// Upload endpoint for an asset called `name`.
    pub fn asset_upload_url(&self, name: &str) -> String {
        let base = match self.upload_url.find('{') {
            Some(i) => &self.upload_url[..i],
            None => self.upload_url.as_str(),
        };
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        format!("{}?name={}", base, encoded)
    }

    pub fn asset_named(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_listing() {
        let json = r#"[{
            "id": 7,
            "tag_name": "plugin/v0.0.8",
            "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
            "assets": [{"id": 70, "name": "a.tar.gz", "browser_download_url": "https://github.com/o/r/releases/download/plugin/v0.0.8/a.tar.gz"}],
            "draft": false
        }]"#;
        let releases: Vec<Release> = serde_json::from_str(json).unwrap();
        assert_eq!(releases[0].id, 7);
        assert_eq!(releases[0].assets[0].name, "a.tar.gz");
    }

    #[test]
    fn asset_upload_url_strips_template_and_encodes_name() {
        let release = Release {
            id: 1,
            tag_name: "v1".to_string(),
            upload_url: "https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}".to_string(),
            assets: Vec::new(),
        };
        assert_eq!(
            release.asset_upload_url("my plugin.json"),
            "https://uploads.github.com/repos/o/r/releases/1/assets?name=my+plugin.json"
        );
    }
}
