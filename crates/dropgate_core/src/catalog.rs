use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The catalog is the single shared document between the admin service and
/// the public gate. It maps asset identifiers to object keys, download
/// tokens and upload metadata.
///
/// Wire layout (stored as-is under [`crate::store::CATALOG_KEY`]):
/// `{ "assets": [ {assetId, fileName, cosObjectKey, password, createdAt, createdBy}, ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Insertion order; not semantically meaningful.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Catalog {
    pub fn find(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.find(asset_id).is_some()
    }

    pub fn push(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    /// Removes and returns the asset with the given id, if any.
    pub fn remove(&mut self, asset_id: &str) -> Option<Asset> {
        let idx = self.assets.iter().position(|a| a.asset_id == asset_id)?;
        Some(self.assets.remove(idx))
    }
}

/// One registered downloadable file. Immutable after creation; created and
/// destroyed only through whole-catalog load/mutate/save cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Derived from the file name plus a random suffix; unique per catalog.
    pub asset_id: String,

    /// Original upload name, used as the suggested save name on download.
    pub file_name: String,

    /// Key under which the bytes live in the object store. Derived from the
    /// upload folder and file name, NOT randomized: two uploads of the same
    /// name into the same folder overwrite each other's bytes.
    pub cos_object_key: String,

    /// Plaintext shared secret acting as the download token.
    pub password: String,

    pub created_at: DateTime<Utc>,

    /// Identity of the uploading administrator.
    pub created_by: String,
}

/// A catalog entry with the token stripped, for admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub asset_id: String,
    pub file_name: String,
    pub cos_object_key: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<&Asset> for AssetSummary {
    fn from(asset: &Asset) -> Self {
        Self {
            asset_id: asset.asset_id.clone(),
            file_name: asset.file_name.clone(),
            cos_object_key: asset.cos_object_key.clone(),
            created_at: asset.created_at,
            created_by: asset.created_by.clone(),
        }
    }
}

/// What the uploader hands to the downloader: asset id plus token. The gate
/// needs nothing else to authorize the transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLocator {
    pub asset_id: String,
    pub token: String,
}

impl DownloadLocator {
    /// Renders the shareable URL against the public gate's base URL, e.g.
    /// `https://files.example.com/d/report-x7f3a9?token=Hunter2%21`.
    pub fn to_url(&self, public_base: &str) -> String {
        format!(
            "{}/d/{}?token={}",
            public_base.trim_end_matches('/'),
            self.asset_id,
            encode_query_value(&self.token)
        )
    }
}

/// Percent-encodes everything outside the URL-unreserved set. Tokens are
/// operator-chosen passwords and routinely contain `&`, `+` or `#`.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
