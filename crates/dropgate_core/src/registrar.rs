use crate::catalog::{Asset, DownloadLocator};
use crate::error::DropgateError;
use crate::store::CatalogStore;
use crate::traits::ObjectStore;

use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::info;

/// Punctuation characters that satisfy the "special character" requirement.
pub const PASSWORD_PUNCTUATION: &str = "!@#$%^&*()-_=+[]{};:,.<>?";

const ASSET_ID_SUFFIX_LEN: usize = 10;
const OBJECT_CONTENT_TYPE: &str = "application/octet-stream";

/// Checks the registration password policy: at least one uppercase letter,
/// one digit and one character from [`PASSWORD_PUNCTUATION`].
pub fn validate_password(password: &str) -> Result<(), DropgateError> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(DropgateError::WeakPassword(
            "must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DropgateError::WeakPassword("must contain a digit"));
    }
    if !password.chars().any(|c| PASSWORD_PUNCTUATION.contains(c)) {
        return Err(DropgateError::WeakPassword(
            "must contain a special character",
        ));
    }
    Ok(())
}

/// Joins the optional folder path (slashes trimmed) with the file name.
/// The key is deliberately NOT randomized: uploading the same name into the
/// same folder overwrites the bytes in place, letting operators republish a
/// file without minting a new key.
pub fn derive_object_key(folder: Option<&str>, file_name: &str) -> String {
    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{folder}/{file_name}"),
        None => file_name.to_string(),
    }
}

/// Derives `<stem>-<random suffix>`; the suffix comes from the thread CSPRNG
/// so collisions across a catalog are negligible even for same-named files.
pub fn derive_asset_id(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ASSET_ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{stem}-{suffix}")
}

/// The outcome of a successful registration: the catalog entry plus the
/// locator to hand to the downloader.
#[derive(Debug, Clone)]
pub struct Registration {
    pub asset: Asset,
    pub locator: DownloadLocator,
}

/// Admin-side write path: stores object bytes, then appends to the catalog.
#[derive(Clone)]
pub struct Registrar<S: ObjectStore> {
    store: S,
    catalog: CatalogStore<S>,
}

impl<S: ObjectStore> Registrar<S> {
    pub fn new(store: S) -> Self {
        let catalog = CatalogStore::new(store.clone());
        Self { store, catalog }
    }

    /// Registers an uploaded file: validates the password, writes the bytes
    /// under the derived object key, then runs one catalog
    /// load/append/save cycle.
    ///
    /// The object write must land before the catalog is touched; an asset
    /// must never appear in the catalog pointing at an object that does not
    /// exist yet. The reverse can still happen: if the catalog save fails
    /// after a successful write, the object is orphaned and the error names
    /// it instead of being swallowed.
    pub async fn register(
        &self,
        file_name: &str,
        folder: Option<&str>,
        password: &str,
        created_by: &str,
        data: Bytes,
    ) -> Result<Registration, DropgateError> {
        if file_name.is_empty() {
            return Err(DropgateError::BadRequest("fileName"));
        }
        if password.is_empty() {
            return Err(DropgateError::BadRequest("password"));
        }
        validate_password(password)?;

        let cos_object_key = derive_object_key(folder, file_name);
        let asset_id = derive_asset_id(file_name);

        self.store
            .put(&cos_object_key, data, OBJECT_CONTENT_TYPE)
            .await
            .map_err(|e| DropgateError::ServiceUnavailable(format!("object write failed: {e}")))?;

        let asset = Asset {
            asset_id: asset_id.clone(),
            file_name: file_name.to_string(),
            cos_object_key: cos_object_key.clone(),
            password: password.to_string(),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };

        let mut catalog = self.catalog.load_or_default().await;
        catalog.push(asset.clone());
        self.catalog.save(&catalog).await.map_err(|e| {
            DropgateError::PartialFailure(format!(
                "object '{cos_object_key}' was stored but the catalog update failed: {e}"
            ))
        })?;

        info!(asset_id = %asset.asset_id, key = %asset.cos_object_key, "Registered asset");

        let locator = DownloadLocator {
            asset_id,
            token: password.to_string(),
        };
        Ok(Registration { asset, locator })
    }

    /// Revokes an asset: deletes the object first, then removes the catalog
    /// entry. If the delete fails nothing is removed from the catalog, so a
    /// catalog entry never points at an already-deleted object.
    pub async fn revoke(&self, asset_id: &str) -> Result<Asset, DropgateError> {
        if asset_id.is_empty() {
            return Err(DropgateError::BadRequest("assetId"));
        }

        let mut catalog = self.catalog.load_or_default().await;
        let Some(asset) = catalog.find(asset_id).cloned() else {
            return Err(DropgateError::NotFound);
        };

        self.store.delete(&asset.cos_object_key).await.map_err(|e| {
            DropgateError::ServiceUnavailable(format!("object delete failed: {e}"))
        })?;

        catalog.remove(asset_id);
        self.catalog.save(&catalog).await.map_err(|e| {
            DropgateError::PartialFailure(format!(
                "object '{}' was deleted but its catalog entry remains: {e}",
                asset.cos_object_key
            ))
        })?;

        info!(asset_id = %asset.asset_id, key = %asset.cos_object_key, "Revoked asset");
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CATALOG_KEY, CatalogStore};
    use crate::testutil::MemStore;

    fn registrar() -> (MemStore, Registrar<MemStore>) {
        let store = MemStore::new();
        (store.clone(), Registrar::new(store))
    }

    #[tokio::test]
    async fn register_stores_object_and_catalog_entry() {
        let (store, registrar) = registrar();

        let reg = registrar
            .register(
                "report.pdf",
                Some("/quarterly/"),
                "Abcdefg1!",
                "ops",
                Bytes::from_static(b"pdf bytes"),
            )
            .await
            .unwrap();

        assert_eq!(reg.asset.cos_object_key, "quarterly/report.pdf");
        assert!(reg.asset.asset_id.starts_with("report-"));
        assert_eq!(reg.locator.token, "Abcdefg1!");
        assert!(store.contains("quarterly/report.pdf"));

        let catalog = CatalogStore::new(store).load_strict().await.unwrap();
        assert!(catalog.contains(&reg.asset.asset_id));
    }

    #[tokio::test]
    async fn password_policy_cases() {
        let (_, registrar) = registrar();
        let data = Bytes::from_static(b"x");

        for weak in ["alllower1!", "Abcdefg!", "Abcdefg1"] {
            let err = registrar
                .register("a.pdf", None, weak, "ops", data.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, DropgateError::WeakPassword(_)), "{weak}");
        }

        registrar
            .register("a.pdf", None, "Abcdefg1!", "ops", data)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn same_file_name_gets_distinct_asset_ids() {
        let (_, registrar) = registrar();

        let first = registrar
            .register("report.pdf", None, "Abcdefg1!", "ops", Bytes::new())
            .await
            .unwrap();
        let second = registrar
            .register("report.pdf", None, "Abcdefg1!", "ops", Bytes::new())
            .await
            .unwrap();

        assert_ne!(first.asset.asset_id, second.asset.asset_id);
        // Same derived key: the second upload overwrote the first's bytes.
        assert_eq!(first.asset.cos_object_key, second.asset.cos_object_key);
    }

    #[tokio::test]
    async fn object_write_failure_leaves_catalog_untouched() {
        let (store, registrar) = registrar();
        store.fail_next_put_of("a.pdf");

        let err = registrar
            .register("a.pdf", None, "Abcdefg1!", "ops", Bytes::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DropgateError::ServiceUnavailable(_)));
        assert!(!store.contains(CATALOG_KEY));
        assert!(!store.contains("a.pdf"));
    }

    #[tokio::test]
    async fn catalog_save_failure_reports_the_orphaned_object() {
        let (store, registrar) = registrar();
        store.fail_next_put_of(CATALOG_KEY);

        let err = registrar
            .register("a.pdf", None, "Abcdefg1!", "ops", Bytes::new())
            .await
            .unwrap_err();

        // The object landed, the catalog entry did not; the error names the
        // orphan instead of swallowing it.
        match err {
            DropgateError::PartialFailure(msg) => assert!(msg.contains("a.pdf")),
            other => panic!("expected PartialFailure, got {other:?}"),
        }
        assert!(store.contains("a.pdf"));
        assert!(!store.contains(CATALOG_KEY));
    }

    #[tokio::test]
    async fn revoke_removes_object_and_entry() {
        let (store, registrar) = registrar();
        let reg = registrar
            .register("a.pdf", None, "Abcdefg1!", "ops", Bytes::from_static(b"x"))
            .await
            .unwrap();

        let revoked = registrar.revoke(&reg.asset.asset_id).await.unwrap();
        assert_eq!(revoked.asset_id, reg.asset.asset_id);
        assert!(!store.contains("a.pdf"));

        // Second revoke: NotFound, catalog unchanged from post-first state.
        let err = registrar.revoke(&reg.asset.asset_id).await.unwrap_err();
        assert!(matches!(err, DropgateError::NotFound));
        let catalog = CatalogStore::new(store).load_strict().await.unwrap();
        assert!(catalog.assets.is_empty());
    }

    #[tokio::test]
    async fn revoke_aborts_if_object_delete_fails() {
        let (store, registrar) = registrar();
        let reg = registrar
            .register("a.pdf", None, "Abcdefg1!", "ops", Bytes::from_static(b"x"))
            .await
            .unwrap();

        store.fail_next_delete();
        let err = registrar.revoke(&reg.asset.asset_id).await.unwrap_err();
        assert!(matches!(err, DropgateError::ServiceUnavailable(_)));

        // Entry still present, object still present.
        assert!(store.contains("a.pdf"));
        let catalog = CatalogStore::new(store).load_strict().await.unwrap();
        assert!(catalog.contains(&reg.asset.asset_id));
    }

    #[tokio::test]
    async fn revoke_unknown_id_is_not_found() {
        let (_, registrar) = registrar();
        let err = registrar.revoke("nope-123").await.unwrap_err();
        assert!(matches!(err, DropgateError::NotFound));
    }

    /// The catalog has no version check: interleaved load/mutate/save cycles
    /// lose updates. This asserts the documented last-write-wins behavior,
    /// not a bug to fix.
    #[tokio::test]
    async fn lost_update_race_is_possible() {
        let store = MemStore::new();
        let catalog_store = CatalogStore::new(store.clone());

        // Both writers load the (empty) catalog before either saves.
        let mut seen_by_a = catalog_store.load_or_default().await;
        let mut seen_by_b = catalog_store.load_or_default().await;

        seen_by_a.push(test_asset("a-1"));
        catalog_store.save(&seen_by_a).await.unwrap();

        seen_by_b.push(test_asset("b-1"));
        catalog_store.save(&seen_by_b).await.unwrap();

        let survived = catalog_store.load_strict().await.unwrap();
        assert_eq!(survived.assets.len(), 1);
        assert!(survived.contains("b-1"));
        assert!(!survived.contains("a-1"));
    }

    fn test_asset(id: &str) -> crate::catalog::Asset {
        crate::catalog::Asset {
            asset_id: id.to_string(),
            file_name: format!("{id}.pdf"),
            cos_object_key: format!("{id}.pdf"),
            password: "Abcdefg1!".to_string(),
            created_at: Utc::now(),
            created_by: "ops".to_string(),
        }
    }
}
