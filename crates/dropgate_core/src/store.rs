use crate::catalog::Catalog;
use crate::error::{DropgateError, StorageError};
use crate::traits::ObjectStore;

use bytes::Bytes;
use tracing::warn;

/// Well-known key of the catalog document, in the same bucket as the assets.
pub const CATALOG_KEY: &str = "catalog.json";

const CATALOG_CONTENT_TYPE: &str = "application/json";

/// Loads and saves the shared catalog document. Holds no cache: every
/// operation pays a full remote read, which bounds (but does not eliminate)
/// staleness between the two services.
#[derive(Clone)]
pub struct CatalogStore<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> CatalogStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Download-path loader: any fetch or parse failure is a hard
    /// `ServiceUnavailable`, distinct from "asset not found".
    pub async fn load_strict(&self) -> Result<Catalog, DropgateError> {
        let data = self
            .store
            .get(CATALOG_KEY)
            .await
            .map_err(|e| DropgateError::ServiceUnavailable(e.to_string()))?;
        serde_json::from_slice(&data)
            .map_err(|e| DropgateError::ServiceUnavailable(format!("catalog corrupt: {e}")))
    }

    /// Admin-path loader: degrades to an empty catalog on any failure so the
    /// admin surface stays usable before the document first exists. A
    /// transient fetch error here followed by a save replaces the remote
    /// document with what was loaded, so the degradation is logged loudly.
    pub async fn load_or_default(&self) -> Catalog {
        match self.store.get(CATALOG_KEY).await {
            Ok(data) => match serde_json::from_slice(&data) {
                Ok(catalog) => catalog,
                Err(e) => {
                    warn!("Catalog document is corrupt, treating as empty: {e}");
                    Catalog::default()
                }
            },
            Err(StorageError::NotFound(_)) => Catalog::default(),
            Err(e) => {
                warn!("Catalog fetch failed, treating as empty: {e}");
                Catalog::default()
            }
        }
    }

    /// Whole-document replace under the well-known key, unconditionally
    /// overwriting whatever is there. There is no version check: two
    /// concurrent load/mutate/save cycles race and the last save wins,
    /// silently discarding the other's change.
    pub async fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let data = Bytes::from(serde_json::to_vec_pretty(catalog)?);
        self.store
            .put(CATALOG_KEY, data, CATALOG_CONTENT_TYPE)
            .await
    }
}
