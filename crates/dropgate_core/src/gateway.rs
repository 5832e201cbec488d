use crate::error::DropgateError;
use crate::store::CatalogStore;
use crate::traits::{ObjectByteStream, ObjectStore};

use futures::TryStreamExt;
use subtle::ConstantTimeEq;
use tracing::{error, event};

/// Content type declared on every transfer. All assets are served as a
/// generic binary attachment regardless of what was uploaded.
pub const TRANSFER_CONTENT_TYPE: &str = "application/octet-stream";

/// Tracing target for authorization audit events. Every resolution attempt
/// is recorded here with the asset id and outcome, never the token value.
pub const AUDIT_TARGET: &str = "dropgate::audit";

/// An authorized transfer, ready to relay: the byte stream plus the name the
/// downloader's client should save it under.
pub struct Transfer {
    pub file_name: String,
    pub stream: ObjectByteStream,
}

impl std::fmt::Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transfer")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Public-side read path: resolves a download locator against the shared
/// catalog and opens the underlying object for streaming.
#[derive(Clone)]
pub struct TransferGateway<S: ObjectStore> {
    store: S,
    catalog: CatalogStore<S>,
}

fn token_matches(presented: &str, stored: &str) -> bool {
    // Constant-time compare; only the length can leak.
    presented.as_bytes().ct_eq(stored.as_bytes()).into()
}

impl<S: ObjectStore> TransferGateway<S> {
    pub fn new(store: S) -> Self {
        let catalog = CatalogStore::new(store.clone());
        Self { store, catalog }
    }

    /// Resolves an asset id and presented token into a byte stream.
    ///
    /// An unreachable or corrupt catalog is `ServiceUnavailable`, distinct
    /// from `NotFound`. Once the stream is handed back, a mid-transfer store
    /// failure surfaces as an error item in the stream; the attempt cannot
    /// be resumed and a new one starts from scratch.
    pub async fn resolve(&self, asset_id: &str, token: &str) -> Result<Transfer, DropgateError> {
        if asset_id.is_empty() {
            return Err(DropgateError::BadRequest("assetId"));
        }
        if token.is_empty() {
            return Err(DropgateError::BadRequest("token"));
        }

        let catalog = self.catalog.load_strict().await?;

        let Some(asset) = catalog.find(asset_id) else {
            event!(target: "dropgate::audit", tracing::Level::WARN, asset_id, outcome = "not_found");
            return Err(DropgateError::NotFound);
        };

        if !token_matches(token, &asset.password) {
            event!(target: "dropgate::audit", tracing::Level::WARN, asset_id, outcome = "denied");
            return Err(DropgateError::Forbidden);
        }

        let stream = match self.store.get_stream(&asset.cos_object_key).await {
            Ok(stream) => stream,
            Err(e) => {
                // Catalog entry points at an object we cannot open; dangling
                // entries are possible because nothing enforces existence.
                error!(
                    asset_id,
                    key = %asset.cos_object_key,
                    "Object unavailable for cataloged asset: {e}"
                );
                return Err(DropgateError::ServiceUnavailable(
                    "object unavailable".to_string(),
                ));
            }
        };

        event!(target: "dropgate::audit", tracing::Level::INFO, asset_id, outcome = "granted");

        // An error after delivery starts aborts the transfer; make sure it
        // lands in the log before the connection drops.
        let id = asset_id.to_string();
        let stream: ObjectByteStream = Box::pin(stream.inspect_err(move |e| {
            error!(asset_id = %id, "Transfer aborted mid-stream: {e}");
        }));

        Ok(Transfer {
            file_name: asset.file_name.clone(),
            stream,
        })
    }
}
