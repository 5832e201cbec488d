use crate::auth::AuthenticatedAdmin;
use crate::state::{AdminState, GateState};

use dropgate_core::prelude::*;

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0
            .downcast_ref::<DropgateError>()
            .map(|err| match err {
                DropgateError::BadRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                // Terse constant bodies on the authorization path: the
                // status must not reveal more than the action implies.
                DropgateError::NotFound => {
                    (StatusCode::NOT_FOUND, "Asset not found".to_string())
                }
                DropgateError::Forbidden => {
                    (StatusCode::FORBIDDEN, "Invalid download token".to_string())
                }
                DropgateError::ServiceUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable".to_string(),
                ),
                DropgateError::WeakPassword(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                DropgateError::PartialFailure(_) => {
                    // Storage is now inconsistent; the message names the
                    // orphan for the operator.
                    error!("{err}");
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            })
            .unwrap_or_else(|| {
                self.0
                    .downcast_ref::<AuthError>()
                    .map(|_| (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
                    .unwrap_or_else(|| {
                        error!("Unhandled error: {:?}", self.0);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Internal Server Error: {}", self.0),
                        )
                    })
            })
            .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    pub file_name: String,
    #[serde(default)]
    pub folder: Option<String>,
    pub password: String,
}

/// POST /assets?fileName=..&folder=..&password=..
/// Accepts the raw file payload, registers it, returns the catalog entry
/// plus the shareable locator.
pub async fn upload_asset<S: ObjectStore, A: AdminAuth>(
    State(state): State<AdminState<S, A>>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let registrar = Registrar::new(state.storage.clone());
    let registration = registrar
        .register(
            &params.file_name,
            params.folder.as_deref(),
            &params.password,
            &admin.id,
            body,
        )
        .await?;

    let url = registration.locator.to_url(&state.public_base_url);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "asset": AssetSummary::from(&registration.asset),
            "locator": registration.locator,
            "downloadUrl": url,
        })),
    ))
}

/// GET /assets
/// Lists catalog entries with tokens stripped.
pub async fn list_assets<S: ObjectStore, A: AdminAuth>(
    State(state): State<AdminState<S, A>>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = CatalogStore::new(state.storage.clone())
        .load_or_default()
        .await;
    let summaries: Vec<AssetSummary> = catalog.assets.iter().map(AssetSummary::from).collect();
    Ok(Json(summaries))
}

#[derive(Deserialize)]
pub struct ListObjectsParams {
    #[serde(default)]
    pub prefix: String,
}

/// GET /objects?prefix=..
/// Raw object listing, catalog document included.
pub async fn list_objects<S: ObjectStore, A: AdminAuth>(
    State(state): State<AdminState<S, A>>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Query(params): Query<ListObjectsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .storage
        .list(&params.prefix)
        .await
        .map_err(|e| DropgateError::ServiceUnavailable(e.to_string()))?;
    Ok(Json(entries))
}

/// DELETE /assets/{assetId}
pub async fn revoke_asset<S: ObjectStore, A: AdminAuth>(
    State(state): State<AdminState<S, A>>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Path(asset_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let registrar = Registrar::new(state.storage.clone());
    registrar.revoke(&asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct DownloadParams {
    #[serde(default)]
    pub token: String,
}

/// GET /d/{assetId}?token=..
/// The public download path: resolves the locator and relays the object
/// bytes as a generic binary attachment. A store failure after streaming
/// has begun aborts the connection; the client must start over.
pub async fn download<S: ObjectStore>(
    State(state): State<GateState<S>>,
    Path(asset_id): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let gateway = TransferGateway::new(state.storage.clone());
    let transfer = gateway.resolve(&asset_id, &params.token).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&transfer.file_name)
    );
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, TRANSFER_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(transfer.stream))
        .map_err(|e| DropgateError::ServiceUnavailable(e.to_string()))?;
    Ok(response)
}

/// Keeps the suggested save name header-safe: quotes and control bytes
/// would corrupt the Content-Disposition value.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect()
}
