//! Model catalog endpoints
//!
//! - GET /api/models
//! - GET /api/models/:id

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::AppState;
use crate::error::AppError;
use crate::kamiwaza::{Model, ModelEndpoint};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListResponse {
    pub models: Vec<Model>,
    /// Model the UI preselects; absent when the catalog is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelDetailResponse {
    #[serde(flatten)]
    pub model: Model,
    /// OpenAI-compatible endpoint when the model is deployed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<ModelEndpoint>,
}

/// GET /api/models
///
/// Reloads the catalog from Kamiwaza and returns the merged list.
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelListResponse>, AppError> {
    let catalog = state.refresh_models().await?;

    Ok(Json(ModelListResponse {
        default_model_id: catalog.valid_model_id(None).ok(),
        models: catalog.models().to_vec(),
    }))
}

/// GET /api/models/:id
///
/// Served from the last loaded catalog; loads it first if nothing has
/// been loaded yet.
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelDetailResponse>, AppError> {
    let mut model = state.models.read().await.get(&id).cloned();
    if model.is_none() && state.models.read().await.is_empty() {
        model = state.refresh_models().await?.get(&id).cloned();
    }

    let model = model.ok_or(AppError::NotFound)?;
    let endpoint = ModelEndpoint::for_model(&state.config.kamiwaza.uri, &model);

    Ok(Json(ModelDetailResponse { model, endpoint }))
}
