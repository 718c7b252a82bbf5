//! Model catalog
//!
//! Joins the Kamiwaza model list with the deployment list so the UI can tell
//! which models are actually being served.

use serde::Serialize;

use super::client::{Deployment, KamiwazaClient, KamiwazaModel};
use crate::error::AppError;

/// Deployment summary attached to a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDeployment {
    pub id: String,
    pub lb_port: u16,
}

/// Model as presented to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub label: String,
    /// `name`, or `name@version` when the catalog carries a version
    pub api_identifier: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<ModelDeployment>,
}

impl Model {
    pub fn is_deployed(&self) -> bool {
        self.deployment.is_some()
    }
}

/// Convert a catalog entry (and its deployment, if any) to a `Model`
pub fn map_model(model: &KamiwazaModel, deployment: Option<&Deployment>) -> Model {
    let api_identifier = match model.version.as_deref() {
        Some(version) if !version.is_empty() => format!("{}@{}", model.name, version),
        _ => model.name.clone(),
    };

    Model {
        id: model.id.clone(),
        label: model.name.clone(),
        api_identifier,
        description: model.description.clone().unwrap_or_default(),
        deployment: deployment.map(|d| ModelDeployment {
            id: d.id.clone(),
            lb_port: d.lb_port,
        }),
    }
}

/// Pair every model with the first deployment serving it
pub fn merge_models(models: &[KamiwazaModel], deployments: &[Deployment]) -> Vec<Model> {
    models
        .iter()
        .map(|model| {
            let deployment = deployments.iter().find(|d| d.m_id == model.id);
            map_model(model, deployment)
        })
        .collect()
}

/// Merged model list
///
/// Owned by the caller; built by [`ModelCatalog::initialize`] and replaced
/// wholesale on refresh.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

impl ModelCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    /// Fetch models and deployments together and merge them
    ///
    /// Both requests are in flight at once. If either fails, so does the
    /// whole initialization.
    pub async fn initialize(client: &KamiwazaClient) -> Result<Self, AppError> {
        let (models, deployments) =
            tokio::try_join!(client.list_models(), client.list_deployments())?;

        let merged = merge_models(&models, &deployments);
        tracing::info!(
            models = merged.len(),
            deployed = merged.iter().filter(|m| m.is_deployed()).count(),
            "Model catalog initialized"
        );

        Ok(Self::new(merged))
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == id)
    }

    /// Resolve the model to use
    ///
    /// Returns `requested` when it names a known model, otherwise the first
    /// model in the catalog.
    pub fn valid_model_id(&self, requested: Option<&str>) -> Result<String, AppError> {
        if let Some(id) = requested {
            if self.get(id).is_some() {
                return Ok(id.to_string());
            }
        }

        self.models
            .first()
            .map(|model| model.id.clone())
            .ok_or(AppError::NoModels)
    }
}
