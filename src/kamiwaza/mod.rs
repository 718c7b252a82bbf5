//! Kamiwaza integration
//!
//! Handles:
//! - Identity (token issuance, current user)
//! - Model and deployment catalog
//! - OpenAI-compatible endpoints for deployed models

mod client;
mod models;
mod provider;

pub use client::{
    Deployment, KamiwazaClient, KamiwazaModel, KamiwazaUser, TokenResponse, Verification,
};
pub use models::{Model, ModelCatalog, ModelDeployment, map_model, merge_models};
pub use provider::{ModelEndpoint, provider_base_url};
