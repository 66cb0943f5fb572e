//! Remote services the administration screens call into
//!
//! The screens only see these traits; `http` provides the REST binding used
//! by the application.

pub mod http;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::models::{Country, Entity};

pub use http::{ApiClient, HttpCountryService, HttpEntityService};

/// Collection service for one entity type
#[async_trait]
pub trait EntityService<E: Entity>: Send + Sync {
    /// Fetch the full collection
    async fn fetch_all(&self) -> Result<Vec<E>, ApiError>;

    /// Create an entity and return the persisted record
    async fn create(&self, payload: &E::Payload) -> Result<E, ApiError>;

    /// Replace an entity and return the persisted record
    async fn update(&self, id: &str, payload: &E::Payload) -> Result<E, ApiError>;

    /// Delete a batch of entities
    async fn delete(&self, ids: &[String]) -> Result<(), ApiError>;
}

#[async_trait]
pub trait CountryService: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Country>, ApiError>;

    async fn create(&self, name: &str, code: &str) -> Result<Country, ApiError>;
}
