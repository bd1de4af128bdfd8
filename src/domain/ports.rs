use crate::domain::model::{DashboardSummary, Entity};
use crate::domain::query::{ListQuery, Page, Sortable};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Persistence for one entity type.
#[async_trait]
pub trait Repository<E: Entity + Sortable>: Send + Sync {
    async fn insert(&self, input: E::Create) -> Result<E>;
    async fn find_by_id(&self, id: i64) -> Result<Option<E>>;
    async fn find_page(&self, query: &ListQuery) -> Result<Page<E>>;
    /// `None` when no row has `id`.
    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>>;
    /// `false` when no row has `id`.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Loads the immediate children of a parent row, status populated.
#[async_trait]
pub trait ChildRepository<C: Entity>: Send + Sync {
    async fn children_of(&self, parent_id: i64) -> Result<Vec<C>>;
}

#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn summary(&self) -> Result<DashboardSummary>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> &str;
    fn database_path(&self) -> &str;
    fn jwt_secret(&self) -> &str;
    fn jwt_issuer(&self) -> Option<&str>;
    fn token_ttl_minutes(&self) -> i64;
    fn json_logs(&self) -> bool;
}

/// The caller identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal>;
}
