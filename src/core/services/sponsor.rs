use super::require;
use crate::domain::model::{NewSponsor, Portfolio, Sponsor, SponsorPatch};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, PaginatedResponse};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;

/// Sponsor catalog. Deleting a sponsor detaches its portfolios.
pub struct SponsorService<S> {
    store: Arc<S>,
}

impl<S> Clone for SponsorService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> SponsorService<S>
where
    S: Repository<Sponsor> + ChildRepository<Portfolio>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn sponsors(&self) -> &dyn Repository<Sponsor> {
        self.store.as_ref()
    }

    fn portfolios(&self) -> &dyn ChildRepository<Portfolio> {
        self.store.as_ref()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PaginatedResponse<Sponsor>> {
        let page = self.sponsors().find_page(query).await?;
        Ok(PaginatedResponse::from_page(page, query))
    }

    pub async fn get(&self, id: i64) -> Result<Sponsor> {
        require(self.sponsors(), id).await
    }

    pub async fn portfolios_of(&self, id: i64) -> Result<Vec<Portfolio>> {
        self.get(id).await?;
        self.portfolios().children_of(id).await
    }

    pub async fn create(&self, input: NewSponsor) -> Result<Sponsor> {
        input.validate()?;
        self.sponsors().insert(input).await
    }

    pub async fn update(&self, id: i64, patch: SponsorPatch) -> Result<Sponsor> {
        patch.validate()?;
        self.sponsors()
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("sponsor", id))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.sponsors().delete(id).await? {
            return Err(AppError::not_found("sponsor", id));
        }
        Ok(())
    }
}
