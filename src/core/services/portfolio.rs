use super::{enforce, require};
use crate::domain::guard::{requires_guard, GuardedAction};
use crate::domain::model::{Initiative, NewPortfolio, Portfolio, PortfolioPatch, Sponsor};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, PaginatedResponse};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;

pub struct PortfolioService<S> {
    store: Arc<S>,
}

impl<S> Clone for PortfolioService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> PortfolioService<S>
where
    S: Repository<Portfolio> + Repository<Sponsor> + ChildRepository<Initiative>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn portfolios(&self) -> &dyn Repository<Portfolio> {
        self.store.as_ref()
    }

    fn sponsors(&self) -> &dyn Repository<Sponsor> {
        self.store.as_ref()
    }

    fn initiatives(&self) -> &dyn ChildRepository<Initiative> {
        self.store.as_ref()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PaginatedResponse<Portfolio>> {
        let page = self.portfolios().find_page(query).await?;
        Ok(PaginatedResponse::from_page(page, query))
    }

    pub async fn get(&self, id: i64) -> Result<Portfolio> {
        require(self.portfolios(), id).await
    }

    /// Initiatives owned by the portfolio.
    pub async fn initiatives_of(&self, id: i64) -> Result<Vec<Initiative>> {
        self.get(id).await?;
        self.initiatives().children_of(id).await
    }

    pub async fn create(&self, input: NewPortfolio) -> Result<Portfolio> {
        input.validate()?;
        if let Some(sponsor_id) = input.sponsor_id {
            require::<Sponsor, _>(self.sponsors(), sponsor_id).await?;
        }
        let portfolio = self.portfolios().insert(input).await?;
        tracing::info!(id = portfolio.id, "created portfolio '{}'", portfolio.name);
        Ok(portfolio)
    }

    pub async fn update(&self, id: i64, patch: PortfolioPatch) -> Result<Portfolio> {
        patch.validate()?;
        let portfolio = self.get(id).await?;

        if let Some(Some(sponsor_id)) = patch.sponsor_id {
            require::<Sponsor, _>(self.sponsors(), sponsor_id).await?;
        }

        if requires_guard(patch.target_status()) {
            let initiatives = self.initiatives().children_of(id).await?;
            enforce(&portfolio, GuardedAction::Deactivate, &initiatives)?;
        }

        self.portfolios()
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("portfolio", id))
    }

    /// Deletes the portfolio and, through the schema, its initiatives.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let portfolio = self.get(id).await?;
        let initiatives = self.initiatives().children_of(id).await?;
        enforce(&portfolio, GuardedAction::Delete, &initiatives)?;

        if !self.portfolios().delete(id).await? {
            return Err(AppError::not_found("portfolio", id));
        }
        tracing::info!(id, "deleted portfolio '{}'", portfolio.name);
        Ok(())
    }
}
