use super::{enforce, require};
use crate::domain::guard::{requires_guard, GuardedAction};
use crate::domain::model::{Epic, Initiative, InitiativePatch, NewInitiative, Portfolio};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, PaginatedResponse};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;

pub struct InitiativeService<S> {
    store: Arc<S>,
}

impl<S> Clone for InitiativeService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> InitiativeService<S>
where
    S: Repository<Initiative> + Repository<Portfolio> + ChildRepository<Epic>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn initiatives(&self) -> &dyn Repository<Initiative> {
        self.store.as_ref()
    }

    fn portfolios(&self) -> &dyn Repository<Portfolio> {
        self.store.as_ref()
    }

    fn epics(&self) -> &dyn ChildRepository<Epic> {
        self.store.as_ref()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PaginatedResponse<Initiative>> {
        let page = self.initiatives().find_page(query).await?;
        Ok(PaginatedResponse::from_page(page, query))
    }

    pub async fn get(&self, id: i64) -> Result<Initiative> {
        require(self.initiatives(), id).await
    }

    pub async fn epics_of(&self, id: i64) -> Result<Vec<Epic>> {
        self.get(id).await?;
        self.epics().children_of(id).await
    }

    pub async fn create(&self, input: NewInitiative) -> Result<Initiative> {
        input.validate()?;
        require::<Portfolio, _>(self.portfolios(), input.portfolio_id).await?;
        let initiative = self.initiatives().insert(input).await?;
        tracing::info!(
            id = initiative.id,
            portfolio_id = initiative.portfolio_id,
            "created initiative '{}'",
            initiative.title
        );
        Ok(initiative)
    }

    pub async fn update(&self, id: i64, patch: InitiativePatch) -> Result<Initiative> {
        let initiative = self.get(id).await?;
        patch.validate_against(&initiative)?;

        if let Some(portfolio_id) = patch.portfolio_id {
            require::<Portfolio, _>(self.portfolios(), portfolio_id).await?;
        }

        // 只有目標狀態為 INACTIVE 才需要檢查子項
        if requires_guard(patch.target_status()) {
            let epics = self.epics().children_of(id).await?;
            enforce(&initiative, GuardedAction::Deactivate, &epics)?;
        }

        self.initiatives()
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("initiative", id))
    }

    /// Deletes the initiative and, through the schema, its epics.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let initiative = self.get(id).await?;
        let epics = self.epics().children_of(id).await?;
        enforce(&initiative, GuardedAction::Delete, &epics)?;

        if !self.initiatives().delete(id).await? {
            return Err(AppError::not_found("initiative", id));
        }
        tracing::info!(id, "deleted initiative '{}'", initiative.title);
        Ok(())
    }
}
