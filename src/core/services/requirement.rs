use super::require;
use crate::domain::model::{Epic, NewRequirement, Requirement, RequirementPatch};
use crate::domain::ports::Repository;
use crate::domain::query::{ListQuery, PaginatedResponse};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;

pub struct RequirementService<S> {
    store: Arc<S>,
}

impl<S> Clone for RequirementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RequirementService<S>
where
    S: Repository<Requirement> + Repository<Epic>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn requirements(&self) -> &dyn Repository<Requirement> {
        self.store.as_ref()
    }

    fn epics(&self) -> &dyn Repository<Epic> {
        self.store.as_ref()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PaginatedResponse<Requirement>> {
        let page = self.requirements().find_page(query).await?;
        Ok(PaginatedResponse::from_page(page, query))
    }

    pub async fn get(&self, id: i64) -> Result<Requirement> {
        require(self.requirements(), id).await
    }

    pub async fn create(&self, input: NewRequirement) -> Result<Requirement> {
        input.validate()?;
        require::<Epic, _>(self.epics(), input.epic_id).await?;
        let requirement = self.requirements().insert(input).await?;
        tracing::info!(id = requirement.id, epic_id = requirement.epic_id, "created requirement");
        Ok(requirement)
    }

    pub async fn update(&self, id: i64, patch: RequirementPatch) -> Result<Requirement> {
        patch.validate()?;
        if let Some(epic_id) = patch.epic_id {
            require::<Epic, _>(self.epics(), epic_id).await?;
        }
        self.requirements()
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("requirement", id))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.requirements().delete(id).await? {
            return Err(AppError::not_found("requirement", id));
        }
        Ok(())
    }
}
