use super::require;
use crate::domain::model::{Epic, EpicPatch, Initiative, NewEpic, Requirement};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, PaginatedResponse};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;

/// Epics are not guarded: the lifecycle check stops at initiative level.
pub struct EpicService<S> {
    store: Arc<S>,
}

impl<S> Clone for EpicService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> EpicService<S>
where
    S: Repository<Epic> + Repository<Initiative> + ChildRepository<Requirement>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn epics(&self) -> &dyn Repository<Epic> {
        self.store.as_ref()
    }

    fn initiatives(&self) -> &dyn Repository<Initiative> {
        self.store.as_ref()
    }

    fn requirements(&self) -> &dyn ChildRepository<Requirement> {
        self.store.as_ref()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PaginatedResponse<Epic>> {
        let page = self.epics().find_page(query).await?;
        Ok(PaginatedResponse::from_page(page, query))
    }

    pub async fn get(&self, id: i64) -> Result<Epic> {
        require(self.epics(), id).await
    }

    pub async fn requirements_of(&self, id: i64) -> Result<Vec<Requirement>> {
        self.get(id).await?;
        self.requirements().children_of(id).await
    }

    pub async fn create(&self, input: NewEpic) -> Result<Epic> {
        input.validate()?;
        require::<Initiative, _>(self.initiatives(), input.initiative_id).await?;
        let epic = self.epics().insert(input).await?;
        tracing::info!(
            id = epic.id,
            initiative_id = epic.initiative_id,
            "created epic '{}'",
            epic.name
        );
        Ok(epic)
    }

    pub async fn update(&self, id: i64, patch: EpicPatch) -> Result<Epic> {
        patch.validate()?;
        if let Some(initiative_id) = patch.initiative_id {
            require::<Initiative, _>(self.initiatives(), initiative_id).await?;
        }
        self.epics()
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("epic", id))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.epics().delete(id).await? {
            return Err(AppError::not_found("epic", id));
        }
        tracing::info!(id, "deleted epic");
        Ok(())
    }
}
