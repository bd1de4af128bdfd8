//! CRUD services, one per entity.
//!
//! Services own the lifecycle rules: they load the immediate children, ask the
//! hierarchy guard before destructive operations, and check that referenced
//! parents exist. Everything else is delegated to the repositories.

pub mod dashboard;
pub mod epic;
pub mod initiative;
pub mod portfolio;
pub mod requirement;
pub mod sponsor;

use crate::domain::guard::{can_deactivate_or_delete, Decision, GuardedAction, HierarchyParent};
use crate::domain::model::Entity;
use crate::domain::ports::Repository;
use crate::domain::query::Sortable;
use crate::utils::error::{AppError, Result};

pub use dashboard::DashboardService;
pub use epic::EpicService;
pub use initiative::InitiativeService;
pub use portfolio::PortfolioService;
pub use requirement::RequirementService;
pub use sponsor::SponsorService;

/// Loads `id` or fails with a not-found error naming the entity.
pub(crate) async fn require<E, R>(repo: &R, id: i64) -> Result<E>
where
    E: Entity + Sortable,
    R: Repository<E> + ?Sized,
{
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(E::NAME, id))
}

/// Runs the guard and logs when it blocks.
pub(crate) fn enforce<P>(parent: &P, action: GuardedAction, children: &[P::Child]) -> Result<()>
where
    P: HierarchyParent + Entity,
{
    let decision = can_deactivate_or_delete(parent, action, children);
    if let Decision::Blocked(reason) = &decision {
        tracing::warn!(
            entity = P::ENTITY,
            id = parent.id(),
            action = ?action,
            "⛔ {}",
            reason
        );
    }
    decision.into_result()
}
