//! Hierarchy consistency guard.
//!
//! Decides whether a parent in the Portfolio → Initiative → Epic chain may be
//! deleted or set to `INACTIVE`, given the materialized list of its immediate
//! children. Only direct children are inspected. The caller loads them and
//! decides which trigger applies; the guard performs no I/O.

use crate::domain::model::{Epic, HasStatus, Initiative, Portfolio};
use crate::utils::error::{AppError, Result};

pub const ACTIVE: &str = "ACTIVE";
pub const INACTIVE: &str = "INACTIVE";

/// A hierarchy level whose lifecycle depends on its children.
pub trait HierarchyParent {
    type Child: HasStatus;

    /// Singular noun for the parent ("portfolio").
    const ENTITY: &'static str;
    /// Plural noun for the children ("initiatives").
    const CHILDREN: &'static str;
}

impl HierarchyParent for Portfolio {
    type Child = Initiative;
    const ENTITY: &'static str = "portfolio";
    const CHILDREN: &'static str = "initiatives";
}

impl HierarchyParent for Initiative {
    type Child = Epic;
    const ENTITY: &'static str = "initiative";
    const CHILDREN: &'static str = "epics";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Delete,
    Deactivate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Blocked(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Blocked(message) => Err(AppError::business_rule(message)),
        }
    }
}

/// Whether a status patch triggers the guard. Only an exact `INACTIVE` target does.
pub fn requires_guard(target_status: Option<&str>) -> bool {
    target_status == Some(INACTIVE)
}

fn is_active<C: HasStatus>(child: &C) -> bool {
    child.status() == Some(ACTIVE)
}

/// Blocks when at least one child has status exactly `ACTIVE`.
///
/// The parent's own status plays no part in the decision.
pub fn can_deactivate_or_delete<P: HierarchyParent>(
    _parent: &P,
    action: GuardedAction,
    children: &[P::Child],
) -> Decision {
    if !children.iter().any(is_active) {
        return Decision::Allowed;
    }

    let message = match action {
        GuardedAction::Delete => format!(
            "Cannot delete {} because it has {} {}",
            P::ENTITY,
            ACTIVE,
            P::CHILDREN
        ),
        GuardedAction::Deactivate => format!(
            "Cannot set {} to {} because it has {} {}",
            P::ENTITY,
            INACTIVE,
            ACTIVE,
            P::CHILDREN
        ),
    };
    Decision::Blocked(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn portfolio(status: Option<&str>) -> Portfolio {
        Portfolio {
            id: 1,
            name: "Growth".to_string(),
            description: None,
            status: status.map(str::to_string),
            sponsor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn initiative(id: i64, status: Option<&str>) -> Initiative {
        Initiative {
            id,
            title: format!("Initiative {}", id),
            description: None,
            status: status.map(str::to_string),
            portfolio_id: 1,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn epic(id: i64, status: Option<&str>) -> Epic {
        Epic {
            id,
            name: format!("Epic {}", id),
            description: None,
            status: status.map(str::to_string),
            initiative_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_children_always_allowed() {
        let parent = portfolio(Some(ACTIVE));
        for action in [GuardedAction::Delete, GuardedAction::Deactivate] {
            assert_eq!(
                can_deactivate_or_delete(&parent, action, &[]),
                Decision::Allowed
            );
        }
    }

    #[test]
    fn test_no_active_child_is_allowed() {
        let children = vec![
            initiative(1, Some(INACTIVE)),
            initiative(2, Some("DRAFT")),
            initiative(3, None),
        ];
        let decision =
            can_deactivate_or_delete(&portfolio(None), GuardedAction::Delete, &children);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_single_active_child_blocks() {
        let children = vec![
            initiative(1, Some(INACTIVE)),
            initiative(2, Some(INACTIVE)),
            initiative(3, Some(ACTIVE)),
        ];
        let decision =
            can_deactivate_or_delete(&portfolio(None), GuardedAction::Delete, &children);
        assert_eq!(
            decision,
            Decision::Blocked(
                "Cannot delete portfolio because it has ACTIVE initiatives".to_string()
            )
        );
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let children = vec![initiative(1, Some("active")), initiative(2, Some("Active "))];
        let decision =
            can_deactivate_or_delete(&portfolio(None), GuardedAction::Deactivate, &children);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_parent_status_is_irrelevant() {
        let children = vec![initiative(1, Some(ACTIVE))];
        for status in [None, Some(ACTIVE), Some(INACTIVE)] {
            let decision = can_deactivate_or_delete(
                &portfolio(status),
                GuardedAction::Deactivate,
                &children,
            );
            assert!(!decision.is_allowed());
        }
    }

    #[test]
    fn test_deactivate_message_names_initiative_and_epics() {
        let parent = initiative(9, Some(ACTIVE));
        let decision = can_deactivate_or_delete(
            &parent,
            GuardedAction::Deactivate,
            &[epic(1, Some(ACTIVE))],
        );
        let err = decision.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot set initiative to INACTIVE because it has ACTIVE epics"
        );
    }

    #[test]
    fn test_requires_guard_only_for_exact_inactive() {
        assert!(requires_guard(Some("INACTIVE")));
        assert!(!requires_guard(Some("inactive")));
        assert!(!requires_guard(Some("ARCHIVED")));
        assert!(!requires_guard(None));
    }
}
