use super::listing::{list_rows, select_columns, TableSpec};
use super::SqliteStore;
use crate::domain::model::{NewRequirement, Requirement, RequirementPatch};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, Page, REQUIREMENT_SORT};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SPEC: TableSpec = TableSpec {
    catalog: &REQUIREMENT_SORT,
    columns: &[
        "id",
        "title",
        "description",
        "status",
        "priority",
        "epic_id",
        "created_at",
        "updated_at",
    ],
    search_column: "title",
};

fn requirement_from_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        priority: row.get("priority")?,
        epic_id: row.get("epic_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_requirement(conn: &Connection, id: i64) -> Result<Option<Requirement>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM requirements WHERE id = ?1",
                select_columns(&SPEC)
            ),
            params![id],
            requirement_from_row,
        )
        .optional()?)
}

#[async_trait]
impl Repository<Requirement> for SqliteStore {
    async fn insert(&self, input: NewRequirement) -> Result<Requirement> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                r#"
                INSERT INTO requirements(title, description, status, priority, epic_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                "#,
                params![
                    input.title,
                    input.description,
                    input.status,
                    input.priority,
                    input.epic_id,
                    now
                ],
            )?;
            Ok(Requirement {
                id: conn.last_insert_rowid(),
                title: input.title,
                description: input.description,
                status: input.status,
                priority: input.priority,
                epic_id: input.epic_id,
                created_at: now,
                updated_at: now,
            })
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Requirement>> {
        self.with_conn(|conn| select_requirement(conn, id))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Page<Requirement>> {
        self.with_conn(|conn| {
            let parent = query.filters.epic_id.map(|id| ("epic_id", id));
            list_rows(conn, &SPEC, query, parent, requirement_from_row)
        })
    }

    async fn update(&self, id: i64, patch: RequirementPatch) -> Result<Option<Requirement>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut requirement) = select_requirement(&tx, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut requirement);
            requirement.updated_at = Utc::now();
            tx.execute(
                r#"
                UPDATE requirements
                SET title = ?1, description = ?2, status = ?3, priority = ?4, epic_id = ?5, updated_at = ?6
                WHERE id = ?7
                "#,
                params![
                    requirement.title,
                    requirement.description,
                    requirement.status,
                    requirement.priority,
                    requirement.epic_id,
                    requirement.updated_at,
                    id
                ],
            )?;
            tx.commit()?;
            Ok(Some(requirement))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM requirements WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}

#[async_trait]
impl ChildRepository<Requirement> for SqliteStore {
    async fn children_of(&self, epic_id: i64) -> Result<Vec<Requirement>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM requirements WHERE epic_id = ?1 ORDER BY id",
                select_columns(&SPEC)
            ))?;
            let rows = stmt
                .query_map(params![epic_id], requirement_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
