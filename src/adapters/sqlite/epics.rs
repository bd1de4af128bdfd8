use super::listing::{list_rows, select_columns, TableSpec};
use super::SqliteStore;
use crate::domain::model::{Epic, EpicPatch, NewEpic};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, Page, EPIC_SORT};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SPEC: TableSpec = TableSpec {
    catalog: &EPIC_SORT,
    columns: &[
        "id",
        "name",
        "description",
        "status",
        "initiative_id",
        "created_at",
        "updated_at",
    ],
    search_column: "name",
};

fn epic_from_row(row: &Row<'_>) -> rusqlite::Result<Epic> {
    Ok(Epic {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: row.get("status")?,
        initiative_id: row.get("initiative_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_epic(conn: &Connection, id: i64) -> Result<Option<Epic>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM epics WHERE id = ?1", select_columns(&SPEC)),
            params![id],
            epic_from_row,
        )
        .optional()?)
}

#[async_trait]
impl Repository<Epic> for SqliteStore {
    async fn insert(&self, input: NewEpic) -> Result<Epic> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                r#"
                INSERT INTO epics(name, description, status, initiative_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                "#,
                params![input.name, input.description, input.status, input.initiative_id, now],
            )?;
            Ok(Epic {
                id: conn.last_insert_rowid(),
                name: input.name,
                description: input.description,
                status: input.status,
                initiative_id: input.initiative_id,
                created_at: now,
                updated_at: now,
            })
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Epic>> {
        self.with_conn(|conn| select_epic(conn, id))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Page<Epic>> {
        self.with_conn(|conn| {
            let parent = query.filters.initiative_id.map(|id| ("initiative_id", id));
            list_rows(conn, &SPEC, query, parent, epic_from_row)
        })
    }

    async fn update(&self, id: i64, patch: EpicPatch) -> Result<Option<Epic>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut epic) = select_epic(&tx, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut epic);
            epic.updated_at = Utc::now();
            tx.execute(
                r#"
                UPDATE epics
                SET name = ?1, description = ?2, status = ?3, initiative_id = ?4, updated_at = ?5
                WHERE id = ?6
                "#,
                params![
                    epic.name,
                    epic.description,
                    epic.status,
                    epic.initiative_id,
                    epic.updated_at,
                    id
                ],
            )?;
            tx.commit()?;
            Ok(Some(epic))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM epics WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}

#[async_trait]
impl ChildRepository<Epic> for SqliteStore {
    async fn children_of(&self, initiative_id: i64) -> Result<Vec<Epic>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM epics WHERE initiative_id = ?1 ORDER BY id",
                select_columns(&SPEC)
            ))?;
            let rows = stmt
                .query_map(params![initiative_id], epic_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
