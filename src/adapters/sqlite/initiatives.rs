use super::listing::{list_rows, select_columns, TableSpec};
use super::SqliteStore;
use crate::domain::model::{Initiative, InitiativePatch, NewInitiative};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, Page, INITIATIVE_SORT};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SPEC: TableSpec = TableSpec {
    catalog: &INITIATIVE_SORT,
    columns: &[
        "id",
        "title",
        "description",
        "status",
        "portfolio_id",
        "start_date",
        "end_date",
        "created_at",
        "updated_at",
    ],
    search_column: "title",
};

fn initiative_from_row(row: &Row<'_>) -> rusqlite::Result<Initiative> {
    Ok(Initiative {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        portfolio_id: row.get("portfolio_id")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_initiative(conn: &Connection, id: i64) -> Result<Option<Initiative>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM initiatives WHERE id = ?1",
                select_columns(&SPEC)
            ),
            params![id],
            initiative_from_row,
        )
        .optional()?)
}

#[async_trait]
impl Repository<Initiative> for SqliteStore {
    async fn insert(&self, input: NewInitiative) -> Result<Initiative> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                r#"
                INSERT INTO initiatives(title, description, status, portfolio_id, start_date, end_date, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                "#,
                params![
                    input.title,
                    input.description,
                    input.status,
                    input.portfolio_id,
                    input.start_date,
                    input.end_date,
                    now
                ],
            )?;
            let id = conn.last_insert_rowid();
            tracing::debug!(id, portfolio_id = input.portfolio_id, "inserted initiative");
            Ok(Initiative {
                id,
                title: input.title,
                description: input.description,
                status: input.status,
                portfolio_id: input.portfolio_id,
                start_date: input.start_date,
                end_date: input.end_date,
                created_at: now,
                updated_at: now,
            })
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Initiative>> {
        self.with_conn(|conn| select_initiative(conn, id))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Page<Initiative>> {
        self.with_conn(|conn| {
            let parent = query.filters.portfolio_id.map(|id| ("portfolio_id", id));
            list_rows(conn, &SPEC, query, parent, initiative_from_row)
        })
    }

    async fn update(&self, id: i64, patch: InitiativePatch) -> Result<Option<Initiative>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut initiative) = select_initiative(&tx, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut initiative);
            initiative.updated_at = Utc::now();
            tx.execute(
                r#"
                UPDATE initiatives
                SET title = ?1, description = ?2, status = ?3, portfolio_id = ?4,
                    start_date = ?5, end_date = ?6, updated_at = ?7
                WHERE id = ?8
                "#,
                params![
                    initiative.title,
                    initiative.description,
                    initiative.status,
                    initiative.portfolio_id,
                    initiative.start_date,
                    initiative.end_date,
                    initiative.updated_at,
                    id
                ],
            )?;
            tx.commit()?;
            Ok(Some(initiative))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM initiatives WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}

#[async_trait]
impl ChildRepository<Initiative> for SqliteStore {
    async fn children_of(&self, portfolio_id: i64) -> Result<Vec<Initiative>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM initiatives WHERE portfolio_id = ?1 ORDER BY id",
                select_columns(&SPEC)
            ))?;
            let rows = stmt
                .query_map(params![portfolio_id], initiative_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
