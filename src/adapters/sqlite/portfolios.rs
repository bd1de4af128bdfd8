use super::listing::{list_rows, select_columns, TableSpec};
use super::SqliteStore;
use crate::domain::model::{NewPortfolio, Portfolio, PortfolioPatch};
use crate::domain::ports::{ChildRepository, Repository};
use crate::domain::query::{ListQuery, Page, PORTFOLIO_SORT};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SPEC: TableSpec = TableSpec {
    catalog: &PORTFOLIO_SORT,
    columns: &[
        "id",
        "name",
        "description",
        "status",
        "sponsor_id",
        "created_at",
        "updated_at",
    ],
    search_column: "name",
};

fn portfolio_from_row(row: &Row<'_>) -> rusqlite::Result<Portfolio> {
    Ok(Portfolio {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: row.get("status")?,
        sponsor_id: row.get("sponsor_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_portfolio(conn: &Connection, id: i64) -> Result<Option<Portfolio>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM portfolios WHERE id = ?1",
                select_columns(&SPEC)
            ),
            params![id],
            portfolio_from_row,
        )
        .optional()?)
}

#[async_trait]
impl Repository<Portfolio> for SqliteStore {
    async fn insert(&self, input: NewPortfolio) -> Result<Portfolio> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                r#"
                INSERT INTO portfolios(name, description, status, sponsor_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                "#,
                params![input.name, input.description, input.status, input.sponsor_id, now],
            )?;
            let id = conn.last_insert_rowid();
            tracing::debug!(id, "inserted portfolio");
            Ok(Portfolio {
                id,
                name: input.name,
                description: input.description,
                status: input.status,
                sponsor_id: input.sponsor_id,
                created_at: now,
                updated_at: now,
            })
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Portfolio>> {
        self.with_conn(|conn| select_portfolio(conn, id))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Page<Portfolio>> {
        self.with_conn(|conn| {
            let parent = query.filters.sponsor_id.map(|id| ("sponsor_id", id));
            list_rows(conn, &SPEC, query, parent, portfolio_from_row)
        })
    }

    async fn update(&self, id: i64, patch: PortfolioPatch) -> Result<Option<Portfolio>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut portfolio) = select_portfolio(&tx, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut portfolio);
            portfolio.updated_at = Utc::now();
            tx.execute(
                r#"
                UPDATE portfolios
                SET name = ?1, description = ?2, status = ?3, sponsor_id = ?4, updated_at = ?5
                WHERE id = ?6
                "#,
                params![
                    portfolio.name,
                    portfolio.description,
                    portfolio.status,
                    portfolio.sponsor_id,
                    portfolio.updated_at,
                    id
                ],
            )?;
            tx.commit()?;
            Ok(Some(portfolio))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM portfolios WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}

#[async_trait]
impl ChildRepository<Portfolio> for SqliteStore {
    /// Portfolios sponsored by a sponsor.
    async fn children_of(&self, sponsor_id: i64) -> Result<Vec<Portfolio>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM portfolios WHERE sponsor_id = ?1 ORDER BY id",
                select_columns(&SPEC)
            ))?;
            let rows = stmt
                .query_map(params![sponsor_id], portfolio_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
