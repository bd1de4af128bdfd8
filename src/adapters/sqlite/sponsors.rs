use super::listing::{list_rows, select_columns, TableSpec};
use super::SqliteStore;
use crate::domain::model::{NewSponsor, Sponsor, SponsorPatch};
use crate::domain::ports::Repository;
use crate::domain::query::{ListQuery, Page, SPONSOR_SORT};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SPEC: TableSpec = TableSpec {
    catalog: &SPONSOR_SORT,
    columns: &["id", "name", "email", "created_at", "updated_at"],
    search_column: "name",
};

fn sponsor_from_row(row: &Row<'_>) -> rusqlite::Result<Sponsor> {
    Ok(Sponsor {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_sponsor(conn: &Connection, id: i64) -> Result<Option<Sponsor>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM sponsors WHERE id = ?1", select_columns(&SPEC)),
            params![id],
            sponsor_from_row,
        )
        .optional()?)
}

#[async_trait]
impl Repository<Sponsor> for SqliteStore {
    async fn insert(&self, input: NewSponsor) -> Result<Sponsor> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO sponsors(name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![input.name, input.email, now],
            )?;
            Ok(Sponsor {
                id: conn.last_insert_rowid(),
                name: input.name,
                email: input.email,
                created_at: now,
                updated_at: now,
            })
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Sponsor>> {
        self.with_conn(|conn| select_sponsor(conn, id))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Page<Sponsor>> {
        self.with_conn(|conn| list_rows(conn, &SPEC, query, None, sponsor_from_row))
    }

    async fn update(&self, id: i64, patch: SponsorPatch) -> Result<Option<Sponsor>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut sponsor) = select_sponsor(&tx, id)? else {
                return Ok(None);
            };
            patch.apply_to(&mut sponsor);
            sponsor.updated_at = Utc::now();
            tx.execute(
                "UPDATE sponsors SET name = ?1, email = ?2, updated_at = ?3 WHERE id = ?4",
                params![sponsor.name, sponsor.email, sponsor.updated_at, id],
            )?;
            tx.commit()?;
            Ok(Some(sponsor))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM sponsors WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}
