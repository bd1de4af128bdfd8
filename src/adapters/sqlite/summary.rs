use super::SqliteStore;
use crate::domain::model::{DashboardSummary, StatusBreakdown};
use crate::domain::ports::SummaryRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use rusqlite::Connection;

const UNSET: &str = "UNSET";

fn breakdown(conn: &Connection, table: &'static str) -> Result<StatusBreakdown> {
    let mut stmt = conn.prepare(&format!(
        "SELECT status, COUNT(*) FROM {} GROUP BY status",
        table
    ))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut summary = StatusBreakdown::default();
    for (status, count) in rows {
        summary.total += count;
        *summary
            .by_status
            .entry(status.unwrap_or_else(|| UNSET.to_string()))
            .or_insert(0) += count;
    }
    Ok(summary)
}

#[async_trait]
impl SummaryRepository for SqliteStore {
    async fn summary(&self) -> Result<DashboardSummary> {
        self.with_conn(|conn| {
            Ok(DashboardSummary {
                portfolios: breakdown(conn, "portfolios")?,
                initiatives: breakdown(conn, "initiatives")?,
                epics: breakdown(conn, "epics")?,
                requirements: breakdown(conn, "requirements")?,
            })
        })
    }
}
