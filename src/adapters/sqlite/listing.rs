use crate::domain::query::{ListQuery, Page, SortCatalog, SortKey};
use crate::utils::error::Result;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Shape of one table for paginated listing.
pub(super) struct TableSpec {
    pub catalog: &'static SortCatalog,
    pub columns: &'static [&'static str],
    pub search_column: &'static str,
}

pub(super) struct ListSql {
    pub select: String,
    pub count: String,
    pub filter_params: Vec<Value>,
    pub page_params: [Value; 2],
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Builds the page and count statements. Only catalog names reach the SQL text;
/// user values are always bound.
pub(super) fn build_list_sql(
    spec: &TableSpec,
    query: &ListQuery,
    parent: Option<(&'static str, i64)>,
) -> ListSql {
    let table = spec.catalog.table;
    let mut conditions = Vec::new();
    let mut filter_params = Vec::new();

    if let Some(status) = &query.filters.status {
        conditions.push("t.status = ?".to_string());
        filter_params.push(Value::Text(status.clone()));
    }
    if let Some(search) = query.filters.search.as_deref().filter(|s| !s.is_empty()) {
        conditions.push(format!("t.{} LIKE ? ESCAPE '\\'", spec.search_column));
        filter_params.push(Value::Text(escape_like(search)));
    }
    if let Some((column, id)) = parent {
        conditions.push(format!("t.{} = ?", column));
        filter_params.push(Value::Integer(id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let direction = query.sort_order.as_sql();
    let (join, order_column) = match spec.catalog.resolve(query.sort_by.as_deref()) {
        SortKey::Own { column } => (String::new(), format!("t.{}", column)),
        SortKey::Related {
            table: related,
            foreign_key,
            column,
            ..
        } => (
            format!(" LEFT JOIN {} r ON r.id = t.{}", related, foreign_key),
            format!("r.{}", column),
        ),
    };

    let select_list = spec
        .columns
        .iter()
        .map(|c| format!("t.{}", c))
        .collect::<Vec<_>>()
        .join(", ");

    let select = format!(
        "SELECT {} FROM {} t{}{} ORDER BY {} {}, t.id {} LIMIT ? OFFSET ?",
        select_list, table, join, where_clause, order_column, direction, direction
    );
    let count = format!("SELECT COUNT(*) FROM {} t{}", table, where_clause);

    let skip = i64::try_from(query.skip()).unwrap_or(i64::MAX);
    ListSql {
        select,
        count,
        filter_params,
        page_params: [Value::Integer(i64::from(query.take())), Value::Integer(skip)],
    }
}

pub(super) fn list_rows<T>(
    conn: &Connection,
    spec: &TableSpec,
    query: &ListQuery,
    parent: Option<(&'static str, i64)>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Page<T>> {
    let sql = build_list_sql(spec, query, parent);
    tracing::debug!(table = spec.catalog.table, sql = %sql.select, "list query");

    let total: i64 = conn.query_row(&sql.count, params_from_iter(sql.filter_params.iter()), |row| {
        row.get(0)
    })?;

    let mut stmt = conn.prepare(&sql.select)?;
    let items = stmt
        .query_map(
            params_from_iter(sql.filter_params.iter().chain(sql.page_params.iter())),
            map,
        )?
        .collect::<rusqlite::Result<Vec<T>>>()?;

    Ok(Page {
        items,
        total: u64::try_from(total).unwrap_or(0),
    })
}

pub(super) fn select_columns(spec: &TableSpec) -> String {
    spec.columns.join(", ")
}
