//! Paging, sorting and filtering shared by every list endpoint.
//!
//! Inputs arrive already validated (see `adapters::http::params`); this module
//! only derives offsets, resolves sort fields against a per-resource catalog and
//! shapes the response envelopes.

use serde::{Deserialize, Serialize};

use crate::domain::model::{Epic, Initiative, Portfolio, Requirement, Sponsor};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive `ASC` / `DESC`.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sponsor_id: Option<i64>,
    pub portfolio_id: Option<i64>,
    pub initiative_id: Option<i64>,
    pub epic_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub filters: ListFilters,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: None,
            sort_order: SortOrder::default(),
            filters: ListFilters::default(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = sort_order;
        self
    }

    pub fn filtered(mut self, filters: ListFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn take(&self) -> u32 {
        self.limit
    }
}

/// A public sort field and the column it maps to.
#[derive(Debug, Clone, Copy)]
pub struct SortColumn {
    pub field: &'static str,
    pub column: &'static str,
}

/// A to-one relation the list can be ordered by.
#[derive(Debug)]
pub struct SortRelation {
    pub alias: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub default_column: &'static str,
    pub columns: &'static [SortColumn],
}

#[derive(Debug)]
pub struct SortCatalog {
    pub table: &'static str,
    pub natural: &'static str,
    pub columns: &'static [SortColumn],
    pub relations: &'static [SortRelation],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Own {
        column: &'static str,
    },
    Related {
        relation: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        column: &'static str,
    },
}

fn find_column(columns: &'static [SortColumn], name: &str) -> Option<&'static str> {
    columns
        .iter()
        .find(|c| c.field == name || c.column == name)
        .map(|c| c.column)
}

impl SortCatalog {
    /// Resolves `sortBy` to a column; unknown names fall back to the natural order.
    pub fn resolve(&self, sort_by: Option<&str>) -> SortKey {
        let natural = SortKey::Own {
            column: self.natural,
        };
        let Some(name) = sort_by.map(str::trim).filter(|s| !s.is_empty()) else {
            return natural;
        };

        let (head, tail) = match name.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (name, None),
        };

        if let Some(relation) = self.relations.iter().find(|r| r.alias == head) {
            let column = match tail {
                None => Some(relation.default_column),
                Some(field) => find_column(relation.columns, field),
            };
            return match column {
                Some(column) => SortKey::Related {
                    relation: relation.alias,
                    table: relation.table,
                    foreign_key: relation.foreign_key,
                    column,
                },
                None => natural,
            };
        }

        if tail.is_some() {
            return natural;
        }

        match find_column(self.columns, name) {
            Some(column) => SortKey::Own { column },
            None => natural,
        }
    }
}

/// Types listed through the query contract.
pub trait Sortable {
    const SORT: &'static SortCatalog;
}

const TIMESTAMPS: [SortColumn; 2] = [
    SortColumn {
        field: "createdAt",
        column: "created_at",
    },
    SortColumn {
        field: "updatedAt",
        column: "updated_at",
    },
];

const SPONSOR_COLUMNS: [SortColumn; 5] = [
    SortColumn {
        field: "id",
        column: "id",
    },
    SortColumn {
        field: "name",
        column: "name",
    },
    SortColumn {
        field: "email",
        column: "email",
    },
    TIMESTAMPS[0],
    TIMESTAMPS[1],
];

const PORTFOLIO_COLUMNS: [SortColumn; 5] = [
    SortColumn {
        field: "id",
        column: "id",
    },
    SortColumn {
        field: "name",
        column: "name",
    },
    SortColumn {
        field: "status",
        column: "status",
    },
    TIMESTAMPS[0],
    TIMESTAMPS[1],
];

const INITIATIVE_COLUMNS: [SortColumn; 7] = [
    SortColumn {
        field: "id",
        column: "id",
    },
    SortColumn {
        field: "title",
        column: "title",
    },
    SortColumn {
        field: "status",
        column: "status",
    },
    SortColumn {
        field: "startDate",
        column: "start_date",
    },
    SortColumn {
        field: "endDate",
        column: "end_date",
    },
    TIMESTAMPS[0],
    TIMESTAMPS[1],
];

const EPIC_COLUMNS: [SortColumn; 5] = [
    SortColumn {
        field: "id",
        column: "id",
    },
    SortColumn {
        field: "name",
        column: "name",
    },
    SortColumn {
        field: "status",
        column: "status",
    },
    TIMESTAMPS[0],
    TIMESTAMPS[1],
];

const REQUIREMENT_COLUMNS: [SortColumn; 6] = [
    SortColumn {
        field: "id",
        column: "id",
    },
    SortColumn {
        field: "title",
        column: "title",
    },
    SortColumn {
        field: "status",
        column: "status",
    },
    SortColumn {
        field: "priority",
        column: "priority",
    },
    TIMESTAMPS[0],
    TIMESTAMPS[1],
];

pub const SPONSOR_SORT: SortCatalog = SortCatalog {
    table: "sponsors",
    natural: "created_at",
    columns: &SPONSOR_COLUMNS,
    relations: &[],
};

pub const PORTFOLIO_SORT: SortCatalog = SortCatalog {
    table: "portfolios",
    natural: "created_at",
    columns: &PORTFOLIO_COLUMNS,
    relations: &[SortRelation {
        alias: "sponsor",
        table: "sponsors",
        foreign_key: "sponsor_id",
        default_column: "name",
        columns: &SPONSOR_COLUMNS,
    }],
};

pub const INITIATIVE_SORT: SortCatalog = SortCatalog {
    table: "initiatives",
    natural: "created_at",
    columns: &INITIATIVE_COLUMNS,
    relations: &[SortRelation {
        alias: "portfolio",
        table: "portfolios",
        foreign_key: "portfolio_id",
        default_column: "name",
        columns: &PORTFOLIO_COLUMNS,
    }],
};

pub const EPIC_SORT: SortCatalog = SortCatalog {
    table: "epics",
    natural: "created_at",
    columns: &EPIC_COLUMNS,
    relations: &[SortRelation {
        alias: "initiative",
        table: "initiatives",
        foreign_key: "initiative_id",
        default_column: "title",
        columns: &INITIATIVE_COLUMNS,
    }],
};

pub const REQUIREMENT_SORT: SortCatalog = SortCatalog {
    table: "requirements",
    natural: "created_at",
    columns: &REQUIREMENT_COLUMNS,
    relations: &[SortRelation {
        alias: "epic",
        table: "epics",
        foreign_key: "epic_id",
        default_column: "name",
        columns: &EPIC_COLUMNS,
    }],
};

impl Sortable for Sponsor {
    const SORT: &'static SortCatalog = &SPONSOR_SORT;
}

impl Sortable for Portfolio {
    const SORT: &'static SortCatalog = &PORTFOLIO_SORT;
}

impl Sortable for Initiative {
    const SORT: &'static SortCatalog = &INITIATIVE_SORT;
}

impl Sortable for Epic {
    const SORT: &'static SortCatalog = &EPIC_SORT;
}

impl Sortable for Requirement {
    const SORT: &'static SortCatalog = &REQUIREMENT_SORT;
}

/// Raw list result as returned by a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Presentation envelope for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
            has_next_page: u64::from(page) < total_pages,
            has_previous_page: page > 1,
        }
    }

    pub fn from_page(page: Page<T>, query: &ListQuery) -> Self {
        Self::new(page.items, page.total, query.page, query.limit)
    }
}
