use std::sync::Arc;

use chrono::NaiveDate;

use portfolio_api::core::services::{
    EpicService, InitiativeService, PortfolioService, SponsorService,
};
use portfolio_api::domain::model::{
    EpicPatch, Initiative, InitiativePatch, NewEpic, NewInitiative, NewPortfolio, NewSponsor,
    Portfolio, PortfolioPatch,
};
use portfolio_api::domain::query::{ListFilters, ListQuery, SortOrder};
use portfolio_api::{AppError, SqliteStore};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

struct Services {
    sponsors: SponsorService<SqliteStore>,
    portfolios: PortfolioService<SqliteStore>,
    initiatives: InitiativeService<SqliteStore>,
    epics: EpicService<SqliteStore>,
}

fn services() -> Services {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    Services {
        sponsors: SponsorService::new(store.clone()),
        portfolios: PortfolioService::new(store.clone()),
        initiatives: InitiativeService::new(store.clone()),
        epics: EpicService::new(store),
    }
}

async fn portfolio(s: &Services, name: &str, status: &str) -> Portfolio {
    s.portfolios
        .create(NewPortfolio {
            name: name.to_string(),
            status: Some(status.to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn initiative(s: &Services, portfolio_id: i64, title: &str, status: &str) -> Initiative {
    s.initiatives
        .create(NewInitiative {
            title: title.to_string(),
            portfolio_id,
            status: Some(status.to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn epic(s: &Services, initiative_id: i64, name: &str, status: &str) -> i64 {
    s.epics
        .create(NewEpic {
            name: name.to_string(),
            initiative_id,
            status: Some(status.to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn status_patch(status: &str) -> PortfolioPatch {
    PortfolioPatch {
        status: Some(Some(status.to_string())),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_portfolio_delete_blocked_until_children_inactive() {
    let s = services();
    let p = portfolio(&s, "Growth", "ACTIVE").await;
    let i = initiative(&s, p.id, "Checkout", "ACTIVE").await;

    let err = assert_err!(s.portfolios.delete(p.id).await);
    assert!(matches!(err, AppError::BusinessRule { .. }));
    assert_eq!(
        err.to_string(),
        "Cannot delete portfolio because it has ACTIVE initiatives"
    );
    // 被擋下時不可有任何變動
    assert_ok!(s.portfolios.get(p.id).await);

    let patch = InitiativePatch {
        status: Some(Some("INACTIVE".to_string())),
        ..Default::default()
    };
    assert_ok!(s.initiatives.update(i.id, patch).await);
    assert_ok!(s.portfolios.delete(p.id).await);

    assert!(matches!(
        s.portfolios.get(p.id).await,
        Err(AppError::NotFound { entity: "portfolio", .. })
    ));
    // 子項目隨父項目一併刪除
    assert!(matches!(
        s.initiatives.get(i.id).await,
        Err(AppError::NotFound { entity: "initiative", .. })
    ));
}

#[tokio::test]
async fn test_portfolio_deactivation_blocked_by_active_initiative() {
    let s = services();
    let p = portfolio(&s, "Platform", "ACTIVE").await;
    initiative(&s, p.id, "Search", "ACTIVE").await;

    let err = assert_err!(s.portfolios.update(p.id, status_patch("INACTIVE")).await);
    assert_eq!(
        err.to_string(),
        "Cannot set portfolio to INACTIVE because it has ACTIVE initiatives"
    );
    let unchanged = s.portfolios.get(p.id).await.unwrap();
    assert_eq!(unchanged.status.as_deref(), Some("ACTIVE"));

    // 只有 "INACTIVE" 會觸發檢查
    let archived = assert_ok!(s.portfolios.update(p.id, status_patch("ARCHIVED")).await);
    assert_eq!(archived.status.as_deref(), Some("ARCHIVED"));

    let renamed = PortfolioPatch {
        name: Some("Platform 2".to_string()),
        ..Default::default()
    };
    assert_ok!(s.portfolios.update(p.id, renamed).await);
}

#[tokio::test]
async fn test_patch_without_status_keeps_status() {
    let s = services();
    let p = portfolio(&s, "Ops", "ACTIVE").await;

    let patch = PortfolioPatch {
        description: Some(Some("Run the business".to_string())),
        ..Default::default()
    };
    let updated = s.portfolios.update(p.id, patch).await.unwrap();
    assert_eq!(updated.status.as_deref(), Some("ACTIVE"));
    assert_eq!(updated.description.as_deref(), Some("Run the business"));

    let cleared = PortfolioPatch {
        description: Some(None),
        ..Default::default()
    };
    let updated = s.portfolios.update(p.id, cleared).await.unwrap();
    assert!(updated.description.is_none());
}

#[tokio::test]
async fn test_guard_only_checks_immediate_children() {
    let s = services();
    let p = portfolio(&s, "Legacy", "ACTIVE").await;
    let i = initiative(&s, p.id, "Migration", "INACTIVE").await;
    epic(&s, i.id, "Data copy", "ACTIVE").await;

    assert_ok!(s.portfolios.delete(p.id).await);
}

#[tokio::test]
async fn test_status_comparison_is_case_sensitive() {
    let s = services();
    let p = portfolio(&s, "Mobile", "ACTIVE").await;
    initiative(&s, p.id, "Offline mode", "active").await;

    assert_ok!(s.portfolios.update(p.id, status_patch("INACTIVE")).await);
    assert_ok!(s.portfolios.delete(p.id).await);
}

#[tokio::test]
async fn test_initiative_guard_on_epics() {
    let s = services();
    let p = portfolio(&s, "Core", "ACTIVE").await;
    let i = initiative(&s, p.id, "Billing", "ACTIVE").await;
    let e = epic(&s, i.id, "Invoices", "ACTIVE").await;

    let err = assert_err!(s.initiatives.delete(i.id).await);
    assert_eq!(
        err.to_string(),
        "Cannot delete initiative because it has ACTIVE epics"
    );
    // 從上一層刪除也會被擋下，因為該 initiative 本身是 ACTIVE
    let err = assert_err!(s.portfolios.delete(p.id).await);
    assert_eq!(
        err.to_string(),
        "Cannot delete portfolio because it has ACTIVE initiatives"
    );

    let deactivate = InitiativePatch {
        status: Some(Some("INACTIVE".to_string())),
        ..Default::default()
    };
    let err = assert_err!(s.initiatives.update(i.id, deactivate.clone()).await);
    assert_eq!(
        err.to_string(),
        "Cannot set initiative to INACTIVE because it has ACTIVE epics"
    );

    let done = EpicPatch {
        status: Some(Some("DONE".to_string())),
        ..Default::default()
    };
    assert_ok!(s.epics.update(e, done).await);
    assert_ok!(s.initiatives.update(i.id, deactivate).await);
    assert_ok!(s.initiatives.delete(i.id).await);
    assert!(matches!(
        s.epics.get(e).await,
        Err(AppError::NotFound { entity: "epic", .. })
    ));
}

#[tokio::test]
async fn test_missing_targets_and_parents() {
    let s = services();

    assert!(matches!(
        s.portfolios.delete(999).await,
        Err(AppError::NotFound { entity: "portfolio", id: 999 })
    ));
    assert!(matches!(
        s.initiatives.update(42, InitiativePatch::default()).await,
        Err(AppError::NotFound { entity: "initiative", id: 42 })
    ));

    let orphan = NewInitiative {
        title: "Orphan".to_string(),
        portfolio_id: 7,
        ..Default::default()
    };
    assert!(matches!(
        s.initiatives.create(orphan).await,
        Err(AppError::NotFound { entity: "portfolio", id: 7 })
    ));

    let bad_sponsor = NewPortfolio {
        name: "Sponsored".to_string(),
        sponsor_id: Some(3),
        ..Default::default()
    };
    assert!(matches!(
        s.portfolios.create(bad_sponsor).await,
        Err(AppError::NotFound { entity: "sponsor", id: 3 })
    ));
}

#[tokio::test]
async fn test_pagination_envelope() {
    let s = services();
    for n in 0..25 {
        s.sponsors
            .create(NewSponsor {
                name: format!("Sponsor {:02}", n),
                email: None,
            })
            .await
            .unwrap();
    }

    let page = s.sponsors.list(&ListQuery::new(3, 10)).await.unwrap();
    assert_eq!(page.data.len(), 5);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert!(!page.has_next_page);
    assert!(page.has_previous_page);

    let empty = s.sponsors.list(&ListQuery::new(9, 10)).await.unwrap();
    assert!(empty.data.is_empty());
    assert_eq!(empty.total, 25);

    let by_name = s
        .sponsors
        .list(&ListQuery::new(1, 3).sorted("name", SortOrder::Asc))
        .await
        .unwrap();
    let names: Vec<_> = by_name.data.iter().map(|sp| sp.name.as_str()).collect();
    assert_eq!(names, ["Sponsor 00", "Sponsor 01", "Sponsor 02"]);
}

#[tokio::test]
async fn test_sort_by_related_entity_and_filters() {
    let s = services();
    let zeta = portfolio(&s, "Zeta", "ACTIVE").await;
    let alpha = portfolio(&s, "Alpha", "ACTIVE").await;
    initiative(&s, zeta.id, "Z1", "ACTIVE").await;
    initiative(&s, alpha.id, "A1", "PLANNED").await;
    initiative(&s, alpha.id, "A2", "ACTIVE").await;

    let query = ListQuery::new(1, 10).sorted("portfolio", SortOrder::Asc);
    let page = s.initiatives.list(&query).await.unwrap();
    let owners: Vec<_> = page.data.iter().map(|i| i.portfolio_id).collect();
    assert_eq!(owners, [alpha.id, alpha.id, zeta.id]);
    // 同一排序值以 id 決定順序
    assert!(page.data[0].id < page.data[1].id);

    let active_in_alpha = ListQuery::new(1, 10).filtered(ListFilters {
        status: Some("ACTIVE".to_string()),
        portfolio_id: Some(alpha.id),
        ..Default::default()
    });
    let page = s.initiatives.list(&active_in_alpha).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].title, "A2");

    // 未知的排序欄位退回預設排序，而不是報錯
    let unknown = ListQuery::new(1, 10).sorted("nonsense; DROP TABLE", SortOrder::Desc);
    let page = s.initiatives.list(&unknown).await.unwrap();
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn test_patch_dates_checked_against_stored_dates() {
    let s = services();
    let p = portfolio(&s, "Roadmap", "ACTIVE").await;
    let june = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let january = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let december = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();

    let i = s
        .initiatives
        .create(NewInitiative {
            title: "Launch".to_string(),
            portfolio_id: p.id,
            start_date: Some(june),
            ..Default::default()
        })
        .await
        .unwrap();

    let early_end = InitiativePatch {
        end_date: Some(Some(january)),
        ..Default::default()
    };
    let err = assert_err!(s.initiatives.update(i.id, early_end).await);
    assert!(matches!(err, AppError::ValidationError { ref field, .. } if field == "endDate"));

    let stored = s.initiatives.get(i.id).await.unwrap();
    assert_eq!(stored.start_date, Some(june));
    assert!(stored.end_date.is_none());

    let end = InitiativePatch {
        end_date: Some(Some(december)),
        ..Default::default()
    };
    assert_ok!(s.initiatives.update(i.id, end).await);

    // 反方向：只改開始日期也要和已存的結束日期比較
    let late_start = InitiativePatch {
        start_date: Some(Some(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap())),
        ..Default::default()
    };
    assert_err!(s.initiatives.update(i.id, late_start).await);

    // 清掉開始日期後就沒有順序限制
    let cleared = InitiativePatch {
        start_date: Some(None),
        ..Default::default()
    };
    let updated = assert_ok!(s.initiatives.update(i.id, cleared).await);
    assert!(updated.start_date.is_none());
    assert_eq!(updated.end_date, Some(december));
}

#[tokio::test]
async fn test_store_persists_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("portfolio.db");

    let id = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let portfolios = PortfolioService::new(store);
        portfolios
            .create(NewPortfolio {
                name: "Durable".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let portfolios = PortfolioService::new(store);
    let loaded = portfolios.get(id).await.unwrap();
    assert_eq!(loaded.name, "Durable");
}
