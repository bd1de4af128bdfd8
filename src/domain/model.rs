use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

/// A persisted resource with a numeric id and the create/patch payloads used to write it.
pub trait Entity: Send + Sync + Sized + 'static {
    /// Lowercase singular name used in messages ("portfolio").
    const NAME: &'static str;

    type Create: Send + Sync + 'static;
    type Patch: Send + Sync + 'static;

    fn id(&self) -> i64;
}

/// Anything carrying a free-text lifecycle status.
pub trait HasStatus {
    fn status(&self) -> Option<&str>;
}

// 區分「欄位未提供」與「明確設為 null」
fn double_option<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSponsor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub sponsor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sponsor_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sponsor_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub portfolio_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInitiative {
    pub title: String,
    pub portfolio_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub portfolio_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub initiative_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEpic {
    pub name: String,
    pub initiative_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub initiative_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub epic_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequirement {
    pub title: String,
    pub epic_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub epic_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<String>>,
}

macro_rules! impl_entity {
    ($ty:ty, $name:literal, $create:ty, $patch:ty) => {
        impl Entity for $ty {
            const NAME: &'static str = $name;
            type Create = $create;
            type Patch = $patch;

            fn id(&self) -> i64 {
                self.id
            }
        }
    };
}

impl_entity!(Sponsor, "sponsor", NewSponsor, SponsorPatch);
impl_entity!(Portfolio, "portfolio", NewPortfolio, PortfolioPatch);
impl_entity!(Initiative, "initiative", NewInitiative, InitiativePatch);
impl_entity!(Epic, "epic", NewEpic, EpicPatch);
impl_entity!(Requirement, "requirement", NewRequirement, RequirementPatch);

macro_rules! impl_has_status {
    ($($ty:ty),*) => {
        $(impl HasStatus for $ty {
            fn status(&self) -> Option<&str> {
                self.status.as_deref()
            }
        })*
    };
}

impl_has_status!(Portfolio, Initiative, Epic, Requirement);

impl PortfolioPatch {
    /// The status this patch writes, if it sets one.
    pub fn target_status(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.as_deref())
    }
}

impl InitiativePatch {
    pub fn target_status(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.as_deref())
    }
}

fn patch_field<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl SponsorPatch {
    pub fn apply_to(self, sponsor: &mut Sponsor) {
        patch_field(&mut sponsor.name, self.name);
        patch_field(&mut sponsor.email, self.email);
    }
}

impl PortfolioPatch {
    pub fn apply_to(self, portfolio: &mut Portfolio) {
        patch_field(&mut portfolio.name, self.name);
        patch_field(&mut portfolio.description, self.description);
        patch_field(&mut portfolio.status, self.status);
        patch_field(&mut portfolio.sponsor_id, self.sponsor_id);
    }
}

impl InitiativePatch {
    pub fn apply_to(self, initiative: &mut Initiative) {
        patch_field(&mut initiative.title, self.title);
        patch_field(&mut initiative.portfolio_id, self.portfolio_id);
        patch_field(&mut initiative.description, self.description);
        patch_field(&mut initiative.status, self.status);
        patch_field(&mut initiative.start_date, self.start_date);
        patch_field(&mut initiative.end_date, self.end_date);
    }
}

impl EpicPatch {
    pub fn apply_to(self, epic: &mut Epic) {
        patch_field(&mut epic.name, self.name);
        patch_field(&mut epic.initiative_id, self.initiative_id);
        patch_field(&mut epic.description, self.description);
        patch_field(&mut epic.status, self.status);
    }
}

impl RequirementPatch {
    pub fn apply_to(self, requirement: &mut Requirement) {
        patch_field(&mut requirement.title, self.title);
        patch_field(&mut requirement.epic_id, self.epic_id);
        patch_field(&mut requirement.description, self.description);
        patch_field(&mut requirement.status, self.status);
        patch_field(&mut requirement.priority, self.priority);
    }
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::ValidationError {
                field: "endDate".to_string(),
                value: end.to_string(),
                reason: format!("End date must not be before start date {}", start),
            });
        }
    }
    Ok(())
}

fn validate_optional_name(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) => validate_non_empty_string(field, v),
        None => Ok(()),
    }
}

impl Validate for NewSponsor {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)
    }
}

impl Validate for SponsorPatch {
    fn validate(&self) -> Result<()> {
        validate_optional_name("name", &self.name)
    }
}

impl Validate for NewPortfolio {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)
    }
}

impl Validate for PortfolioPatch {
    fn validate(&self) -> Result<()> {
        validate_optional_name("name", &self.name)
    }
}

impl Validate for NewInitiative {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_dates(self.start_date, self.end_date)
    }
}

impl Validate for InitiativePatch {
    fn validate(&self) -> Result<()> {
        validate_optional_name("title", &self.title)?;
        validate_dates(self.start_date.flatten(), self.end_date.flatten())
    }
}

impl InitiativePatch {
    /// 合併已儲存的日期後再檢查先後順序
    pub fn validate_against(&self, current: &Initiative) -> Result<()> {
        self.validate()?;
        let start = self.start_date.unwrap_or(current.start_date);
        let end = self.end_date.unwrap_or(current.end_date);
        validate_dates(start, end)
    }
}

impl Validate for NewEpic {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)
    }
}

impl Validate for EpicPatch {
    fn validate(&self) -> Result<()> {
        validate_optional_name("name", &self.name)
    }
}

impl Validate for NewRequirement {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)
    }
}

impl Validate for RequirementPatch {
    fn validate(&self) -> Result<()> {
        validate_optional_name("title", &self.title)
    }
}

/// Row counts for one entity table, grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub portfolios: StatusBreakdown,
    pub initiatives: StatusBreakdown,
    pub epics: StatusBreakdown,
    pub requirements: StatusBreakdown,
}
