pub mod services;

pub use crate::domain::ports::{ChildRepository, ConfigProvider, Repository, SummaryRepository};
pub use crate::utils::error::Result;
pub use services::{
    DashboardService, EpicService, InitiativeService, PortfolioService, RequirementService,
    SponsorService,
};
