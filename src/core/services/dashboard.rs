use crate::domain::model::DashboardSummary;
use crate::domain::ports::SummaryRepository;
use crate::utils::error::Result;
use std::sync::Arc;

pub struct DashboardService<S> {
    store: Arc<S>,
}

impl<S> Clone for DashboardService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SummaryRepository> DashboardService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        self.store.summary().await
    }
}
