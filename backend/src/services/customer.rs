//! Customer profiles derived from booking activity

use std::sync::Arc;

use serde::Serialize;

use crate::error::AppResult;
use crate::models::Customer;
use crate::store::DataStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub customers_updated: u64,
}

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn DataStore>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Customers ordered by most recent booking
    pub async fn list_customers(&self, search: Option<&str>) -> AppResult<Vec<Customer>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.list_customers(search).await
    }

    /// Recompute booking counters from the bookings themselves
    pub async fn reconcile(&self) -> AppResult<ReconcileReport> {
        let customers_updated = self.store.reconcile_customers().await?;
        tracing::info!(customers_updated, "Customer counters reconciled");
        Ok(ReconcileReport { customers_updated })
    }
}
