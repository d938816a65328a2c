//! Customer read models.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CustomerOption, CustomerSummary};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Customer service trait for dependency injection.
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Customers whose name or email contains `query`, with invoice totals.
    async fn search_customers(&self, query: &str) -> AppResult<Vec<CustomerSummary>>;

    /// Every customer, for the invoice form select box.
    async fn customer_options(&self) -> AppResult<Vec<CustomerOption>>;
}

/// Concrete implementation of CustomerService using Unit of Work.
pub struct CustomerDirectory<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CustomerDirectory<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CustomerService for CustomerDirectory<U> {
    async fn search_customers(&self, query: &str) -> AppResult<Vec<CustomerSummary>> {
        self.uow.customers().search(query.trim()).await
    }

    async fn customer_options(&self) -> AppResult<Vec<CustomerOption>> {
        let customers = self.uow.customers().list().await?;
        Ok(customers.into_iter().map(CustomerOption::from).collect())
    }
}
