//! Capability-based fetch dispatch.
//!
//! Each concrete DAO type declares the fetch operations it supports.
//! Dispatching an operation the type does not declare fails loudly with
//! [`DaoError::FetchNotImplemented`], naming the operation and the concrete
//! type, rather than silently doing nothing.

use crate::errors::DaoError;
use crate::formats::Payload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Concrete DAO type name, used in error messages.
    fn name(&self) -> &'static str;

    /// Fetch operations this source supports.
    fn operations(&self) -> &'static [&'static str];

    /// Run one declared fetch operation. Implementations must return
    /// [`DaoError::FetchNotImplemented`] for undeclared operations.
    async fn fetch(
        &self,
        operation: &str,
        params: &HashMap<String, String>,
    ) -> Result<Payload, DaoError>;
}

/// Builds the `FetchNotImplemented` error for a source.
pub fn fetch_not_implemented(operation: &str, dao_type: &str) -> DaoError {
    DaoError::FetchNotImplemented {
        method: operation.to_string(),
        dao_type: dao_type.to_string(),
    }
}

/// Named data sources available to the widget endpoint.
#[derive(Clone, Default)]
pub struct Registry {
    sources: HashMap<String, Arc<dyn DataSource>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) {
        self.sources.insert(name.into(), source);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn DataSource>, DaoError> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| DaoError::SourceNotConfigured(name.to_string()))
    }

    pub async fn fetch(
        &self,
        source: &str,
        operation: &str,
        params: &HashMap<String, String>,
    ) -> Result<Payload, DaoError> {
        self.get(source)?.fetch(operation, params).await
    }
}
