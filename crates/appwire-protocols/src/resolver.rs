//! Module resolver contract.
//!
//! Resolving a module identifier string into a concrete factory or value is
//! an external collaborator's job; the registry treats it purely as an opaque
//! asynchronous lookup.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistryError;
use crate::factory::{ActionFactory, StoreFactory, WidgetFactory};

/// Which export of a module to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportName {
    /// The module's default export.
    Default,
    /// A single named export.
    Named(String),
    /// Sentinel requesting all named exports of the module.
    All,
}

/// What a module identifier resolved to.
#[derive(Clone)]
pub enum ResolvedExport {
    Action(ActionFactory),
    Store(StoreFactory),
    Widget(WidgetFactory),
    /// A plain exported value, e.g. a configuration payload.
    Value(Value),
}

impl fmt::Debug for ResolvedExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedExport::Action(_) => f.write_str("ResolvedExport::Action"),
            ResolvedExport::Store(_) => f.write_str("ResolvedExport::Store"),
            ResolvedExport::Widget(_) => f.write_str("ResolvedExport::Widget"),
            ResolvedExport::Value(v) => write!(f, "ResolvedExport::Value({v})"),
        }
    }
}

/// Resolves a module identifier into an export.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolve `module`, selecting `export`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Resolve`] when the module or export cannot
    /// be found.
    async fn resolve(&self, module: &str, export: &ExportName)
        -> Result<ResolvedExport, RegistryError>;
}
