//! The widget capability and construction options.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::access::RegistryAccess;
use crate::identity::Identity;
use crate::store::Store;

/// A destroyable object with a lifecycle.
#[async_trait]
pub trait Widget: Send + Sync {
    /// Tear the widget down. Destruction is owned by whoever created the
    /// widget; the registry never calls this itself.
    async fn destroy(&self);
}

/// Options handed to a widget factory.
///
/// The registry augments these before invocation: `provider` always gets a
/// read-only registry reference, and `state_from` is bound to the container's
/// default store when the caller supplied an id.
#[derive(Clone, Default)]
pub struct WidgetOptions {
    /// Identity to register the widget under; generated when absent.
    pub id: Option<Identity>,
    /// Read-only registry surface for looking up collaborators.
    pub provider: Option<Arc<dyn RegistryAccess>>,
    /// Store the widget binds its state to.
    pub state_from: Option<Arc<dyn Store>>,
    /// Free-form construction payload.
    pub config: Value,
}

impl WidgetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<Identity>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}
