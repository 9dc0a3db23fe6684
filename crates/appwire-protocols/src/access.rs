//! Read-only registry access surface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::Action;
use crate::error::RegistryError;
use crate::identity::Identity;
use crate::store::Store;
use crate::widget::Widget;

/// Read-only lookup surface handed to consumers.
///
/// Actions and widgets receive this instead of the registry itself, so they
/// can look collaborators up by identity without being able to register
/// anything. Implemented by `RegistryProvider` in `appwire-core`.
#[async_trait]
pub trait RegistryAccess: Send + Sync {
    /// Resolve the action registered under `id`.
    async fn action(&self, id: &Identity) -> Result<Arc<dyn Action>, RegistryError>;

    /// Resolve the store registered under `id`.
    async fn store(&self, id: &Identity) -> Result<Arc<dyn Store>, RegistryError>;

    /// Resolve the widget registered under `id`.
    async fn widget(&self, id: &Identity) -> Result<Arc<dyn Widget>, RegistryError>;

    /// Identity under which `action` was realized.
    fn identify_action(&self, action: &Arc<dyn Action>) -> Result<Identity, RegistryError>;

    /// Identity under which `store` was realized.
    fn identify_store(&self, store: &Arc<dyn Store>) -> Result<Identity, RegistryError>;

    /// Identity under which `widget` was realized.
    fn identify_widget(&self, widget: &Arc<dyn Widget>) -> Result<Identity, RegistryError>;
}
