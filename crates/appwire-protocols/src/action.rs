//! The action capability.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryError;

/// A unit of application behavior addressable by identity.
///
/// The registry treats actions as opaque apart from the optional
/// configuration step applied by the definition loader.
#[async_trait]
pub trait Action: Send + Sync {
    /// Apply a configuration payload.
    ///
    /// Actions without configuration inherit the no-op default.
    async fn configure(&self, _config: &Value) -> Result<(), RegistryError> {
        Ok(())
    }
}
