//! Application container front door.

use std::sync::Arc;

use appwire_protocols::{Definitions, ModuleResolver, Store};

use crate::handle::Handle;
use crate::loader::{DefinitionLoader, LoadError};
use crate::registry::{CombinedRegistry, RegistryProvider};

/// Owns the application's one [`CombinedRegistry`] and wires the definition
/// loader to a module resolver.
///
/// The container registers; consumers receive a [`RegistryProvider`] and can
/// only look up.
pub struct Container {
    registry: CombinedRegistry,
    loader: DefinitionLoader,
}

impl Container {
    pub fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        let registry = CombinedRegistry::new();
        let loader = DefinitionLoader::new(registry.clone(), resolver);
        Self { registry, loader }
    }

    /// The full registry surface, for registration by the container's owner.
    pub fn registry(&self) -> &CombinedRegistry {
        &self.registry
    }

    /// The read-only surface handed to consumers.
    pub fn provider(&self) -> RegistryProvider {
        self.registry.provider()
    }

    /// Set the application's default store. Widgets created with a supplied
    /// id get it bound as `state_from`.
    pub fn set_default_store(&self, store: Arc<dyn Store>) {
        self.registry.set_default_store(store);
    }

    /// Batch-register a set of definitions. The returned handle undoes the
    /// whole batch.
    pub async fn load_definitions(&self, definitions: Definitions) -> Result<Handle, LoadError> {
        self.loader.load(definitions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use appwire_protocols::{
        Action, Definition, ExportName, Identity, RegistryError, ResolvedExport, Store,
    };

    struct NullResolver;

    #[async_trait]
    impl ModuleResolver for NullResolver {
        async fn resolve(
            &self,
            module: &str,
            _export: &ExportName,
        ) -> Result<ResolvedExport, RegistryError> {
            Err(RegistryError::Resolve {
                module: module.to_string(),
                reason: "module not found".to_string(),
            })
        }
    }

    struct TestAction;

    impl Action for TestAction {}

    struct TestStore;

    impl Store for TestStore {}

    #[tokio::test]
    async fn test_load_then_look_up_through_provider() {
        let container = Container::new(Arc::new(NullResolver));
        container.set_default_store(Arc::new(TestStore));

        let action: Arc<dyn Action> = Arc::new(TestAction);
        let definitions = Definitions::new().action(Definition::instance("save", action.clone()));
        let handle = container.load_definitions(definitions).await.unwrap();

        let provider = container.provider();
        let got = provider.actions().get(&Identity::new("save")).await.unwrap();
        assert!(Arc::ptr_eq(&got, &action));

        handle.destroy();
        assert!(provider.actions().get(&Identity::new("save")).await.is_err());
    }

    #[tokio::test]
    async fn test_registry_surface_registers_directly() {
        let container = Container::new(Arc::new(NullResolver));
        let action: Arc<dyn Action> = Arc::new(TestAction);
        container
            .registry()
            .register_action("save", action.clone())
            .unwrap();

        let got = container
            .provider()
            .actions()
            .get(&Identity::new("save"))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&got, &action));
    }
}
