//! Read-only registry facade.
//!
//! This is the only registry surface visible to actions and widgets:
//! consumers look collaborators up, only the container registers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use appwire_protocols::{
    Action, Category, Identity, RegistryAccess, RegistryError, Store, Widget, WidgetFactory,
    WidgetOptions,
};

use super::combined::CombinedRegistry;

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;

/// Immutable read-only view over a [`CombinedRegistry`].
#[derive(Clone)]
pub struct RegistryProvider {
    registry: CombinedRegistry,
}

/// Closed set of per-category views handed out by [`RegistryProvider::get`].
pub enum ProviderView {
    Actions(ActionProvider),
    Stores(StoreProvider),
    Widgets(WidgetProvider),
}

impl fmt::Debug for ProviderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderView::Actions(_) => f.write_str("ProviderView::Actions"),
            ProviderView::Stores(_) => f.write_str("ProviderView::Stores"),
            ProviderView::Widgets(_) => f.write_str("ProviderView::Widgets"),
        }
    }
}

impl RegistryProvider {
    pub fn new(registry: CombinedRegistry) -> Self {
        Self { registry }
    }

    pub fn actions(&self) -> ActionProvider {
        ActionProvider {
            registry: self.registry.clone(),
        }
    }

    pub fn stores(&self) -> StoreProvider {
        StoreProvider {
            registry: self.registry.clone(),
        }
    }

    pub fn widgets(&self) -> WidgetProvider {
        WidgetProvider {
            registry: self.registry.clone(),
        }
    }

    /// Look a category view up by its facade name (`"actions"`, `"stores"`,
    /// `"widgets"`). Category strings stop here; past this boundary
    /// everything is the closed [`ProviderView`] enum.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCategory`] for any other name.
    pub fn get(&self, category: &str) -> Result<ProviderView, RegistryError> {
        match Category::from_plural(category) {
            Some(Category::Action) => Ok(ProviderView::Actions(self.actions())),
            Some(Category::Store) => Ok(ProviderView::Stores(self.stores())),
            Some(Category::Widget) => Ok(ProviderView::Widgets(self.widgets())),
            None => Err(RegistryError::UnknownCategory(category.to_string())),
        }
    }
}

/// Lookup view over registered actions.
#[derive(Clone)]
pub struct ActionProvider {
    registry: CombinedRegistry,
}

impl ActionProvider {
    pub async fn get(&self, id: &Identity) -> Result<Arc<dyn Action>, RegistryError> {
        self.registry.get_action(id).await
    }

    pub fn identify(&self, action: &Arc<dyn Action>) -> Result<Identity, RegistryError> {
        self.registry.identify_action(action)
    }
}

/// Lookup view over registered stores.
#[derive(Clone)]
pub struct StoreProvider {
    registry: CombinedRegistry,
}

impl StoreProvider {
    pub async fn get(&self, id: &Identity) -> Result<Arc<dyn Store>, RegistryError> {
        self.registry.get_store(id).await
    }

    pub fn identify(&self, store: &Arc<dyn Store>) -> Result<Identity, RegistryError> {
        self.registry.identify_store(store)
    }
}

/// Lookup-and-create view over registered widgets.
#[derive(Clone)]
pub struct WidgetProvider {
    registry: CombinedRegistry,
}

impl WidgetProvider {
    pub async fn get(&self, id: &Identity) -> Result<Arc<dyn Widget>, RegistryError> {
        self.registry.get_widget(id).await
    }

    pub fn identify(&self, widget: &Arc<dyn Widget>) -> Result<Identity, RegistryError> {
        self.registry.identify_widget(widget)
    }

    /// Create a widget from `factory` and register it. See
    /// [`CombinedRegistry::create_widget`].
    pub async fn create(
        &self,
        factory: WidgetFactory,
        options: WidgetOptions,
    ) -> Result<(Identity, Arc<dyn Widget>), RegistryError> {
        self.registry.create_widget(factory, options).await
    }
}

#[async_trait]
impl RegistryAccess for RegistryProvider {
    async fn action(&self, id: &Identity) -> Result<Arc<dyn Action>, RegistryError> {
        self.registry.get_action(id).await
    }

    async fn store(&self, id: &Identity) -> Result<Arc<dyn Store>, RegistryError> {
        self.registry.get_store(id).await
    }

    async fn widget(&self, id: &Identity) -> Result<Arc<dyn Widget>, RegistryError> {
        self.registry.get_widget(id).await
    }

    fn identify_action(&self, action: &Arc<dyn Action>) -> Result<Identity, RegistryError> {
        self.registry.identify_action(action)
    }

    fn identify_store(&self, store: &Arc<dyn Store>) -> Result<Identity, RegistryError> {
        self.registry.identify_store(store)
    }

    fn identify_widget(&self, widget: &Arc<dyn Widget>) -> Result<Identity, RegistryError> {
        self.registry.identify_widget(widget)
    }
}
