//! Definition records consumed by the definition loader.
//!
//! These are the plain records an external markup extractor produces; the
//! loader in `appwire-core` turns them into registrations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::factory::{ActionFactory, StoreFactory, WidgetFactory};
use crate::identity::Identity;
use crate::resolver::ExportName;
use crate::store::Store;
use crate::widget::Widget;

/// Reference to a module-provided factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Module identifier handed to the module resolver.
    pub module: String,
    /// Which export of the module to use.
    pub export: ExportName,
    /// Factory-level configuration payload, applied after construction.
    pub config: Option<Value>,
}

impl ModuleRef {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            export: ExportName::Default,
            config: None,
        }
    }

    pub fn with_export(mut self, export: ExportName) -> Self {
        self.export = export;
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// How a definition supplies its value.
#[derive(Clone)]
pub enum Provided<T, F> {
    /// An eager, already-constructed instance.
    Instance(T),
    /// A direct factory.
    Factory(F),
    /// A module identifier to be resolved lazily.
    Module(ModuleRef),
}

/// One entry of a definition batch.
#[derive(Clone)]
pub struct Definition<T, F> {
    pub id: Identity,
    pub provided: Provided<T, F>,
    /// Registry-level options: configuration for actions, default construction
    /// payload for widgets.
    pub options: Option<Value>,
}

impl<T, F> Definition<T, F> {
    pub fn instance(id: impl Into<Identity>, value: T) -> Self {
        Self {
            id: id.into(),
            provided: Provided::Instance(value),
            options: None,
        }
    }

    pub fn factory(id: impl Into<Identity>, factory: F) -> Self {
        Self {
            id: id.into(),
            provided: Provided::Factory(factory),
            options: None,
        }
    }

    pub fn module(id: impl Into<Identity>, module: ModuleRef) -> Self {
        Self {
            id: id.into(),
            provided: Provided::Module(module),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

pub type ActionDefinition = Definition<Arc<dyn Action>, ActionFactory>;
pub type StoreDefinition = Definition<Arc<dyn Store>, StoreFactory>;
pub type WidgetDefinition = Definition<Arc<dyn Widget>, WidgetFactory>;

/// Ordered per-category definition collections for one batch.
#[derive(Clone, Default)]
pub struct Definitions {
    pub actions: Vec<ActionDefinition>,
    pub stores: Vec<StoreDefinition>,
    pub widgets: Vec<WidgetDefinition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(mut self, def: ActionDefinition) -> Self {
        self.actions.push(def);
        self
    }

    pub fn store(mut self, def: StoreDefinition) -> Self {
        self.stores.push(def);
        self
    }

    pub fn widget(mut self, def: WidgetDefinition) -> Self {
        self.widgets.push(def);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.stores.is_empty() && self.widgets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len() + self.stores.len() + self.widgets.len()
    }
}
