//! Definition loader and grouped registration handles.
//!
//! Turns a batch of plain definition records (the output shape of a
//! declarative markup extractor) into registrations, collecting every
//! sub-handle into one composite whose destruction undoes the batch.

use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use appwire_protocols::{
    ActionDefinition, ActionFactory, Category, Definition, Definitions, ModuleRef, ModuleResolver,
    Provided, RegistryError, ResolvedExport, StoreDefinition, StoreFactory, WidgetDefinition,
    WidgetFactory, WidgetOptions,
};

use crate::handle::Handle;
use crate::registry::CombinedRegistry;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// A batch load failure.
///
/// Registrations made before the failure are not undone automatically;
/// `partial` destroys them for callers that want atomicity.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct LoadError {
    #[source]
    pub source: RegistryError,
    /// Composite handle over the registrations made before the failure.
    pub partial: Handle,
}

/// Batch-registers definitions into a [`CombinedRegistry`].
pub struct DefinitionLoader {
    registry: CombinedRegistry,
    resolver: Arc<dyn ModuleResolver>,
}

impl DefinitionLoader {
    pub fn new(registry: CombinedRegistry, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Register every entry of `definitions` and return one composite handle
    /// undoing the whole batch.
    ///
    /// Duplicate identities within a category fail synchronously, before any
    /// factory is invoked. A failure aborts the remaining entries and returns
    /// the partial handle inside the error.
    ///
    /// A module-backed action carrying both a module-level config payload and
    /// definition-level options is configured twice, in that order. This
    /// matches the configure-then-rebind sequence of declarative wiring and
    /// is kept deliberately.
    pub async fn load(&self, definitions: Definitions) -> Result<Handle, LoadError> {
        let Definitions {
            actions,
            stores,
            widgets,
        } = definitions;
        let mut handles = Vec::new();

        for def in actions {
            if let Err(source) = self.load_action(def, &mut handles).await {
                return Err(abort(source, handles));
            }
        }
        for def in stores {
            match self.load_store(def) {
                Ok(handle) => handles.push(handle),
                Err(source) => return Err(abort(source, handles)),
            }
        }
        for def in widgets {
            match self.load_widget(def) {
                Ok(handle) => handles.push(handle),
                Err(source) => return Err(abort(source, handles)),
            }
        }

        debug!(count = handles.len(), "definition batch loaded");
        Ok(Handle::group(handles))
    }

    async fn load_action(
        &self,
        def: ActionDefinition,
        handles: &mut Vec<Handle>,
    ) -> Result<(), RegistryError> {
        let Definition {
            id,
            provided,
            options,
        } = def;
        match provided {
            Provided::Instance(action) => {
                // Collected before configure runs, so a rejected payload
                // still leaves this registration covered by the partial
                // handle.
                handles.push(self.registry.register_action(id, action.clone())?);
                if let Some(config) = &options {
                    action.configure(config).await?;
                }
            }
            Provided::Factory(factory) => handles.push(
                self.registry
                    .register_action_factory(id, configure_after_build(factory, options))?,
            ),
            Provided::Module(mref) => handles.push(
                self.registry
                    .register_action_factory(id, self.module_action_factory(mref, options))?,
            ),
        }
        Ok(())
    }

    fn load_store(&self, def: StoreDefinition) -> Result<Handle, RegistryError> {
        let Definition {
            id,
            provided,
            options,
        } = def;
        if options.is_some() {
            // Stores are opaque and store factories take no arguments.
            debug!(id = %id, "ignoring options on store definition");
        }
        match provided {
            Provided::Instance(store) => self.registry.register_store(id, store),
            Provided::Factory(factory) => self.registry.register_store_factory(id, factory),
            Provided::Module(mref) => self
                .registry
                .register_store_factory(id, self.module_store_factory(mref)),
        }
    }

    fn load_widget(&self, def: WidgetDefinition) -> Result<Handle, RegistryError> {
        let Definition {
            id,
            provided,
            options,
        } = def;
        match provided {
            Provided::Instance(widget) => self.registry.register_widget(id, widget),
            Provided::Factory(factory) => self
                .registry
                .register_widget_factory(id, default_config(factory, options)),
            Provided::Module(mref) => self
                .registry
                .register_widget_factory(id, self.module_widget_factory(mref, options)),
        }
    }

    /// Factory that resolves the module id on first `get`, expects an action
    /// export, and applies module-level then definition-level configuration.
    fn module_action_factory(&self, mref: ModuleRef, options: Option<Value>) -> ActionFactory {
        let resolver = self.resolver.clone();
        Arc::new(move || {
            let resolver = resolver.clone();
            let mref = mref.clone();
            let options = options.clone();
            async move {
                let factory = match resolver.resolve(&mref.module, &mref.export).await? {
                    ResolvedExport::Action(factory) => factory,
                    _ => {
                        return Err(RegistryError::WrongExport {
                            module: mref.module.clone(),
                            expected: Category::Action,
                        })
                    }
                };
                let action = factory().await?;
                if let Some(config) = &mref.config {
                    action.configure(config).await?;
                }
                // Second configure when both payloads are present; the known
                // double-invocation quirk.
                if let Some(config) = &options {
                    action.configure(config).await?;
                }
                Ok(action)
            }
            .boxed()
        })
    }

    fn module_store_factory(&self, mref: ModuleRef) -> StoreFactory {
        let resolver = self.resolver.clone();
        Arc::new(move || {
            let resolver = resolver.clone();
            let mref = mref.clone();
            async move {
                match resolver.resolve(&mref.module, &mref.export).await? {
                    ResolvedExport::Store(factory) => factory().await,
                    _ => Err(RegistryError::WrongExport {
                        module: mref.module.clone(),
                        expected: Category::Store,
                    }),
                }
            }
            .boxed()
        })
    }

    fn module_widget_factory(&self, mref: ModuleRef, options: Option<Value>) -> WidgetFactory {
        let resolver = self.resolver.clone();
        Arc::new(move |mut opts: WidgetOptions| {
            let resolver = resolver.clone();
            let mref = mref.clone();
            let options = options.clone();
            async move {
                let factory = match resolver.resolve(&mref.module, &mref.export).await? {
                    ResolvedExport::Widget(factory) => factory,
                    _ => {
                        return Err(RegistryError::WrongExport {
                            module: mref.module.clone(),
                            expected: Category::Widget,
                        })
                    }
                };
                if opts.config.is_null() {
                    if let Some(config) = options.or(mref.config) {
                        opts.config = config;
                    }
                }
                factory(opts).await
            }
            .boxed()
        })
    }
}

fn abort(source: RegistryError, handles: Vec<Handle>) -> LoadError {
    warn!(error = %source, "definition batch aborted");
    LoadError {
        source,
        partial: Handle::group(handles),
    }
}

/// Wrap an action factory so the definition's options configure the action
/// after construction.
fn configure_after_build(factory: ActionFactory, options: Option<Value>) -> ActionFactory {
    let Some(config) = options else {
        return factory;
    };
    Arc::new(move || {
        let factory = factory.clone();
        let config = config.clone();
        async move {
            let action = factory().await?;
            action.configure(&config).await?;
            Ok(action)
        }
        .boxed()
    })
}

/// Wrap a widget factory so the definition's options become the default
/// construction payload.
fn default_config(factory: WidgetFactory, options: Option<Value>) -> WidgetFactory {
    let Some(config) = options else {
        return factory;
    };
    Arc::new(move |mut opts: WidgetOptions| {
        if opts.config.is_null() {
            opts.config = config.clone();
        }
        factory(opts)
    })
}
