//! # Appwire Protocols
//!
//! Shared contracts for the appwire application container.
//!
//! This crate defines the vocabulary the container and its collaborators
//! speak: identity tokens and categories, the capability traits for actions,
//! stores, and widgets, the factory and definition shapes consumed by the
//! registry, the module-resolver contract, and the error taxonomy.
//!
//! The registry machinery itself lives in `appwire-core`.

pub mod access;
pub mod action;
pub mod category;
pub mod definition;
pub mod error;
pub mod factory;
pub mod identity;
pub mod resolver;
pub mod store;
pub mod widget;

pub use access::RegistryAccess;
pub use action::Action;
pub use category::Category;
pub use definition::{
    ActionDefinition, Definition, Definitions, ModuleRef, Provided, StoreDefinition,
    WidgetDefinition,
};
pub use error::RegistryError;
pub use factory::{
    action_factory, store_factory, widget_factory, ActionFactory, FactoryFuture, StoreFactory,
    WidgetFactory,
};
pub use identity::Identity;
pub use resolver::{ExportName, ModuleResolver, ResolvedExport};
pub use store::Store;
pub use widget::{Widget, WidgetOptions};
