//! Registries for actions, stores, and widgets.

mod combined;
mod identity_map;
mod provider;

pub use combined::{CombinedRegistry, Realized};
pub use identity_map::{IdentityRegistry, RegistryValue};
pub use provider::{
    ActionProvider, ProviderView, RegistryProvider, StoreProvider, WidgetProvider,
};
