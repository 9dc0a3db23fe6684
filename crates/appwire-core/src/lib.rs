//! # Appwire Core
//!
//! Identity-based asynchronous registry machinery for the appwire
//! application container.
//!
//! ## Components
//!
//! - [`IdentityRegistry`] - bijective identity-to-value map with handle-based
//!   removal
//! - [`CombinedRegistry`] - per-category factories resolved lazily into one
//!   shared realized-instance space, with cross-category collision detection
//! - [`RegistryProvider`] - the read-only facade consumers see
//! - [`DefinitionLoader`] - batch registration with grouped teardown handles
//! - [`Container`] - the application front door owning one registry
//!
//! ## Resolution model
//!
//! A `get` call for an identity is a shared future: concurrent callers for
//! the same identity within one category coalesce onto a single factory
//! invocation and observe the same settled result. The first category to
//! commit an identity into the shared realized-instance space wins; a later
//! committer from another category observes a collision and rejects.

pub mod container;
pub mod handle;
pub mod loader;
pub mod registry;

pub use container::Container;
pub use handle::Handle;
pub use loader::{DefinitionLoader, LoadError};
pub use registry::{
    ActionProvider, CombinedRegistry, IdentityRegistry, ProviderView, Realized, RegistryProvider,
    RegistryValue, StoreProvider, WidgetProvider,
};
