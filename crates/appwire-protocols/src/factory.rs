//! Factory shapes for lazily constructed registry entries.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::action::Action;
use crate::error::RegistryError;
use crate::store::Store;
use crate::widget::{Widget, WidgetOptions};

/// The future a factory invocation yields.
pub type FactoryFuture<T> = BoxFuture<'static, Result<T, RegistryError>>;

/// Constructor for an action, invoked at most once per identity.
pub type ActionFactory = Arc<dyn Fn() -> FactoryFuture<Arc<dyn Action>> + Send + Sync>;

/// Constructor for a store, invoked at most once per identity.
pub type StoreFactory = Arc<dyn Fn() -> FactoryFuture<Arc<dyn Store>> + Send + Sync>;

/// Constructor for a widget. Receives construction options augmented by the
/// registry (provider reference, optional state binding).
pub type WidgetFactory =
    Arc<dyn Fn(WidgetOptions) -> FactoryFuture<Arc<dyn Widget>> + Send + Sync>;

/// Wrap an async closure as an [`ActionFactory`].
pub fn action_factory<F, Fut>(f: F) -> ActionFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Action>, RegistryError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Wrap an async closure as a [`StoreFactory`].
pub fn store_factory<F, Fut>(f: F) -> StoreFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Store>, RegistryError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Wrap an async closure as a [`WidgetFactory`].
pub fn widget_factory<F, Fut>(f: F) -> WidgetFactory
where
    F: Fn(WidgetOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Widget>, RegistryError>> + Send + 'static,
{
    Arc::new(move |options| f(options).boxed())
}
