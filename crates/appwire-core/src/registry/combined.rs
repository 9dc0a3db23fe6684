//! Combined multi-category registry.
//!
//! Owns one factory store per category (actions, stores, widgets) plus one
//! shared realized-instance map keyed by identity across all three. Factories
//! are invoked at most once per identity; concurrent lookups coalesce onto a
//! shared future; the first category to commit an identity wins and a later
//! committer observes a collision.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use appwire_protocols::{
    Action, ActionFactory, Category, Identity, RegistryError, Store, StoreFactory, Widget,
    WidgetFactory, WidgetOptions,
};

use crate::handle::Handle;

use super::identity_map::{IdentityRegistry, RegistryValue};
use super::provider::RegistryProvider;

#[cfg(test)]
#[path = "combined_tests.rs"]
mod tests;

/// A value that has actually been produced through the registry, tagged with
/// the category that produced it.
#[derive(Clone)]
pub enum Realized {
    Action(Arc<dyn Action>),
    Store(Arc<dyn Store>),
    Widget(Arc<dyn Widget>),
}

impl Realized {
    /// Category that committed this value.
    pub fn category(&self) -> Category {
        match self {
            Realized::Action(_) => Category::Action,
            Realized::Store(_) => Category::Store,
            Realized::Widget(_) => Category::Widget,
        }
    }
}

impl RegistryValue for Realized {
    fn value_key(&self) -> usize {
        match self {
            Realized::Action(v) => v.value_key(),
            Realized::Store(v) => v.value_key(),
            Realized::Widget(v) => v.value_key(),
        }
    }
}

/// What a factory store holds for one identity.
#[derive(Clone)]
enum Slot {
    /// Eagerly supplied instance, committed on first `get`.
    Ready(Realized),
    /// Unresolved factory, invoked at most once.
    Deferred(FactorySlot),
}

#[derive(Clone)]
enum FactorySlot {
    Action(ActionFactory),
    Store(StoreFactory),
    Widget(WidgetFactory),
}

type SharedResolution = Shared<BoxFuture<'static, Result<Realized, RegistryError>>>;

#[derive(Default)]
struct State {
    actions: HashMap<Identity, Slot>,
    stores: HashMap<Identity, Slot>,
    widgets: HashMap<Identity, Slot>,
    /// In-flight resolutions, one per (category, identity).
    pending: HashMap<(Category, Identity), SharedResolution>,
}

impl State {
    fn slots(&self, category: Category) -> &HashMap<Identity, Slot> {
        match category {
            Category::Action => &self.actions,
            Category::Store => &self.stores,
            Category::Widget => &self.widgets,
        }
    }

    fn slots_mut(&mut self, category: Category) -> &mut HashMap<Identity, Slot> {
        match category {
            Category::Action => &mut self.actions,
            Category::Store => &mut self.stores,
            Category::Widget => &mut self.widgets,
        }
    }
}

struct RegistryInner {
    state: Mutex<State>,
    realized: IdentityRegistry<Realized>,
    default_store: Mutex<Option<Arc<dyn Store>>>,
}

/// Multi-category registry resolving factories into instances.
///
/// Cheap to clone; clones share the same underlying registry.
#[derive(Clone)]
pub struct CombinedRegistry {
    inner: Arc<RegistryInner>,
}

impl CombinedRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(State::default()),
                realized: IdentityRegistry::new(),
                default_store: Mutex::new(None),
            }),
        }
    }

    /// Read-only facade over this registry.
    pub fn provider(&self) -> RegistryProvider {
        RegistryProvider::new(self.clone())
    }

    /// Set the application's default store, bound as `state_from` when
    /// widgets are created with a supplied id.
    pub fn set_default_store(&self, store: Arc<dyn Store>) {
        *self.inner.default_store.lock() = Some(store);
    }

    pub fn default_store(&self) -> Option<Arc<dyn Store>> {
        self.inner.default_store.lock().clone()
    }

    // Registration. Duplicate checks are per category and synchronous; the
    // same identity may be registered in another category without error.

    pub fn register_action(
        &self,
        id: impl Into<Identity>,
        action: Arc<dyn Action>,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(Category::Action, id.into(), Slot::Ready(Realized::Action(action)))
    }

    pub fn register_action_factory(
        &self,
        id: impl Into<Identity>,
        factory: ActionFactory,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(
            Category::Action,
            id.into(),
            Slot::Deferred(FactorySlot::Action(factory)),
        )
    }

    pub fn register_store(
        &self,
        id: impl Into<Identity>,
        store: Arc<dyn Store>,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(Category::Store, id.into(), Slot::Ready(Realized::Store(store)))
    }

    pub fn register_store_factory(
        &self,
        id: impl Into<Identity>,
        factory: StoreFactory,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(
            Category::Store,
            id.into(),
            Slot::Deferred(FactorySlot::Store(factory)),
        )
    }

    pub fn register_widget(
        &self,
        id: impl Into<Identity>,
        widget: Arc<dyn Widget>,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(Category::Widget, id.into(), Slot::Ready(Realized::Widget(widget)))
    }

    pub fn register_widget_factory(
        &self,
        id: impl Into<Identity>,
        factory: WidgetFactory,
    ) -> Result<Handle, RegistryError> {
        self.insert_slot(
            Category::Widget,
            id.into(),
            Slot::Deferred(FactorySlot::Widget(factory)),
        )
    }

    fn insert_slot(
        &self,
        category: Category,
        id: Identity,
        slot: Slot,
    ) -> Result<Handle, RegistryError> {
        let mut state = self.inner.state.lock();
        let slots = state.slots_mut(category);
        if slots.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentity(id.to_string()));
        }
        slots.insert(id.clone(), slot);
        debug!(category = %category, id = %id, "registered");
        Ok(self.removal_handle(category, id))
    }

    /// Handle removing the factory slot, any pending resolution, and the
    /// realized entry if this category committed it.
    fn removal_handle(&self, category: Category, id: Identity) -> Handle {
        let weak: Weak<RegistryInner> = Arc::downgrade(&self.inner);
        Handle::new(move || {
            if let Some(inner) = weak.upgrade() {
                {
                    let mut state = inner.state.lock();
                    state.slots_mut(category).remove(&id);
                    state.pending.remove(&(category, id.clone()));
                }
                if let Ok(existing) = inner.realized.get(&id) {
                    if existing.category() == category {
                        inner.realized.delete(&id);
                    }
                }
                debug!(category = %category, id = %id, "unregistered");
            }
        })
    }

    // Resolution.

    pub async fn get_action(&self, id: &Identity) -> Result<Arc<dyn Action>, RegistryError> {
        match self.resolve(Category::Action, id).await? {
            Realized::Action(action) => Ok(action),
            _ => unreachable!("commit only accepts values of the resolving category"),
        }
    }

    pub async fn get_store(&self, id: &Identity) -> Result<Arc<dyn Store>, RegistryError> {
        match self.resolve(Category::Store, id).await? {
            Realized::Store(store) => Ok(store),
            _ => unreachable!("commit only accepts values of the resolving category"),
        }
    }

    pub async fn get_widget(&self, id: &Identity) -> Result<Arc<dyn Widget>, RegistryError> {
        match self.resolve(Category::Widget, id).await? {
            Realized::Widget(widget) => Ok(widget),
            _ => unreachable!("commit only accepts values of the resolving category"),
        }
    }

    /// Resolve `id` within `category`:
    ///
    /// 1. serve a value already committed by this category;
    /// 2. join an in-flight resolution;
    /// 3. otherwise invoke the registered factory, at most once, and commit
    ///    the produced value into the shared realized-instance map.
    async fn resolve(&self, category: Category, id: &Identity) -> Result<Realized, RegistryError> {
        let resolution = {
            let mut state = self.inner.state.lock();

            if let Ok(existing) = self.inner.realized.get(id) {
                if existing.category() == category {
                    return Ok(existing);
                }
            }

            let pending_key = (category, id.clone());
            match state.pending.get(&pending_key) {
                Some(pending) => pending.clone(),
                None => {
                    let slot = state
                        .slots(category)
                        .get(id)
                        .cloned()
                        .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
                    let resolution = self
                        .clone()
                        .drive(category, id.clone(), slot)
                        .boxed()
                        .shared();
                    state.pending.insert(pending_key, resolution.clone());
                    resolution
                }
            }
        };
        // Lock released; every caller for this (category, id) awaits the
        // same shared future and observes the same settled result.
        resolution.await
    }

    async fn drive(
        self,
        category: Category,
        id: Identity,
        slot: Slot,
    ) -> Result<Realized, RegistryError> {
        let produced = match slot {
            Slot::Ready(value) => Ok(value),
            Slot::Deferred(factory) => self.invoke(&id, factory).await,
        };
        let result = match produced {
            Ok(candidate) => {
                // The registration may have been torn down while the factory
                // ran; committing then would orphan a realized entry no
                // handle covers. The teardown takes this lock before
                // removing the slot, so the check and the commit are atomic
                // against it.
                let state = self.inner.state.lock();
                if state.slots(category).contains_key(&id) {
                    self.commit(category, &id, candidate)
                } else {
                    Ok(candidate)
                }
            }
            Err(err) => Err(err),
        };
        // Clear the in-flight entry on success and failure alike; a rejected
        // identity is retried only through a fresh registration or get.
        self.inner.state.lock().pending.remove(&(category, id.clone()));
        if let Err(err) = &result {
            warn!(category = %category, id = %id, error = %err, "resolution failed");
        }
        result
    }

    async fn invoke(&self, id: &Identity, factory: FactorySlot) -> Result<Realized, RegistryError> {
        match factory {
            FactorySlot::Action(f) => Ok(Realized::Action(f().await?)),
            FactorySlot::Store(f) => Ok(Realized::Store(f().await?)),
            FactorySlot::Widget(f) => {
                let mut options = WidgetOptions::new().with_id(id.clone());
                self.augment_widget_options(&mut options, true);
                Ok(Realized::Widget(f(options).await?))
            }
        }
    }

    /// Commit a produced value into the shared realized-instance map. The
    /// first committer for an identity wins; a different category arriving
    /// second observes the collision. There is no rollback of the winner.
    fn commit(
        &self,
        category: Category,
        id: &Identity,
        candidate: Realized,
    ) -> Result<Realized, RegistryError> {
        if let Ok(existing) = self.inner.realized.get(id) {
            return if existing.category() == category {
                Ok(existing)
            } else {
                Err(self.collision(category, existing.category(), id))
            };
        }
        match self.inner.realized.register(id.clone(), candidate.clone()) {
            Ok(_handle) => Ok(candidate),
            Err(RegistryError::DuplicateIdentity(_)) => {
                // Lost a cross-category race between the check above and the
                // insert.
                let existing = self.inner.realized.get(id)?;
                if existing.category() == category {
                    Ok(existing)
                } else {
                    Err(self.collision(category, existing.category(), id))
                }
            }
            Err(err) => Err(err),
        }
    }

    fn collision(&self, adding: Category, existing: Category, id: &Identity) -> RegistryError {
        RegistryError::Collision {
            adding,
            existing,
            id: id.to_string(),
        }
    }

    // Reverse lookup, backed by the shared realized-instance map. Only
    // values that have actually been resolved through this registry hold an
    // identity.

    pub fn identify_action(&self, action: &Arc<dyn Action>) -> Result<Identity, RegistryError> {
        self.inner.realized.identify_key(action.value_key())
    }

    pub fn identify_store(&self, store: &Arc<dyn Store>) -> Result<Identity, RegistryError> {
        self.inner.realized.identify_key(store.value_key())
    }

    pub fn identify_widget(&self, widget: &Arc<dyn Widget>) -> Result<Identity, RegistryError> {
        self.inner.realized.identify_key(widget.value_key())
    }

    // Presence probes.

    pub fn has_action(&self, id: &Identity) -> bool {
        self.has(Category::Action, id)
    }

    pub fn has_store(&self, id: &Identity) -> bool {
        self.has(Category::Store, id)
    }

    pub fn has_widget(&self, id: &Identity) -> bool {
        self.has(Category::Widget, id)
    }

    fn has(&self, category: Category, id: &Identity) -> bool {
        if self.inner.state.lock().slots(category).contains_key(id) {
            return true;
        }
        matches!(self.inner.realized.get(id), Ok(v) if v.category() == category)
    }

    /// Invoke `factory` directly (not looked up by id) and register the
    /// produced widget under the supplied or generated identity, through the
    /// same collision path as ordinary resolution.
    ///
    /// The options are augmented before invocation: `provider` receives a
    /// read-only registry reference, and `state_from` is bound to the default
    /// store when the caller supplied an id and left `state_from` empty.
    pub async fn create_widget(
        &self,
        factory: WidgetFactory,
        mut options: WidgetOptions,
    ) -> Result<(Identity, Arc<dyn Widget>), RegistryError> {
        let id_supplied = options.id.is_some();
        let id = options.id.clone().unwrap_or_else(Identity::generate);
        options.id = Some(id.clone());
        self.augment_widget_options(&mut options, id_supplied);

        let widget = factory(options).await?;

        match self
            .inner
            .realized
            .register(id.clone(), Realized::Widget(widget.clone()))
        {
            Ok(_handle) => Ok((id, widget)),
            Err(RegistryError::DuplicateIdentity(dup)) => {
                let existing = self.inner.realized.get(&id)?;
                if existing.category() == Category::Widget {
                    Err(RegistryError::DuplicateIdentity(dup))
                } else {
                    Err(self.collision(Category::Widget, existing.category(), &id))
                }
            }
            Err(err) => Err(err),
        }
    }

    fn augment_widget_options(&self, options: &mut WidgetOptions, id_supplied: bool) {
        if options.provider.is_none() {
            options.provider = Some(Arc::new(self.provider()));
        }
        if id_supplied && options.state_from.is_none() {
            if let Some(store) = self.default_store() {
                options.state_from = Some(store);
            }
        }
    }
}

impl Default for CombinedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
