use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use appwire_protocols::{action_factory, store_factory, widget_factory};

struct TestAction {
    configs: Mutex<Vec<Value>>,
}

impl TestAction {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            configs: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Action for TestAction {
    async fn configure(&self, config: &Value) -> Result<(), RegistryError> {
        self.configs.lock().push(config.clone());
        Ok(())
    }
}

struct TestStore;

impl Store for TestStore {}

struct TestWidget;

#[async_trait]
impl Widget for TestWidget {
    async fn destroy(&self) {}
}

fn an_action() -> Arc<dyn Action> {
    TestAction::new()
}

fn a_store() -> Arc<dyn Store> {
    Arc::new(TestStore)
}

fn a_widget() -> Arc<dyn Widget> {
    Arc::new(TestWidget)
}

#[tokio::test]
async fn test_register_then_get_returns_same_instance() {
    let registry = CombinedRegistry::new();
    let action = an_action();

    registry.register_action("save", action.clone()).unwrap();

    let got = registry.get_action(&Identity::new("save")).await.unwrap();
    assert!(Arc::ptr_eq(&got, &action));
}

#[tokio::test]
async fn test_get_unknown_identity() {
    let registry = CombinedRegistry::new();
    let err = registry
        .get_action(&Identity::new("save"))
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Could not find a value for identity 'save'");
}

#[test]
fn test_duplicate_registration_fails_synchronously() {
    let registry = CombinedRegistry::new();
    registry.register_action("save", an_action()).unwrap();

    let err = registry.register_action("save", an_action()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateIdentity(_)));

    let err = registry
        .register_action_factory("save", action_factory(|| async { Ok(an_action()) }))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateIdentity(_)));
}

#[test]
fn test_categories_are_independent_namespaces_at_registration() {
    let registry = CombinedRegistry::new();
    registry.register_action("foo", an_action()).unwrap();
    registry.register_store("foo", a_store()).unwrap();
    registry.register_widget("foo", a_widget()).unwrap();
}

#[tokio::test]
async fn test_factory_invoked_lazily_and_at_most_once() {
    let registry = CombinedRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    registry
        .register_action_factory(
            "save",
            action_factory(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(an_action())
                }
            }),
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let id = Identity::new("save");
    let first = registry.get_action(&id).await.unwrap();
    let second = registry.get_action(&id).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_gets_coalesce_onto_one_invocation() {
    let registry = CombinedRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    registry
        .register_action_factory(
            "save",
            action_factory(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(an_action())
                }
            }),
        )
        .unwrap();

    let id = Identity::new("save");
    let (a, b) = tokio::join!(registry.get_action(&id), registry.get_action(&id));
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_factory_failure_reaches_every_waiter() {
    let registry = CombinedRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    registry
        .register_action_factory(
            "save",
            action_factory(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Err(RegistryError::Factory("boom".to_string()))
                }
            }),
        )
        .unwrap();

    let id = Identity::new("save");
    let (a, b) = tokio::join!(registry.get_action(&id), registry.get_action(&id));
    assert!(matches!(a, Err(RegistryError::Factory(_))));
    assert!(matches!(b, Err(RegistryError::Factory(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_resolution_can_be_retried() {
    let registry = CombinedRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    registry
        .register_action_factory(
            "save",
            action_factory(move || {
                let calls = c.fetch_add(1, Ordering::SeqCst);
                async move {
                    if calls == 0 {
                        Err(RegistryError::Factory("first attempt fails".to_string()))
                    } else {
                        Ok(an_action())
                    }
                }
            }),
        )
        .unwrap();

    let id = Identity::new("save");
    assert!(registry.get_action(&id).await.is_err());
    assert!(registry.get_action(&id).await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cross_category_collision_after_commit() {
    let registry = CombinedRegistry::new();
    registry.register_action("foo", an_action()).unwrap();
    registry
        .register_store_factory("foo", store_factory(|| async { Ok(a_store()) }))
        .unwrap();

    let id = Identity::new("foo");
    registry.get_action(&id).await.unwrap();

    let err = registry.get_store(&id).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        "Could not add store, already registered as action with identity foo"
    );
}

#[tokio::test]
async fn test_concurrent_cross_category_race_has_exactly_one_winner() {
    let registry = CombinedRegistry::new();
    registry
        .register_action_factory("foo", action_factory(|| async { Ok(an_action()) }))
        .unwrap();
    registry
        .register_store_factory("foo", store_factory(|| async { Ok(a_store()) }))
        .unwrap();

    let id = Identity::new("foo");
    let (action, store) = tokio::join!(registry.get_action(&id), registry.get_store(&id));

    assert_eq!(action.is_ok() as usize + store.is_ok() as usize, 1);
    let err = action.err().or(store.err()).unwrap().to_string();
    assert!(
        err == "Could not add store, already registered as action with identity foo"
            || err == "Could not add action, already registered as store with identity foo",
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_identify_after_resolution() {
    let registry = CombinedRegistry::new();
    let action = an_action();
    registry.register_action("save", action.clone()).unwrap();

    // Not realized until first get.
    assert!(matches!(
        registry.identify_action(&action),
        Err(RegistryError::NotRegistered)
    ));

    registry.get_action(&Identity::new("save")).await.unwrap();
    assert_eq!(
        registry.identify_action(&action).unwrap(),
        Identity::new("save")
    );
}

#[tokio::test]
async fn test_same_value_under_two_identities_conflicts() {
    let registry = CombinedRegistry::new();
    let action = an_action();
    registry.register_action("a", action.clone()).unwrap();
    registry.register_action("b", action).unwrap();

    registry.get_action(&Identity::new("a")).await.unwrap();
    let err = registry.get_action(&Identity::new("b")).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        "The value has already been registered with a different identity (a)"
    );
}

#[tokio::test]
async fn test_handle_destroy_removes_registration() {
    let registry = CombinedRegistry::new();
    let action = an_action();
    let handle = registry.register_action("save", action.clone()).unwrap();

    let id = Identity::new("save");
    registry.get_action(&id).await.unwrap();

    handle.destroy();
    handle.destroy();

    assert!(registry.get_action(&id).await.is_err());
    assert!(matches!(
        registry.identify_action(&action),
        Err(RegistryError::NotRegistered)
    ));

    // Identity is free for reuse after removal.
    registry.register_action("save", an_action()).unwrap();
}

#[tokio::test]
async fn test_unregistering_mid_resolution_leaves_no_realized_entry() {
    let registry = CombinedRegistry::new();
    let handle = registry
        .register_store_factory(
            "x",
            store_factory(|| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(a_store())
            }),
        )
        .unwrap();

    let pending = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.get_store(&Identity::new("x")).await })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    handle.destroy();

    // The in-flight waiter still gets the produced value, but nothing is
    // committed on behalf of the removed registration.
    assert!(pending.await.unwrap().is_ok());
    let id = Identity::new("x");
    assert!(!registry.has_store(&id));

    // The identity is free again, including for another category.
    registry.register_action("x", an_action()).unwrap();
    registry.get_action(&id).await.unwrap();
}

#[tokio::test]
async fn test_widget_factory_receives_augmented_options() {
    let registry = CombinedRegistry::new();
    registry.set_default_store(a_store());

    registry
        .register_widget_factory(
            "panel",
            widget_factory(|options: WidgetOptions| async move {
                assert_eq!(options.id, Some(Identity::new("panel")));
                assert!(options.provider.is_some());
                assert!(options.state_from.is_some());
                Ok(a_widget())
            }),
        )
        .unwrap();

    let id = Identity::new("panel");
    let widget = registry.get_widget(&id).await.unwrap();
    assert_eq!(registry.identify_widget(&widget).unwrap(), id);
}

#[tokio::test]
async fn test_create_widget_with_supplied_id() {
    let registry = CombinedRegistry::new();
    registry.set_default_store(a_store());

    let factory = widget_factory(|options: WidgetOptions| async move {
        assert!(options.provider.is_some());
        assert!(options.state_from.is_some());
        Ok(a_widget())
    });
    let options = WidgetOptions::new().with_id("panel");

    let (id, widget) = registry.create_widget(factory, options).await.unwrap();
    assert_eq!(id, Identity::new("panel"));
    assert_eq!(registry.identify_widget(&widget).unwrap(), id);

    let got = registry.get_widget(&id).await.unwrap();
    assert!(Arc::ptr_eq(&got, &widget));
}

#[tokio::test]
async fn test_create_widget_generates_identity_without_state_binding() {
    let registry = CombinedRegistry::new();
    registry.set_default_store(a_store());

    let factory = widget_factory(|options: WidgetOptions| async move {
        // No supplied id, so no default-store binding.
        assert!(options.state_from.is_none());
        assert!(options.id.is_some());
        Ok(a_widget())
    });

    let (id, _widget) = registry
        .create_widget(factory, WidgetOptions::new())
        .await
        .unwrap();
    assert!(id.as_str().starts_with("anon-"));
}

#[tokio::test]
async fn test_create_widget_rejects_taken_identity() {
    let registry = CombinedRegistry::new();

    let factory = widget_factory(|_| async { Ok(a_widget()) });
    registry
        .create_widget(factory.clone(), WidgetOptions::new().with_id("panel"))
        .await
        .unwrap();

    let err = registry
        .create_widget(factory, WidgetOptions::new().with_id("panel"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::DuplicateIdentity(_)));
}

#[tokio::test]
async fn test_create_widget_collides_with_other_category() {
    let registry = CombinedRegistry::new();
    registry.register_action("foo", an_action()).unwrap();
    registry.get_action(&Identity::new("foo")).await.unwrap();

    let factory = widget_factory(|_| async { Ok(a_widget()) });
    let err = registry
        .create_widget(factory, WidgetOptions::new().with_id("foo"))
        .await
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Could not add widget, already registered as action with identity foo"
    );
}

#[tokio::test]
async fn test_has_probes_cover_slots_and_realized_entries() {
    let registry = CombinedRegistry::new();
    let id = Identity::new("foo");
    assert!(!registry.has_action(&id));

    registry.register_action("foo", an_action()).unwrap();
    assert!(registry.has_action(&id));
    assert!(!registry.has_store(&id));

    let factory = widget_factory(|_| async { Ok(a_widget()) });
    registry
        .create_widget(factory, WidgetOptions::new().with_id("bar"))
        .await
        .unwrap();
    assert!(registry.has_widget(&Identity::new("bar")));
}
