//! Destroyable registration handles.

use std::fmt;

use parking_lot::Mutex;

type Teardown = Box<dyn FnOnce() + Send>;

/// A destroyable token representing ownership of one or more registry
/// entries.
///
/// Destruction is idempotent: the teardown closure runs on the first
/// `destroy` call and never again. Dropping a handle does not destroy it;
/// entries stay registered until explicitly removed.
pub struct Handle {
    teardown: Mutex<Option<Teardown>>,
}

impl Handle {
    /// Create a handle around a teardown closure.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// A handle that owns nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Combine handles into one composite whose destruction destroys every
    /// child exactly once, in registration order.
    pub fn group(handles: impl IntoIterator<Item = Handle>) -> Self {
        let handles: Vec<Handle> = handles.into_iter().collect();
        Self::new(move || {
            for handle in &handles {
                handle.destroy();
            }
        })
    }

    /// Run the teardown if it has not run yet.
    pub fn destroy(&self) {
        // Take under the lock, run outside it, so teardown may touch
        // structures that hand out further handles.
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether `destroy` has already run.
    pub fn is_destroyed(&self) -> bool {
        self.teardown.lock().is_none()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
