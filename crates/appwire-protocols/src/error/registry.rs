//! Registry-related errors.
//!
//! The enum is `Clone` because a settled resolution (value or error) is
//! delivered to every caller awaiting that identity through a shared future.
//! Message texts are part of the public contract and must not change.

use thiserror::Error;

use crate::category::Category;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Lookup miss on an identity.
    #[error("Could not find a value for identity '{0}'")]
    NotFound(String),

    /// Reverse lookup miss on a value.
    #[error("Could not identify non-registered value")]
    NotRegistered,

    /// Same-category re-registration of an identity with a different value.
    #[error("A value has already been registered for the given identity ({0})")]
    DuplicateIdentity(String),

    /// The value is already held under a different identity (the existing one).
    #[error("The value has already been registered with a different identity ({0})")]
    ConflictingIdentity(String),

    /// Two categories raced for one identity; the first committer won.
    #[error("Could not add {adding}, already registered as {existing} with identity {id}")]
    Collision {
        adding: Category,
        existing: Category,
        id: String,
    },

    /// Facade misuse: unrecognized category name.
    #[error("No such store: {0}")]
    UnknownCategory(String),

    /// A factory invocation failed.
    #[error("Factory invocation failed: {0}")]
    Factory(String),

    /// The module resolver could not resolve a module identifier.
    #[error("Could not resolve module '{module}': {reason}")]
    Resolve { module: String, reason: String },

    /// A module resolved to an export of the wrong category.
    #[error("Wrong export from module '{module}': expected {expected}")]
    WrongExport { module: String, expected: Category },

    /// An action rejected its configuration payload.
    #[error("Could not configure action: {0}")]
    Configure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RegistryError::NotFound("foo".to_string());
        assert_eq!(err.to_string(), "Could not find a value for identity 'foo'");
    }

    #[test]
    fn test_not_registered_message() {
        assert_eq!(
            RegistryError::NotRegistered.to_string(),
            "Could not identify non-registered value"
        );
    }

    #[test]
    fn test_duplicate_identity_message() {
        let err = RegistryError::DuplicateIdentity("foo".to_string());
        assert_eq!(
            err.to_string(),
            "A value has already been registered for the given identity (foo)"
        );
    }

    #[test]
    fn test_conflicting_identity_message() {
        let err = RegistryError::ConflictingIdentity("bar".to_string());
        assert_eq!(
            err.to_string(),
            "The value has already been registered with a different identity (bar)"
        );
    }

    #[test]
    fn test_collision_message() {
        let err = RegistryError::Collision {
            adding: Category::Store,
            existing: Category::Action,
            id: "foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not add store, already registered as action with identity foo"
        );
    }

    #[test]
    fn test_unknown_category_message() {
        let err = RegistryError::UnknownCategory("nonsense".to_string());
        assert_eq!(err.to_string(), "No such store: nonsense");
    }

    #[test]
    fn test_resolve_message() {
        let err = RegistryError::Resolve {
            module: "app/actions/save".to_string(),
            reason: "module not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not resolve module 'app/actions/save': module not found"
        );
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = RegistryError::Factory("boom".to_string());
        let clone = err.clone();
        assert_eq!(err.to_string(), clone.to_string());
    }
}
