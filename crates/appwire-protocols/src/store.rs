//! The store capability.

/// A state store addressable by identity.
///
/// Stores are opaque to the registry; consumers downcast or wrap them on
/// their own terms.
pub trait Store: Send + Sync {}
