use std::sync::{PoisonError, RwLock};

use quiz_core::model::Identity;

/// Source of the signed-in learner.
///
/// Services ask for the identity on every call that needs one, so a provider
/// may change its answer between calls (sign-in, sign-out).
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;
}

/// Always the same identity.
#[derive(Debug, Clone)]
pub struct StaticIdentity(Identity);

impl StaticIdentity {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self(identity)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<Identity> {
        Some(self.0.clone())
    }
}

/// Nobody is signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current(&self) -> Option<Identity> {
        None
    }
}

/// Identity that a host application swaps on sign-in and sign-out.
#[derive(Debug, Default)]
pub struct SignedInIdentity {
    inner: RwLock<Option<Identity>>,
}

impl SignedInIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, identity: Identity) {
        self.replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.replace(None);
    }

    // Every write replaces the whole value, so poisoning is ignored.
    fn replace(&self, identity: Option<Identity>) {
        tracing::debug!(signed_in = identity.is_some(), "identity changed");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = identity;
    }
}

impl IdentityProvider for SignedInIdentity {
    fn current(&self) -> Option<Identity> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
