//! # The Callable Capability
//!
//! A callable is either a directly invocable host function, a generic
//! callable object, or a bridge into another realm. The variant is fixed
//! when the callable is built; dispatch never re-derives policy from it.
//!
//! ## Invariants
//!
//! - Every callable belongs to exactly one realm.
//! - Equality is identity: two callables are equal only if they are the same
//!   allocation. Behavioral equivalence is never inspected.

use std::sync::Arc;

use crate::bridge::Bridge;
use crate::engine::Fault;
use crate::realm::RealmId;
use crate::value::Value;

/// The body of a directly invocable function.
pub type DirectBody = dyn Fn(&[Value]) -> Result<Value, Fault> + Send + Sync;

/// The two executable shapes a callable can have.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallableKind {
    /// A plain function: receives arguments only.
    DirectFunction,
    /// A callable object: receives a receiver and arguments.
    GenericCallable,
}

/// A directly invocable function owned by a realm.
pub struct DirectFn {
    realm: RealmId,
    body: Box<DirectBody>,
}

impl DirectFn {
    /// The realm this function belongs to.
    pub fn realm(&self) -> RealmId {
        self.realm
    }

    pub(crate) fn body(&self) -> &DirectBody {
        &*self.body
    }
}

/// A generic callable object.
///
/// Object-safe so it can live behind `Arc<dyn CallableObject>`. Unlike a
/// direct function, a callable object is handed the receiver of the call.
pub trait CallableObject: Send + Sync + 'static {
    /// The realm this object belongs to.
    fn realm(&self) -> RealmId;

    /// Applies the object to the given receiver and arguments.
    fn apply(&self, receiver: &Value, args: &[Value]) -> Result<Value, Fault>;
}

/// A value satisfying the callable capability.
#[derive(Clone)]
pub enum Callable {
    /// A directly invocable function.
    Direct(Arc<DirectFn>),
    /// A generic callable object.
    Object(Arc<dyn CallableObject>),
    /// A cross-realm bridge. Calling it dispatches into its target realm.
    Bridged(Arc<Bridge>),
}

impl Callable {
    /// Builds a direct function owned by `realm`.
    pub fn direct(
        realm: RealmId,
        body: impl Fn(&[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    ) -> Self {
        Self::Direct(Arc::new(DirectFn {
            realm,
            body: Box::new(body),
        }))
    }

    /// Wraps a callable object.
    pub fn object(obj: Arc<dyn CallableObject>) -> Self {
        Self::Object(obj)
    }

    /// The realm this callable belongs to. For a bridge, its home realm.
    pub fn realm(&self) -> RealmId {
        match self {
            Self::Direct(f) => f.realm(),
            Self::Object(o) => o.realm(),
            Self::Bridged(b) => b.home_realm(),
        }
    }

    /// The executable shape, fixed at construction. For a bridge, the shape
    /// of its underlying target.
    pub fn kind(&self) -> CallableKind {
        match self {
            Self::Direct(_) => CallableKind::DirectFunction,
            Self::Object(_) => CallableKind::GenericCallable,
            Self::Bridged(b) => b.kind(),
        }
    }

    /// True if this callable is a bridge.
    pub fn is_bridged(&self) -> bool {
        matches!(self, Self::Bridged(_))
    }

    /// Resolves through at most one layer of bridging: the underlying target
    /// for a bridge, the callable itself otherwise. Bridges never nest, so
    /// the result is never bridged.
    pub fn unbridged(&self) -> &Callable {
        match self {
            Self::Bridged(b) => b.target(),
            other => other,
        }
    }

    /// Identity comparison: same allocation, not same behavior.
    pub fn same_identity(&self, other: &Callable) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Bridged(a), Self::Bridged(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

// Deliberately shallow: a callable's Debug output names its shape and realm,
// never its captured state.
impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(d) => write!(f, "Callable::Direct({})", d.realm()),
            Self::Object(o) => write!(f, "Callable::Object({})", o.realm()),
            Self::Bridged(b) => write!(f, "Callable::Bridged({})", b.id()),
        }
    }
}
