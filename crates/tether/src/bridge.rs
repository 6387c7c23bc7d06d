//! # The Bridge Object
//!
//! A bridge is the proxy callable that brokers calls from its home realm
//! into a callable owned by another realm. It is immutable after
//! construction and holds the only strong reference keeping its target
//! reachable from the home realm's side.
//!
//! ## Invariants
//!
//! - Home realm and target realm always differ.
//! - The target is never itself a bridge (no chains of depth > 1).
//! - The target holds no reference back to the bridge.
//! - Two bridges are never merged; every construction has its own identity.

use std::sync::Arc;

use crate::callable::Callable;
use crate::callable::CallableKind;
use crate::realm::BridgeTemplate;
use crate::realm::RealmId;
use crate::trace::BridgeId;
use crate::trace::TraceGuard;
use crate::trace::Tracer;

/// A proxy callable into another realm.
///
/// Constructed only by the [`Switchboard`](crate::switchboard::Switchboard);
/// invoked through `Switchboard::call` like any other callable.
pub struct Bridge {
    id: BridgeId,
    home: RealmId,
    target: Callable,
    target_realm: RealmId,
    target_kind: CallableKind,
    template: Arc<BridgeTemplate>,
    _trace: TraceGuard,
}

impl Bridge {
    /// Allocates a bridge and registers its trace guard.
    ///
    /// Callers have already unwrapped `target` and checked that its realm
    /// differs from `home`.
    pub(crate) fn new(
        id: BridgeId,
        home: RealmId,
        target: Callable,
        template: Arc<BridgeTemplate>,
        tracer: Arc<dyn Tracer>,
    ) -> Arc<Self> {
        debug_assert!(!target.is_bridged());
        debug_assert_ne!(home, target.realm());

        let target_realm = target.realm();
        let target_kind = target.kind();
        let guard = TraceGuard::register(id, home, target_realm, tracer);

        Arc::new(Self {
            id,
            home,
            target,
            target_realm,
            target_kind,
            template,
            _trace: guard,
        })
    }

    /// This bridge's identity.
    pub fn id(&self) -> BridgeId {
        self.id
    }

    /// The realm the bridge belongs to and is callable from.
    pub fn home_realm(&self) -> RealmId {
        self.home
    }

    /// The realm the target callable belongs to.
    pub fn target_realm(&self) -> RealmId {
        self.target_realm
    }

    /// The underlying target callable. Never bridged.
    pub fn target(&self) -> &Callable {
        &self.target
    }

    /// The target's executable shape, recorded at construction.
    pub fn kind(&self) -> CallableKind {
        self.target_kind
    }

    /// The construction template of the home realm.
    pub fn template(&self) -> &Arc<BridgeTemplate> {
        &self.template
    }
}

// Shallow on purpose: never prints the target's contents.
impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("id", &self.id)
            .field("home", &self.home)
            .field("target_realm", &self.target_realm)
            .field("kind", &self.target_kind)
            .finish()
    }
}
