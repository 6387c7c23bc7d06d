//! # Switchboard
//!
//! The construction and lifecycle authority. Registers realms, resolves
//! per-realm construction templates, allocates bridges, and routes calls so
//! that invoking a bridge is indistinguishable from invoking a local
//! callable.
//!
//! Registries use DashMap and atomic counters so one switchboard may be
//! shared across threads, though any single call always runs synchronously
//! on the calling thread's stack.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tracing::debug;

use crate::bridge::Bridge;
use crate::callable::Callable;
use crate::dispatch;
use crate::dispatch::CallError;
use crate::engine::CallFrame;
use crate::engine::Engine;
use crate::realm::BridgeTemplate;
use crate::realm::Realm;
use crate::realm::RealmId;
use crate::realm::TemplateId;
use crate::trace::BridgeId;
use crate::trace::NullTracer;
use crate::trace::Tracer;
use crate::value::Value;

/// Construction failures.
#[derive(Debug, Clone)]
pub enum Error {
    /// The home/destination realm is not registered with this switchboard.
    RealmNotFound(RealmId),
    /// The target already belongs to the requested home realm; there is no
    /// boundary to bridge.
    TargetInHomeRealm(RealmId),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RealmNotFound(id) => write!(f, "Realm not found: {}", id),
            Self::TargetInHomeRealm(id) => {
                write!(f, "target callable already belongs to {}", id)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// The central authority for realms and bridges.
///
/// Owns:
/// - the realm registry (and, through each realm record, the lazily
///   populated per-realm bridge template),
/// - the engine and tracer collaborators,
/// - identity minting for realms, bridges, and templates.
///
/// Deliberately does *not* own bridges: a bridge lives exactly as long as
/// references to it do, per the reclamation contract.
pub struct Switchboard {
    realms: DashMap<RealmId, Arc<Realm>>,
    engine: Arc<dyn Engine>,
    tracer: Arc<dyn Tracer>,
    next_realm_id: AtomicU64,
    next_bridge_id: AtomicU64,
    next_template_id: AtomicU64,
}

impl Switchboard {
    /// A switchboard with the given engine and no tracer observation.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_tracer(engine, Arc::new(NullTracer))
    }

    /// A switchboard whose bridge lifecycle is observed by `tracer`.
    pub fn with_tracer(engine: Arc<dyn Engine>, tracer: Arc<dyn Tracer>) -> Self {
        Self {
            realms: DashMap::new(),
            engine,
            tracer,
            next_realm_id: AtomicU64::new(1),
            next_bridge_id: AtomicU64::new(1),
            next_template_id: AtomicU64::new(1),
        }
    }

    /// The engine collaborator.
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Registers a new realm and returns its identity.
    pub fn spawn_realm(&self, name: &str) -> RealmId {
        let id = RealmId::new(self.next_realm_id.fetch_add(1, Ordering::Relaxed));
        self.realms.insert(id, Arc::new(Realm::new(id, name)));
        debug!(realm = %id, name, "realm registered");
        id
    }

    /// Retrieves a realm record by identity.
    pub fn realm(&self, id: RealmId) -> Result<Arc<Realm>> {
        self.realms
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::RealmNotFound(id))
    }

    /// Creates a bridge homed in `home` whose target is `target`.
    ///
    /// A bridged target is unwrapped to its true target first; bridges are
    /// never chained. Fails if `home` is unregistered or if the (unwrapped)
    /// target already belongs to `home`.
    pub fn create(&self, home: RealmId, target: Callable) -> Result<Arc<Bridge>> {
        let target = match target {
            Callable::Bridged(b) => b.target().clone(),
            other => other,
        };
        if target.realm() == home {
            return Err(Error::TargetInHomeRealm(home));
        }
        self.alloc_bridge(home, target)
    }

    /// True if the value is a bridge. Pure predicate; reveals nothing about
    /// the wrapped target.
    pub fn is_bridge(value: &Value) -> bool {
        matches!(value, Value::Callable(Callable::Bridged(_)))
    }

    /// Invokes any callable on behalf of `caller`.
    ///
    /// Local callables run directly in the caller's realm and surface their
    /// own faults. Bridges dispatch into their target realm under the full
    /// wrap/sanitize protocol. The result signature is identical either
    /// way, which is what makes a bridge indistinguishable at call sites.
    pub fn call(
        &self,
        caller: RealmId,
        callee: &Callable,
        args: &[Value],
    ) -> dispatch::Result<Value> {
        match callee {
            Callable::Bridged(bridge) => dispatch::invoke_bridge(self, caller, bridge, args),
            local => {
                let capacity = self.engine.argument_capacity();
                if args.len() > capacity {
                    return Err(CallError::ArgumentBudget {
                        supplied: args.len(),
                        capacity,
                    });
                }
                let frame = CallFrame {
                    realm: local.realm(),
                    callee: local,
                    receiver: &Value::Absent,
                    args,
                };
                self.engine.enter(frame).map_err(CallError::Local)
            }
        }
    }

    /// Allocates a bridge for an already-unwrapped, already-foreign target.
    ///
    /// Shared by [`create`](Self::create) and the wrap protocol; both have
    /// validated the target before calling. The only failure left is an
    /// unresolved home realm.
    pub(crate) fn alloc_bridge(&self, home: RealmId, target: Callable) -> Result<Arc<Bridge>> {
        let realm = self.realm(home)?;
        let template = realm.template(|| {
            let template_id = TemplateId(self.next_template_id.fetch_add(1, Ordering::Relaxed));
            debug!(realm = %home, template = %template_id, "bridge template minted");
            BridgeTemplate::new(template_id, home)
        });

        let id = BridgeId(self.next_bridge_id.fetch_add(1, Ordering::Relaxed));
        debug!(bridge = %id, %home, target = %target.realm(), kind = ?target.kind(), "bridge constructed");
        Ok(Bridge::new(id, home, target, template, self.tracer.clone()))
    }
}
