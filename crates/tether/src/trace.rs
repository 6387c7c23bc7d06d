//! # Reachability Tracing Hook
//!
//! Integration point with the host's reachability tracer. The keep-alive
//! edge itself is the strong reference a bridge holds to its target; the
//! tracer only observes it. The edge is one-directional by construction:
//! nothing here (or anywhere in this crate) hands the target a reference
//! back to its bridge, so a reachable target never retains a dead bridge.

use std::sync::Arc;
use std::sync::Mutex;

use crate::realm::RealmId;

/// Strong type for bridge identifiers.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct BridgeId(pub(crate) u64);

impl std::fmt::Display for BridgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bridge-{}", self.0)
    }
}

/// Observer of bridge lifecycle events.
///
/// This trait is designed to be object-safe (`Arc<dyn Tracer>`).
///
/// # invariants
/// - `allocated` and `edge` fire exactly once per bridge, at construction.
/// - `released` fires exactly once, when the last reference drops.
pub trait Tracer: Send + Sync + 'static {
    /// A bridge was allocated with the given home realm.
    fn allocated(&self, bridge: BridgeId, home: RealmId);

    /// The bridge's keep-alive edge toward its target realm was established.
    fn edge(&self, bridge: BridgeId, target_realm: RealmId);

    /// The bridge became unreachable and its target edge was severed.
    fn released(&self, bridge: BridgeId);
}

/// A tracer that ignores every event.
pub struct NullTracer;

impl Tracer for NullTracer {
    fn allocated(&self, _bridge: BridgeId, _home: RealmId) {}
    fn edge(&self, _bridge: BridgeId, _target_realm: RealmId) {}
    fn released(&self, _bridge: BridgeId) {}
}

/// A lifecycle event seen by [`RecordingTracer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    Allocated { bridge: BridgeId, home: RealmId },
    Edge { bridge: BridgeId, target_realm: RealmId },
    Released { bridge: BridgeId },
}

/// A tracer that records events, for lifecycle verification.
#[derive(Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of all events seen so far, in order.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of bridges allocated but not yet released.
    pub fn live_count(&self) -> usize {
        let events = self.events.lock().unwrap();
        let allocated = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Allocated { .. }))
            .count();
        let released = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Released { .. }))
            .count();
        allocated - released
    }

    fn push(&self, event: TraceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Tracer for RecordingTracer {
    fn allocated(&self, bridge: BridgeId, home: RealmId) {
        self.push(TraceEvent::Allocated { bridge, home });
    }

    fn edge(&self, bridge: BridgeId, target_realm: RealmId) {
        self.push(TraceEvent::Edge {
            bridge,
            target_realm,
        });
    }

    fn released(&self, bridge: BridgeId) {
        self.push(TraceEvent::Released { bridge });
    }
}

/// Held by every bridge for its lifetime. Registers the allocation and the
/// keep-alive edge on construction, reports the release on drop.
pub(crate) struct TraceGuard {
    id: BridgeId,
    tracer: Arc<dyn Tracer>,
}

impl TraceGuard {
    pub(crate) fn register(
        id: BridgeId,
        home: RealmId,
        target_realm: RealmId,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        tracer.allocated(id, home);
        tracer.edge(id, target_realm);
        Self { id, tracer }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.tracer.released(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_reports_full_lifecycle() {
        let tracer = Arc::new(RecordingTracer::new());
        let home = RealmId::new(1);
        let target = RealmId::new(2);

        let guard = TraceGuard::register(BridgeId(7), home, target, tracer.clone());
        assert_eq!(tracer.live_count(), 1);
        drop(guard);

        assert_eq!(
            tracer.events(),
            vec![
                TraceEvent::Allocated {
                    bridge: BridgeId(7),
                    home,
                },
                TraceEvent::Edge {
                    bridge: BridgeId(7),
                    target_realm: target,
                },
                TraceEvent::Released {
                    bridge: BridgeId(7),
                },
            ]
        );
        assert_eq!(tracer.live_count(), 0);
    }
}
