//! # Value Wrap/Unwrap Protocol
//!
//! Decides, for any value crossing a realm boundary, whether it passes
//! through unchanged, gets proxied, or is rejected. The protocol is
//! directional and runs once per argument (caller → target realm) and once
//! for the result (target → caller realm).
//!
//! ## Invariants
//!
//! - Primitives pass through unchanged, with no allocation.
//! - Wrapping is idempotent per realm pair: an existing bridge is unwrapped
//!   to its true target before re-targeting, so no chain of depth > 1 can
//!   ever be built.
//! - A callable never gets bridged into its own realm; it is returned
//!   directly instead (a bridge homed in its target's realm would violate
//!   the home ≠ target invariant).

use tracing::trace;

use crate::callable::Callable;
use crate::realm::RealmId;
use crate::switchboard::Switchboard;
use crate::value::Value;

/// Failures of the wrap protocol.
#[derive(Debug, Clone)]
pub enum WrapError {
    /// The value is a composite reference value: neither primitive nor
    /// callable, so it may not cross the boundary.
    NotTransferable { kind: &'static str },
    /// The destination realm is not registered with this switchboard.
    UnresolvedRealm(RealmId),
}

impl std::fmt::Display for WrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotTransferable { kind } => write!(
                f,
                "value passing between realms must be callable or primitive (got {})",
                kind
            ),
            Self::UnresolvedRealm(id) => {
                write!(f, "destination realm not registered: {}", id)
            }
        }
    }
}

impl std::error::Error for WrapError {}

pub type Result<T> = std::result::Result<T, WrapError>;

/// Wraps `value` for transfer from `caller` into `target_realm`.
///
/// `caller` identifies the side the value is leaving; it never influences
/// the wrapped result and exists so boundary crossings are explicit and
/// auditable at call sites.
pub fn wrap(
    board: &Switchboard,
    caller: RealmId,
    target_realm: RealmId,
    value: &Value,
) -> Result<Value> {
    debug_assert_ne!(caller, target_realm);
    // Shape only; a value's contents never reach the log stream.
    trace!(%caller, target = %target_realm, kind = value.kind_name(), "wrap");

    if value.is_primitive() {
        return Ok(value.clone());
    }

    match value {
        Value::Callable(callable) => {
            // Unwrap first: re-bridging a bridge targets its true target.
            let inner = callable.unbridged();
            if inner.realm() == target_realm {
                return Ok(Value::Callable(inner.clone()));
            }
            let bridge = board
                .alloc_bridge(target_realm, inner.clone())
                .map_err(|_| WrapError::UnresolvedRealm(target_realm))?;
            Ok(Value::Callable(Callable::Bridged(bridge)))
        }
        other => Err(WrapError::NotTransferable {
            kind: other.kind_name(),
        }),
    }
}
