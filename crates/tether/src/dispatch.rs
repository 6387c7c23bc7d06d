//! # Call Dispatch
//!
//! Executes one invocation of a bridge's target on behalf of a caller in
//! the bridge's home realm. One path serves both callable shapes; the shape
//! only matters to the engine when it enters the frame.
//!
//! ## Invariants
//!
//! - The argument budget is enforced before any wrapping or invocation.
//! - A wrap failure aborts the call; no partial argument set reaches the
//!   target.
//! - The receiver handed to the target is always absent; caller identity
//!   never crosses the boundary.
//! - A fault raised by the target, of any kind and from any depth, is
//!   discarded whole and surfaces as the payload-free [`CallError::Remote`].
//!   Nothing here stores, logs, or forwards the fault's contents.

use tracing::trace;

use crate::bridge::Bridge;
use crate::engine::CallFrame;
use crate::engine::Fault;
use crate::realm::RealmId;
use crate::switchboard::Switchboard;
use crate::value::Value;
use crate::wrap::WrapError;
use crate::wrap::wrap;

/// Failures observable by the caller of a bridged (or switched) call.
#[derive(Debug, Clone)]
pub enum CallError {
    /// An argument or the result was neither primitive nor callable.
    NotTransferable { kind: &'static str },
    /// The call carried more arguments than the engine's capacity allows.
    /// Raised before the target is invoked.
    ArgumentBudget { supplied: usize, capacity: usize },
    /// A realm involved in the call is not registered with this switchboard.
    UnresolvedRealm(RealmId),
    /// The target realm faulted. The original failure's payload has been
    /// discarded and cannot be recovered from this error.
    Remote,
    /// A callable in the caller's own realm faulted. No boundary was
    /// crossed, so the fault is the caller's to see.
    Local(Fault),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotTransferable { kind } => write!(
                f,
                "value passing between realms must be callable or primitive (got {})",
                kind
            ),
            Self::ArgumentBudget { supplied, capacity } => write!(
                f,
                "call carries {} arguments, engine capacity is {}",
                supplied, capacity
            ),
            Self::UnresolvedRealm(id) => {
                write!(f, "realm not registered with this switchboard: {}", id)
            }
            Self::Remote => write!(f, "an error occurred in remote realm"),
            Self::Local(fault) => write!(f, "local callable faulted: {}", fault),
        }
    }
}

impl std::error::Error for CallError {}

impl From<WrapError> for CallError {
    fn from(e: WrapError) -> Self {
        match e {
            WrapError::NotTransferable { kind } => Self::NotTransferable { kind },
            WrapError::UnresolvedRealm(id) => Self::UnresolvedRealm(id),
        }
    }
}

pub type Result<T> = std::result::Result<T, CallError>;

/// Runs one bridged invocation: budget, wrap arguments, enter the target
/// realm, sanitize faults, wrap the result.
pub(crate) fn invoke_bridge(
    board: &Switchboard,
    caller: RealmId,
    bridge: &Bridge,
    args: &[Value],
) -> Result<Value> {
    let target_realm = bridge.target_realm();
    trace!(bridge = %bridge.id(), %caller, target = %target_realm, argc = args.len(), "bridged call");

    // Budget first: over-long calls never allocate wrappers or reach the
    // target.
    let capacity = board.engine().argument_capacity();
    if args.len() > capacity {
        return Err(CallError::ArgumentBudget {
            supplied: args.len(),
            capacity,
        });
    }

    let mut wrapped = Vec::with_capacity(args.len());
    for arg in args {
        wrapped.push(wrap(board, caller, target_realm, arg)?);
    }

    let frame = CallFrame {
        realm: target_realm,
        callee: bridge.target(),
        receiver: &Value::Absent,
        args: &wrapped,
    };

    let result = match board.engine().enter(frame) {
        Ok(value) => value,
        // The sanitization cut: the fault is dropped here, payload and all.
        Err(_) => {
            trace!(bridge = %bridge.id(), "target realm faulted; surfacing opaque remote error");
            return Err(CallError::Remote);
        }
    };

    // The call succeeded on the target side; a non-transferable result is
    // still a caller-visible failure, with no partial value.
    let returned = wrap(board, target_realm, caller, &result)?;
    trace!(bridge = %bridge.id(), "bridged call complete");
    Ok(returned)
}
