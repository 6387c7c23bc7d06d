//! # Execution Engine Abstraction
//!
//! The engine is the collaborator that actually runs a callable inside its
//! realm: it owns call-frame entry, the argument-count budget, and the
//! failure scope of one invocation. The bridge core never executes realm
//! code itself; it hands the engine a frame and interprets the outcome.
//!
//! ## Philosophy
//!
//! - **Synchronous and reentrant**: entering a frame runs the callee to
//!   completion on the current stack. No suspension, no I/O.
//! - **Faults stay inside**: a [`Fault`] carries whatever the faulting realm
//!   put in it. It is only meaningful on the side that raised it; dispatch
//!   discards it whole at the trust boundary.

use std::fmt;

use crate::callable::Callable;
use crate::realm::RealmId;
use crate::value::Value;

/// A failure raised while realm code was executing.
///
/// The payload is host-defined free text. A fault never crosses a realm
/// boundary intact.
#[derive(Debug, Clone)]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The payload, visible only within the realm that raised it.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Fault {}

/// One call frame, borrowed for the duration of `enter`.
///
/// # invariants
/// - `callee` is never bridged: dispatch resolves bridges before building
///   the frame.
/// - `realm` is the callee's own realm.
pub struct CallFrame<'a> {
    /// The realm the call executes in.
    pub realm: RealmId,
    /// The callable to run. Never `Callable::Bridged`.
    pub callee: &'a Callable,
    /// The receiver of the call. Dispatch always passes [`Value::Absent`]
    /// here; only local callers may supply an identity.
    pub receiver: &'a Value,
    /// The argument list, already within the engine's capacity.
    pub args: &'a [Value],
}

/// A mechanism to execute one call frame inside a realm.
///
/// This trait is designed to be object-safe (`Arc<dyn Engine>`).
pub trait Engine: Send + Sync + 'static {
    /// The maximum argument count one frame may carry.
    fn argument_capacity(&self) -> usize;

    /// Runs the frame's callee to completion and returns its result.
    fn enter(&self, frame: CallFrame<'_>) -> Result<Value, Fault>;
}

/// Default argument capacity of [`StackEngine`].
pub const DEFAULT_ARGUMENT_CAPACITY: usize = 64;

/// A reference engine: plain nested calls on the host stack.
///
/// Suitable for hosts whose callables are Rust closures and objects, and for
/// the test suite. Real interpreters supply their own `Engine`.
pub struct StackEngine {
    capacity: usize,
}

impl StackEngine {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_ARGUMENT_CAPACITY,
        }
    }

    /// An engine with a custom argument capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for StackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for StackEngine {
    fn argument_capacity(&self) -> usize {
        self.capacity
    }

    fn enter(&self, frame: CallFrame<'_>) -> Result<Value, Fault> {
        match frame.callee {
            Callable::Direct(f) => f.body()(frame.args),
            Callable::Object(o) => o.apply(frame.receiver, frame.args),
            // Dispatch resolves bridges before entering; reaching this arm
            // means the caller built the frame by hand.
            Callable::Bridged(_) => Err(Fault::new("cannot enter a bridge as a frame callee")),
        }
    }
}
