//! # tether
//!
//! A synchronous cross-realm call bridge: proxy callables that let code in
//! one isolated execution context invoke a callable owned by another,
//! mutually distrusting context — without leaking object references, error
//! state, or caller identity across the boundary.
//!
//! ## Core Concepts
//!
//! - **Realm**: an isolated execution context with its own identity,
//!   registered with a [`Switchboard`].
//! - **Bridge**: a proxy callable homed in one realm, holding the single
//!   strong reference that keeps its foreign target alive.
//! - **Wrap protocol**: primitives cross unchanged, callables cross by
//!   proxy, composites do not cross.
//! - **Sanitization**: every target-realm fault surfaces to the caller as
//!   one opaque, payload-free error.
//!
//! The execution engine and the reachability tracer are collaborators
//! behind the [`Engine`] and [`Tracer`] traits; [`StackEngine`] and the
//! tracers in [`trace`] are reference implementations.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tether::{Callable, StackEngine, Switchboard, Value};
//!
//! let board = Switchboard::new(Arc::new(StackEngine::new()));
//! let caller = board.spawn_realm("caller");
//! let sandbox = board.spawn_realm("sandbox");
//!
//! let increment = Callable::direct(sandbox, |args| match args {
//!     [Value::Number(n)] => Ok(Value::Number(n + 1.0)),
//!     _ => Err(tether::Fault::new("expected one number")),
//! });
//!
//! let bridge = board.create(caller, increment).unwrap();
//! let result = board
//!     .call(caller, &tether::Callable::Bridged(bridge), &[Value::Number(5.0)])
//!     .unwrap();
//! assert_eq!(result, Value::Number(6.0));
//! ```

pub mod bridge;
pub mod callable;
pub mod dispatch;
pub mod engine;
pub mod realm;
pub mod switchboard;
pub mod trace;
pub mod value;
pub mod wrap;

pub use bridge::Bridge;
pub use callable::Callable;
pub use callable::CallableKind;
pub use callable::CallableObject;
pub use dispatch::CallError;
pub use engine::CallFrame;
pub use engine::Engine;
pub use engine::Fault;
pub use engine::StackEngine;
pub use realm::RealmId;
pub use switchboard::Switchboard;
pub use trace::BridgeId;
pub use trace::NullTracer;
pub use trace::RecordingTracer;
pub use trace::Tracer;
pub use value::Value;
pub use wrap::WrapError;
pub use wrap::wrap;

#[cfg(test)]
mod tests;
