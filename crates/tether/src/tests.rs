//! Tests for the wrap protocol, dispatch, and the switchboard.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::callable::Callable;
use crate::callable::CallableKind;
use crate::callable::CallableObject;
use crate::dispatch::CallError;
use crate::engine::CallFrame;
use crate::engine::Engine;
use crate::engine::Fault;
use crate::engine::StackEngine;
use crate::realm::RealmId;
use crate::switchboard;
use crate::switchboard::Switchboard;
use crate::trace::RecordingTracer;
use crate::value::Value;
use crate::wrap::WrapError;
use crate::wrap::wrap;

struct Fixture {
    board: Arc<Switchboard>,
    tracer: Arc<RecordingTracer>,
    caller: RealmId,
    sandbox: RealmId,
}

fn fixture() -> Fixture {
    fixture_with_capacity(crate::engine::DEFAULT_ARGUMENT_CAPACITY)
}

fn fixture_with_capacity(capacity: usize) -> Fixture {
    let tracer = Arc::new(RecordingTracer::new());
    let board = Arc::new(Switchboard::with_tracer(
        Arc::new(StackEngine::with_capacity(capacity)),
        tracer.clone(),
    ));
    let caller = board.spawn_realm("caller");
    let sandbox = board.spawn_realm("sandbox");
    Fixture {
        board,
        tracer,
        caller,
        sandbox,
    }
}

/// Sandbox-side function returning its single numeric argument plus one.
fn increment(realm: RealmId) -> Callable {
    Callable::direct(realm, |args| match args {
        [Value::Number(n)] => Ok(Value::Number(n + 1.0)),
        _ => Err(Fault::new("expected one number")),
    })
}

// --- Wrap protocol ---

#[test]
fn test_wrap_primitive_identity_no_allocation() {
    let fx = fixture();
    let primitives = [
        Value::Absent,
        Value::Bool(true),
        Value::Number(-0.5),
        Value::text("boundary"),
    ];

    for p in &primitives {
        let wrapped = wrap(&fx.board, fx.caller, fx.sandbox, p).expect("primitive must wrap");
        assert_eq!(&wrapped, p);
    }
    // No bridge was allocated for any primitive.
    assert!(fx.tracer.events().is_empty());
}

#[test]
fn test_wrap_callable_builds_bridge_toward_target_realm() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    let wrapped = wrap(&fx.board, fx.sandbox, fx.caller, &Value::Callable(f.clone()))
        .expect("callable must wrap");

    let Value::Callable(Callable::Bridged(bridge)) = &wrapped else {
        panic!("expected a bridge, got {:?}", wrapped);
    };
    assert_eq!(bridge.home_realm(), fx.caller);
    assert_eq!(bridge.target_realm(), fx.sandbox);
    assert!(bridge.target().same_identity(&f));
    assert_eq!(bridge.kind(), CallableKind::DirectFunction);
}

#[test]
fn test_wrap_bridge_unwraps_to_true_target() {
    let fx = fixture();
    let third = fx.board.spawn_realm("third");
    let f = increment(fx.sandbox);

    let bridge = fx.board.create(fx.caller, f.clone()).unwrap();
    let rewrapped = wrap(
        &fx.board,
        fx.caller,
        third,
        &Value::Callable(Callable::Bridged(bridge)),
    )
    .unwrap();

    let Value::Callable(Callable::Bridged(hop)) = &rewrapped else {
        panic!("expected a bridge");
    };
    // Single hop: the new bridge targets the original function, not the
    // intermediate bridge.
    assert_eq!(hop.home_realm(), third);
    assert_eq!(hop.target_realm(), fx.sandbox);
    assert!(hop.target().same_identity(&f));
    assert!(!hop.target().is_bridged());
}

#[test]
fn test_wrap_toward_own_realm_returns_target_unchanged() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    // A bridge homed in the caller, re-wrapped toward the target's own
    // realm: the proxy dissolves back to the original callable.
    let bridge = fx.board.create(fx.caller, f.clone()).unwrap();
    let unwrapped = wrap(
        &fx.board,
        fx.caller,
        fx.sandbox,
        &Value::Callable(Callable::Bridged(bridge)),
    )
    .unwrap();

    let Value::Callable(inner) = &unwrapped else {
        panic!("expected a callable");
    };
    assert!(inner.same_identity(&f));
    assert!(!inner.is_bridged());
}

#[test]
fn test_wrap_composite_fails() {
    let fx = fixture();
    let list = Value::List(Arc::new(vec![Value::Number(1.0)]));

    let err = wrap(&fx.board, fx.caller, fx.sandbox, &list).unwrap_err();
    assert!(matches!(err, WrapError::NotTransferable { kind: "list" }));
}

#[test]
fn test_wrap_toward_unregistered_realm_fails() {
    let fx = fixture();
    let f = increment(fx.sandbox);
    let nowhere = RealmId::new(999);

    let err = wrap(&fx.board, fx.sandbox, nowhere, &Value::Callable(f)).unwrap_err();
    assert!(matches!(err, WrapError::UnresolvedRealm(id) if id == nowhere));
}

// --- Construction authority ---

#[test]
fn test_create_unwraps_bridged_target() {
    let fx = fixture();
    let third = fx.board.spawn_realm("third");
    let f = increment(fx.sandbox);

    let first = fx.board.create(fx.caller, f.clone()).unwrap();
    let second = fx
        .board
        .create(third, Callable::Bridged(first))
        .expect("re-bridging must unwrap");

    assert_eq!(second.home_realm(), third);
    assert!(second.target().same_identity(&f));
}

#[test]
fn test_create_rejects_target_in_home_realm() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    let err = fx.board.create(fx.sandbox, f).unwrap_err();
    assert!(matches!(err, switchboard::Error::TargetInHomeRealm(id) if id == fx.sandbox));
}

#[test]
fn test_create_rejects_unregistered_home() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    let err = fx.board.create(RealmId::new(999), f).unwrap_err();
    assert!(matches!(err, switchboard::Error::RealmNotFound(_)));
}

#[test]
fn test_is_bridge_predicate() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    assert!(!Switchboard::is_bridge(&Value::Callable(f.clone())));
    assert!(!Switchboard::is_bridge(&Value::Number(1.0)));

    let bridge = fx.board.create(fx.caller, f).unwrap();
    assert!(Switchboard::is_bridge(&Value::Callable(Callable::Bridged(
        bridge
    ))));
}

#[test]
fn test_each_construction_yields_distinct_identity() {
    let fx = fixture();
    let f = increment(fx.sandbox);

    let a = fx.board.create(fx.caller, f.clone()).unwrap();
    let b = fx.board.create(fx.caller, f).unwrap();

    assert_ne!(a.id(), b.id());
    assert!(!Arc::ptr_eq(&a, &b));
    // Same home, same target: still never merged.
    assert!(a.target().same_identity(b.target()));
}

#[test]
fn test_templates_are_per_realm() {
    let fx = fixture();
    let f = increment(fx.sandbox);
    let g = increment(fx.caller);

    let a = fx.board.create(fx.caller, f.clone()).unwrap();
    let b = fx.board.create(fx.caller, f).unwrap();
    let c = fx.board.create(fx.sandbox, g).unwrap();

    // One realm reuses its template; two realms never share one.
    assert!(Arc::ptr_eq(a.template(), b.template()));
    assert!(!Arc::ptr_eq(a.template(), c.template()));
    assert_eq!(a.template().realm(), fx.caller);
    assert_eq!(c.template().realm(), fx.sandbox);
}

// --- Dispatch ---

#[test]
fn test_budget_enforced_before_invocation() {
    let fx = fixture_with_capacity(4);
    let entered = Arc::new(AtomicBool::new(false));
    let entered_flag = entered.clone();
    let f = Callable::direct(fx.sandbox, move |_| {
        entered_flag.store(true, Ordering::SeqCst);
        Ok(Value::Absent)
    });

    let bridge = fx.board.create(fx.caller, f).unwrap();
    let args = vec![Value::Number(0.0); 5];
    let err = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &args)
        .unwrap_err();

    assert!(matches!(
        err,
        CallError::ArgumentBudget {
            supplied: 5,
            capacity: 4,
        }
    ));
    assert!(!entered.load(Ordering::SeqCst), "target must not run");
}

#[test]
fn test_nontransferable_argument_aborts_before_invocation() {
    let fx = fixture();
    let entered = Arc::new(AtomicBool::new(false));
    let entered_flag = entered.clone();
    let f = Callable::direct(fx.sandbox, move |_| {
        entered_flag.store(true, Ordering::SeqCst);
        Ok(Value::Absent)
    });

    let bridge = fx.board.create(fx.caller, f).unwrap();
    let list = Value::List(Arc::new(vec![]));
    let err = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &[list])
        .unwrap_err();

    assert!(matches!(err, CallError::NotTransferable { .. }));
    assert!(!entered.load(Ordering::SeqCst), "target must not run");
}

#[test]
fn test_fault_surfaces_as_opaque_remote_error() {
    let fx = fixture();
    let f = Callable::direct(fx.sandbox, |_| {
        Err(Fault::new("sandbox secret: the vault code is 1234"))
    });

    let bridge = fx.board.create(fx.caller, f).unwrap();
    let err = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &[])
        .unwrap_err();

    assert!(matches!(err, CallError::Remote));
    let visible = format!("{} / {:?}", err, err);
    assert!(!visible.contains("vault"));
    assert!(!visible.contains("1234"));
}

#[test]
fn test_fault_from_nested_depth_is_still_one_remote_error() {
    let fx = fixture();
    let deep = Callable::direct(fx.sandbox, |_| Err(Fault::new("deep failure detail")));

    let board = fx.board.clone();
    let sandbox = fx.sandbox;
    let outer = Callable::direct(fx.sandbox, move |_| {
        // A same-realm nested call; its fault propagates locally, then
        // crosses the boundary exactly once.
        match board.call(sandbox, &deep, &[]) {
            Err(CallError::Local(fault)) => Err(fault),
            other => Err(Fault::new(format!("unexpected nested outcome: {:?}", other))),
        }
    });

    let bridge = fx.board.create(fx.caller, outer).unwrap();
    let err = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &[])
        .unwrap_err();

    assert!(matches!(err, CallError::Remote));
    assert!(!format!("{}", err).contains("deep failure"));
}

#[test]
fn test_local_call_surfaces_own_fault() {
    let fx = fixture();
    let f = Callable::direct(fx.caller, |_| Err(Fault::new("caller-side detail")));

    let err = fx.board.call(fx.caller, &f, &[]).unwrap_err();
    let CallError::Local(fault) = err else {
        panic!("expected a local fault");
    };
    // No boundary crossed: the caller sees its own realm's payload.
    assert_eq!(fault.message(), "caller-side detail");
}

#[test]
fn test_nontransferable_result_fails_after_successful_call() {
    let fx = fixture();
    let ran = Arc::new(AtomicBool::new(false));
    let ran_flag = ran.clone();
    let f = Callable::direct(fx.sandbox, move |_| {
        ran_flag.store(true, Ordering::SeqCst);
        Ok(Value::List(Arc::new(vec![Value::Number(1.0)])))
    });

    let bridge = fx.board.create(fx.caller, f).unwrap();
    let err = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &[])
        .unwrap_err();

    assert!(matches!(err, CallError::NotTransferable { kind: "list" }));
    assert!(ran.load(Ordering::SeqCst), "the call itself did succeed");
}

#[test]
fn test_callable_result_comes_back_bridged() {
    let fx = fixture();
    let sandbox = fx.sandbox;
    let f = Callable::direct(fx.sandbox, move |_| Ok(Value::Callable(increment(sandbox))));

    let bridge = fx.board.create(fx.caller, f).unwrap();
    let result = fx
        .board
        .call(fx.caller, &Callable::Bridged(bridge), &[])
        .unwrap();

    let Value::Callable(Callable::Bridged(returned)) = &result else {
        panic!("expected a bridged callable result");
    };
    assert_eq!(returned.home_realm(), fx.caller);
    assert_eq!(returned.target_realm(), fx.sandbox);

    // And the returned bridge is immediately callable from the caller.
    let out = fx
        .board
        .call(
            fx.caller,
            &Callable::Bridged(returned.clone()),
            &[Value::Number(9.0)],
        )
        .unwrap();
    assert_eq!(out, Value::Number(10.0));
}

#[test]
fn test_receiver_identity_never_crosses_the_boundary() {
    struct ReceiverProbe {
        realm: RealmId,
        seen: Mutex<Vec<Value>>,
    }

    impl CallableObject for ReceiverProbe {
        fn realm(&self) -> RealmId {
            self.realm
        }

        fn apply(&self, receiver: &Value, _args: &[Value]) -> Result<Value, Fault> {
            self.seen.lock().unwrap().push(receiver.clone());
            Ok(Value::Absent)
        }
    }

    let fx = fixture();
    let probe = Arc::new(ReceiverProbe {
        realm: fx.sandbox,
        seen: Mutex::new(Vec::new()),
    });
    let callee = Callable::object(probe.clone());

    // A local caller may hand the engine a receiver identity directly.
    fx.board
        .engine()
        .enter(CallFrame {
            realm: fx.sandbox,
            callee: &callee,
            receiver: &Value::text("local identity"),
            args: &[],
        })
        .unwrap();

    // Through a bridge, the receiver is always absent.
    let bridge = fx.board.create(fx.caller, callee).unwrap();
    fx.board
        .call(fx.caller, &Callable::Bridged(bridge), &[])
        .unwrap();

    let seen = probe.seen.lock().unwrap();
    assert_eq!(seen[0], Value::text("local identity"));
    assert_eq!(seen[1], Value::Absent);
}
