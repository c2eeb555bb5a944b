//! # Resolution Tests
//!
//! The layer walk and the three lookup views a rule can use.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvconfig_params::{ConfigStack, Key, Layer, ParamError};

use crate::common::{DEPTH, LABEL, SCALED, WIDTH, init_tracing, stack_of, width};

static WIDTH_TWIN: Key<usize> = Key::new("Width");

// ──────────────────────────────────────────────────────────
// Layer walk
// ──────────────────────────────────────────────────────────

/// The outermost supplying layer wins.
#[test]
fn outer_layer_overrides_inner() {
    let stack = width("narrow", 2) + width("wide", 8);
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 2);
}

/// Layers without a rule for the key are skipped.
#[test]
fn walk_skips_layers_without_rule() {
    let stack = stack_of(vec![
        Layer::new("unrelated").set(&DEPTH, 1),
        Layer::new("base").set(&WIDTH, 6),
    ]);
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 6);
}

/// A partial rule that yields nothing falls through to the layers below.
#[rstest]
#[case(None, 7)]
#[case(Some(3), 3)]
fn partial_rule_falls_through(#[case] outcome: Option<usize>, #[case] expected: usize) {
    let stack = stack_of(vec![
        Layer::new("guard").partial(&WIDTH, move |_| Ok(outcome)),
        Layer::new("base").set(&WIDTH, 7),
    ]);
    assert_eq!(stack.resolve(&WIDTH).unwrap(), expected);
}

/// A partial rule can consult the value below before deciding.
#[test]
fn partial_rule_guards_on_value_below() {
    let clamp = Layer::new("clamp").partial(&WIDTH, |cx| {
        let below = cx.up(&WIDTH)?;
        Ok((below > 4).then_some(4))
    });
    let wide = stack_of(vec![clamp.clone(), Layer::new("base").set(&WIDTH, 8)]);
    let narrow = stack_of(vec![clamp, Layer::new("base").set(&WIDTH, 2)]);
    assert_eq!(wide.resolve(&WIDTH).unwrap(), 4);
    assert_eq!(narrow.resolve(&WIDTH).unwrap(), 2);
}

// ──────────────────────────────────────────────────────────
// Lookup views
// ──────────────────────────────────────────────────────────

/// `up` continues below the calling layer, not from the top.
#[test]
fn up_is_scoped_below_caller() {
    let stack = stack_of(vec![
        Layer::new("double").derive(&WIDTH, |cx| Ok(cx.up(&WIDTH)? * 2)),
        Layer::new("increment").derive(&WIDTH, |cx| Ok(cx.up(&WIDTH)? + 1)),
        Layer::new("base").set(&WIDTH, 3),
    ]);
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 8);
}

/// `here` starts at the caller's own layer; `site` sees the layers above it.
#[test]
fn here_ignores_layers_above() {
    let stack = stack_of(vec![
        Layer::new("override").set(&WIDTH, 9),
        Layer::new("local")
            .set(&WIDTH, 5)
            .derive(&DEPTH, |cx| Ok(cx.here(&WIDTH)? * 10 + cx.site(&WIDTH)?)),
    ]);
    assert_eq!(stack.resolve(&DEPTH).unwrap(), 59);
}

/// `site` may reference a value supplied by a layer added later on top.
#[test]
fn site_sees_forward_reference() {
    let base = ConfigStack::from(
        Layer::new("base")
            .set(&WIDTH, 4)
            .derive(&DEPTH, |cx| Ok(cx.site(&WIDTH)? + 1)),
    );
    assert_eq!(base.resolve(&DEPTH).unwrap(), 5);

    let widened = width("wide", 10) + base;
    assert_eq!(widened.resolve(&DEPTH).unwrap(), 11);
}

/// `up_opt` reports an unsupplied key as `None`.
#[test]
fn up_opt_reports_absence() {
    let stack = ConfigStack::from(
        Layer::new("top").derive(&WIDTH, |cx| Ok(cx.up_opt(&WIDTH)?.unwrap_or(42))),
    );
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 42);
}

/// `up_opt` still propagates a missing dependency of a rule below.
#[test]
fn up_opt_propagates_other_missing_keys() {
    let stack = stack_of(vec![
        Layer::new("top").derive(&WIDTH, |cx| Ok(cx.up_opt(&WIDTH)?.unwrap_or(42))),
        Layer::new("base").derive(&WIDTH, |cx| cx.site(&DEPTH)),
    ]);
    let err = stack.resolve(&WIDTH).unwrap_err();
    assert!(err.is_missing(&DEPTH));
}

/// A missing key that merely shares the name is not treated as absence of the key itself.
#[test]
fn up_opt_distinguishes_keys_by_identity() {
    let stack = stack_of(vec![
        Layer::new("top").derive(&WIDTH, |cx| Ok(cx.up_opt(&WIDTH)?.unwrap_or(42))),
        Layer::new("base").derive(&WIDTH, |cx| cx.site(&WIDTH_TWIN)),
    ]);
    let err = stack.resolve(&WIDTH).unwrap_err();
    assert!(err.is_missing(&WIDTH_TWIN));
    assert!(!err.is_missing(&WIDTH));
}

// ──────────────────────────────────────────────────────────
// Defaults and missing keys
// ──────────────────────────────────────────────────────────

/// A key default runs when no layer supplies the key and sees the whole stack.
#[test]
fn default_rule_uses_site_view() {
    let stack = width("base", 4);
    assert_eq!(stack.resolve(&SCALED).unwrap(), 8);

    let overridden = ConfigStack::from(Layer::new("fixed").set(&SCALED, 3)) + stack;
    assert_eq!(overridden.resolve(&SCALED).unwrap(), 3);
}

/// `up` from the innermost layer reaches the key default.
#[test]
fn up_from_innermost_reaches_default() {
    let stack = stack_of(vec![
        Layer::new("plus-one").derive(&SCALED, |cx| Ok(cx.up(&SCALED)? + 1)),
        Layer::new("base").set(&WIDTH, 5),
    ]);
    assert_eq!(stack.resolve(&SCALED).unwrap(), 11);
}

/// A missing key names both the key and the stack.
#[test]
fn missing_key_names_key_and_stack() {
    let stack = width("base", 4).named("sample");
    let err = stack.resolve(&DEPTH).unwrap_err();
    assert!(matches!(
        err,
        ParamError::Missing { key: "Depth", ref stack, .. } if stack == "sample"
    ));
    assert_eq!(err.to_string(), "missing parameter 'Depth' in stack 'sample'");
}

// ──────────────────────────────────────────────────────────
// Cycles and memoization
// ──────────────────────────────────────────────────────────

/// A rule that reads its own key through `site` is a cycle.
#[test]
fn self_reference_through_site_is_cycle() {
    init_tracing();
    let stack = ConfigStack::from(Layer::new("loop").derive(&WIDTH, |cx| cx.site(&WIDTH)));
    match stack.resolve(&WIDTH) {
        Err(ParamError::Cycle { path, .. }) => assert_eq!(path, vec!["Width@0", "Width@0"]),
        other => panic!("expected cycle, got {other:?}"),
    }
}

/// Cycles through several keys report every step.
#[test]
fn mutual_reference_is_cycle() {
    let stack = ConfigStack::from(
        Layer::new("loop")
            .derive(&WIDTH, |cx| cx.site(&DEPTH))
            .derive(&DEPTH, |cx| cx.site(&WIDTH)),
    );
    match stack.resolve(&WIDTH) {
        Err(ParamError::Cycle { path, .. }) => {
            assert_eq!(path, vec!["Width@0", "Depth@0", "Width@0"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

/// A cycle aborts the whole pass; later lookups report the same cycle.
#[test]
fn cycle_aborts_pass() {
    let stack = ConfigStack::from(
        Layer::new("mixed")
            .derive(&WIDTH, |cx| cx.site(&WIDTH))
            .set(&DEPTH, 3),
    );
    let mut pass = stack.pass();
    assert!(matches!(pass.get(&WIDTH), Err(ParamError::Cycle { .. })));
    assert!(pass.is_aborted());
    match pass.get(&DEPTH) {
        Err(ParamError::Cycle { path, .. }) => assert_eq!(path, vec!["Width@0", "Width@0"]),
        other => panic!("expected cycle, got {other:?}"),
    }

    // A fresh pass is unaffected.
    assert_eq!(stack.resolve(&DEPTH).unwrap(), 3);
}

/// Rules that discard a cycle error still fail, whichever key is requested first.
#[rstest]
#[case::width_first(true)]
#[case::depth_first(false)]
fn swallowed_cycle_still_fails(#[case] width_first: bool) {
    let stack = ConfigStack::from(
        Layer::new("tangled")
            .derive(&WIDTH, |cx| Ok(cx.site(&DEPTH).unwrap_or(0) + 1))
            .derive(&DEPTH, |cx| Ok(cx.site(&WIDTH).unwrap_or(100))),
    );
    let order: [&'static dyn rvconfig_params::params::AnyKey; 2] = if width_first {
        [&WIDTH, &DEPTH]
    } else {
        [&DEPTH, &WIDTH]
    };
    assert!(matches!(stack.view(&order), Err(ParamError::Cycle { .. })));
    assert!(matches!(stack.resolve(&WIDTH), Err(ParamError::Cycle { .. })));
    assert!(matches!(stack.resolve(&DEPTH), Err(ParamError::Cycle { .. })));
}

/// Rules run once per pass and again in a fresh pass.
#[test]
fn results_are_memoized_per_pass() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let stack = ConfigStack::from(Layer::new("counted").derive(&LABEL, move |_| {
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        Ok("counted".to_string())
    }));

    let mut pass = stack.pass();
    assert_eq!(pass.get(&LABEL).unwrap(), "counted");
    assert_eq!(pass.get(&LABEL).unwrap(), "counted");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(pass.memoized(), 1);

    let _ = stack.resolve(&LABEL).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
