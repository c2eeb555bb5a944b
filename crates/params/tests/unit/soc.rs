//! # SoC Assembly Tests
//!
//! Per-hart passes, determinism and concurrent resolution.

use std::thread;

use pretty_assertions::assert_eq;
use rvconfig_params::config::CoreParameterSet;
use rvconfig_params::soc::hart_stack;
use rvconfig_params::{ConfigStack, Layer, build_stack, keys, resolve_all};

use crate::common::init_tracing;

#[test]
fn harts_are_numbered_in_order() {
    init_tracing();
    let soc = resolve_all(&build_stack("default", 4).unwrap()).unwrap();
    let ids: Vec<_> = soc.cores.iter().map(|core| core.hart_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(soc.stack, "DefaultConfig");
}

#[test]
fn hart_stack_sets_hart_id_on_top() {
    let stack = hart_stack(&build_stack("base", 2).unwrap(), 1);
    assert_eq!(stack.resolve(&keys::HART_ID).unwrap(), 1);
    assert_eq!(stack.layers().next().map(Layer::name), Some("Hart(1)"));
}

#[test]
fn core_pass_requires_hart_id() {
    let err = CoreParameterSet::resolve(&build_stack("base", 1).unwrap()).unwrap_err();
    assert!(err.is_missing(&keys::HART_ID));
}

/// Rules may depend on the hart being resolved.
#[test]
fn rules_see_their_own_hart() {
    let per_hart = Layer::new("PerHartRob")
        .derive(&keys::ROB_SIZE, |cx| Ok(64 + 32 * cx.site(&keys::HART_ID)?));
    let stack = ConfigStack::from(per_hart) + build_stack("base", 3).unwrap();
    let soc = resolve_all(&stack).unwrap();
    let robs: Vec<_> = soc.cores.iter().map(|core| core.rob_size).collect();
    assert_eq!(robs, vec![64, 96, 128]);
}

#[test]
fn resolution_is_deterministic() {
    for preset in rvconfig_params::presets::catalog() {
        let stack = build_stack(preset.name, 2).unwrap();
        assert_eq!(resolve_all(&stack).unwrap(), resolve_all(&stack).unwrap());
    }
}

#[test]
fn concurrent_passes_agree() {
    let stack = build_stack("minimal-l3-debug", 2).unwrap();
    let expected = resolve_all(&stack).unwrap();
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| resolve_all(&stack).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for soc in results {
        assert_eq!(soc, expected);
    }
}

#[test]
fn soc_serializes_to_json() {
    let soc = resolve_all(&build_stack("minimal", 1).unwrap()).unwrap();
    let json = serde_json::to_value(&soc).unwrap();
    assert_eq!(json["cores"][0]["decode_width"], 2);
    assert_eq!(json["cores"][0]["branch_predictor"], "Static");
    assert_eq!(json["l3_cache"]["replacement"], "PLRU");
}
