//! # Stack Tests
//!
//! Composition, naming and resolved views.

use pretty_assertions::assert_eq;
use rvconfig_params::{ConfigStack, Layer, keys};

use crate::common::{DEPTH, LABEL, WIDTH, width};

#[test]
fn concat_names_both_sides() {
    let stack = width("a", 1) + width("b", 2);
    assert_eq!(stack.name(), "a ++ b");
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.to_string(), "a ++ b");
}

#[test]
fn concat_with_empty_keeps_other_name() {
    let empty = ConfigStack::empty("nothing");
    assert!(empty.is_empty());
    assert_eq!((empty.clone() + width("a", 1)).name(), "a");
    assert_eq!((width("a", 1) + empty).name(), "a");
}

#[test]
fn concat_by_reference_leaves_inputs_intact() {
    let top = width("top", 1);
    let bottom = width("bottom", 2);
    let stack = &top + &bottom;
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 1);
    assert_eq!(top.len(), 1);
    assert_eq!(bottom.resolve(&WIDTH).unwrap(), 2);
}

#[test]
fn layers_are_ordered_outermost_first() {
    let stack = width("a", 1) + width("b", 2) + width("c", 3);
    let names: Vec<_> = stack.layers().map(Layer::name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn named_renames_without_changing_layers() {
    let stack = (width("a", 1) + width("b", 2)).named("Pair");
    assert_eq!(stack.name(), "Pair");
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.resolve(&WIDTH).unwrap(), 1);
}

#[test]
fn alter_pushes_on_top_and_keeps_name() {
    let base = width("base", 8).named("Base");
    let altered = base.alter(Layer::new("narrow").set(&WIDTH, 2));
    assert_eq!(altered.name(), "Base");
    assert_eq!(altered.len(), 2);
    assert_eq!(altered.resolve(&WIDTH).unwrap(), 2);
    assert_eq!(base.resolve(&WIDTH).unwrap(), 8);
}

#[test]
fn view_collects_supplied_keys() {
    let stack = ConfigStack::from(
        Layer::new("base")
            .set(&WIDTH, 4)
            .set(&LABEL, "core".to_string()),
    )
    .named("Probe");
    let view = stack.view(&[&WIDTH, &DEPTH, &LABEL]).unwrap();

    assert_eq!(view.stack(), "Probe");
    assert_eq!(view.len(), 2);
    assert_eq!(view.get(&WIDTH), Some(&4));
    assert_eq!(view.get(&DEPTH), None);
    assert!(view.contains(&LABEL));
    assert_eq!(view.missing(), &["Depth"]);
    assert_eq!(view.names(), vec!["Label", "Width"]);
    assert_eq!(
        view.to_json().unwrap(),
        serde_json::json!({ "Label": "core", "Width": 4 })
    );
}

#[test]
fn view_aborts_on_cycle() {
    let stack = ConfigStack::from(Layer::new("loop").derive(&WIDTH, |cx| cx.site(&WIDTH)));
    assert!(stack.view(&[&WIDTH]).is_err());
}

#[test]
fn view_of_soc_keys_covers_preset() {
    let stack = rvconfig_params::build_stack("default", 2).unwrap();
    let view = stack.view(keys::SOC).unwrap();
    assert!(view.missing().is_empty());
    assert_eq!(view.get(&keys::NUM_CORES), Some(&2));
    assert_eq!(view.get(&keys::USE_FAKE_L3_CACHE), Some(&false));
}
