//! Debug-oriented presets: small cache hierarchies for L2/L3 bring-up and a JTAG variant.

use crate::keys::DEBUG;
use crate::params::{ConfigStack, Layer};

use super::cache::{self, CacheSize, with_l2, with_l3};
use super::minimal::minimal;

fn small_hierarchy() -> ConfigStack {
    ConfigStack::from(with_l3(CacheSize::kib(256).non_inclusive()))
        + ConfigStack::from(with_l2(CacheSize::kib(64)))
}

/// The `minimal-l3-debug` preset: a 64 KiB L2 and 256 KiB L3 over `minimal`.
pub fn minimal_l3_debug() -> ConfigStack {
    (small_hierarchy() + minimal()).named("MinimalL3DebugConfig")
}

/// The `default-l3-debug` preset: a 64 KiB L2 and 256 KiB L3 over `default`.
pub fn default_l3_debug() -> ConfigStack {
    (small_hierarchy() + cache::default()).named("DefaultL3DebugConfig")
}

/// Layer exposing the debug module over JTAG.
pub fn jtag_layer() -> Layer {
    Layer::new("WithJtag").derive(&DEBUG, |cx| {
        let mut debug = cx.up(&DEBUG)?;
        debug.enabled = true;
        debug.jtag = true;
        Ok(debug)
    })
}

/// The `default-jtag` preset.
pub fn default_jtag() -> ConfigStack {
    (ConfigStack::from(jtag_layer()) + cache::default()).named("DefaultJtagConfig")
}
