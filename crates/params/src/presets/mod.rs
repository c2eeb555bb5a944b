//! The compiled-in preset catalog.
//!
//! Presets are plain functions returning a [`ConfigStack`]; the catalog maps their public names
//! to those functions. Every preset is built from the same handful of layers:
//! 1. **Base:** [`base::base_layer`], a complete L1-only core.
//! 2. **Hierarchy:** [`cache::with_l1d`], [`cache::with_l2`] and [`cache::with_l3`].
//! 3. **Shrinking:** [`minimal::minimal_layer`] and [`minimal::sim_layer`].
//! 4. **Debug:** [`debug::jtag_layer`].

/// The base configuration.
pub mod base;
/// Cache-hierarchy layers and the `default` and `large` presets.
pub mod cache;
/// L2/L3 bring-up and JTAG presets.
pub mod debug;
/// Minimal and simulation presets.
pub mod minimal;

use std::fmt;

use crate::common::{ParamError, Result};
use crate::keys::NUM_CORES;
use crate::params::{ConfigStack, Layer};

/// One catalog entry.
pub struct Preset {
    /// Name used on the command line and by [`build_stack`].
    pub name: &'static str,
    /// One-line summary.
    pub description: &'static str,
    build: fn() -> ConfigStack,
}

impl Preset {
    /// Builds the preset's stack.
    pub fn stack(&self) -> ConfigStack {
        (self.build)()
    }
}

impl fmt::Debug for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preset")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

static CATALOG: &[Preset] = &[
    Preset {
        name: "base",
        description: "L1-only core, no L2 or L3",
        build: base::base,
    },
    Preset {
        name: "default",
        description: "128 KiB L1D, 1 MiB L2, 6 MiB L3, all non-inclusive below L1",
        build: cache::default,
    },
    Preset {
        name: "minimal",
        description: "narrow core with small TLBs, no BPU, no L2, single-bank L3",
        build: minimal::minimal,
    },
    Preset {
        name: "minimal-sim",
        description: "minimal core with fake data cache, page walker and L3",
        build: minimal::minimal_sim,
    },
    Preset {
        name: "minimal-l3-debug",
        description: "minimal core with a 64 KiB L2 and 256 KiB L3",
        build: debug::minimal_l3_debug,
    },
    Preset {
        name: "default-l3-debug",
        description: "default core with a 64 KiB L2 and 256 KiB L3",
        build: debug::default_l3_debug,
    },
    Preset {
        name: "large",
        description: "256 KiB L1D, 2 MiB L2, 12 MiB L3",
        build: cache::large,
    },
    Preset {
        name: "default-jtag",
        description: "default core with the debug module on JTAG",
        build: debug::default_jtag,
    },
];

/// Every preset, in catalog order.
pub fn catalog() -> &'static [Preset] {
    CATALOG
}

/// Looks up a preset by name.
///
/// # Errors
///
/// Returns [`ParamError::UnknownPreset`] if no preset has that name.
pub fn find(name: &str) -> Result<&'static Preset> {
    CATALOG
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| ParamError::UnknownPreset {
            name: name.to_string(),
        })
}

/// Builds the stack for `preset` with `core_count` harts.
///
/// # Arguments
///
/// * `preset` - Catalog name, e.g. `"minimal-l3-debug"`.
/// * `core_count` - Number of harts; installed as `NumCores` on top of the preset.
///
/// # Errors
///
/// Returns [`ParamError::UnknownPreset`] if the catalog has no such preset.
pub fn build_stack(preset: &str, core_count: usize) -> Result<ConfigStack> {
    let entry = find(preset)?;
    tracing::debug!(preset = entry.name, cores = core_count, "building preset stack");
    let cores = Layer::new(format!("WithNCores({core_count})")).set(&NUM_CORES, core_count);
    Ok(entry.stack().alter(cores))
}
