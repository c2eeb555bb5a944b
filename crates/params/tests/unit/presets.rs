//! # Preset Tests
//!
//! The compiled-in catalog, cache-hierarchy layers and the values each preset resolves to.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvconfig_params::config::{BranchPredictor, ClientDirectory, ReplacementPolicy};
use rvconfig_params::presets::cache::{CacheSize, with_l2};
use rvconfig_params::overrides::from_json;
use rvconfig_params::params::KeyRegistry;
use rvconfig_params::presets::{self, minimal};
use rvconfig_params::{ConfigStack, ParamError, build_stack, keys, resolve, resolve_all};

// ──────────────────────────────────────────────────────────
// Catalog
// ──────────────────────────────────────────────────────────

#[test]
fn catalog_lists_every_preset_in_order() {
    let names: Vec<_> = presets::catalog().iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        vec![
            "base",
            "default",
            "minimal",
            "minimal-sim",
            "minimal-l3-debug",
            "default-l3-debug",
            "large",
            "default-jtag",
        ]
    );
}

#[test]
fn unknown_preset_is_rejected() {
    let err = build_stack("huge", 1).unwrap_err();
    assert!(matches!(err, ParamError::UnknownPreset { ref name } if name == "huge"));
}

#[test]
fn build_stack_installs_core_count() {
    let stack = build_stack("default", 3).unwrap();
    assert_eq!(stack.name(), "DefaultConfig");
    assert_eq!(resolve(&stack, &keys::NUM_CORES).unwrap(), 3);
}

/// Every preset resolves and validates.
#[rstest]
fn every_preset_resolves(
    #[values(
        "base",
        "default",
        "minimal",
        "minimal-sim",
        "minimal-l3-debug",
        "default-l3-debug",
        "large",
        "default-jtag"
    )]
    preset: &str,
    #[values(1, 2, 3)] cores: usize,
) {
    let stack = build_stack(preset, cores).unwrap();
    let soc = resolve_all(&stack).unwrap();
    assert_eq!(soc.cores.len(), cores);
}

// ──────────────────────────────────────────────────────────
// Elision flags
// ──────────────────────────────────────────────────────────

#[test]
fn minimal_l3_debug_has_real_l2_and_l3() {
    let stack = build_stack("minimal-l3-debug", 1).unwrap();
    assert!(!resolve(&stack, &keys::USE_FAKE_L2_CACHE).unwrap());
    assert!(!resolve(&stack, &keys::USE_FAKE_L3_CACHE).unwrap());

    let soc = resolve_all(&stack).unwrap();
    let l2 = soc.cores[0].l2_cache.as_ref().unwrap();
    assert_eq!((l2.size_bytes, l2.sets, l2.ways), (64 * 1024, 128, 8));
    assert!(l2.client_directory.is_none());

    let l3 = soc.l3_cache.as_ref().unwrap();
    assert_eq!((l3.size_bytes, l3.sets, l3.banks), (256 * 1024, 512, 1));
    assert_eq!(
        l3.client_directory,
        Some(ClientDirectory {
            client: "l2".to_string(),
            sets: 256,
            ways: 8,
        })
    );
}

#[test]
fn minimal_sim_fakes_memory_hierarchy() {
    let soc = resolve_all(&build_stack("minimal-sim", 1).unwrap()).unwrap();
    let core = &soc.cores[0];
    assert!(core.use_fake_dcache);
    assert!(core.use_fake_ptw);
    assert!(core.use_fake_l1plus_cache);
    assert!(core.use_fake_l2_cache);
    assert!(soc.use_fake_l3_cache);
    assert!(core.dcache.is_none());
    assert!(soc.l3_cache.is_none());
}

#[test]
fn base_has_no_outer_caches() {
    let soc = resolve_all(&build_stack("base", 1).unwrap()).unwrap();
    assert!(soc.cores[0].use_fake_l2_cache);
    assert!(soc.cores[0].l2_cache.is_none());
    assert!(soc.use_fake_l3_cache);
    assert!(soc.l3_cache.is_none());
}

// ──────────────────────────────────────────────────────────
// Derived values
// ──────────────────────────────────────────────────────────

#[test]
fn base_threshold_defaults_below_store_buffer() {
    let soc = resolve_all(&build_stack("base", 1).unwrap()).unwrap();
    assert_eq!(soc.cores[0].store_buffer_size, 16);
    assert_eq!(soc.cores[0].store_buffer_threshold, 15);
}

#[test]
fn minimal_shrinks_core() {
    let soc = resolve_all(&build_stack("minimal", 1).unwrap()).unwrap();
    let core = &soc.cores[0];
    assert_eq!(
        (core.fetch_width, core.decode_width, core.rename_width, core.commit_width),
        (4, 2, 2, 2)
    );
    assert_eq!(core.rob_size, 32);
    assert_eq!(core.store_buffer_threshold, 3);
    assert!(!core.enable_bpu);
    assert_eq!(core.branch_predictor, BranchPredictor::Static);

    assert_eq!((core.icache.sets, core.icache.ways), (64, 4));
    assert_eq!(core.icache.size_bytes, 16 * 1024);
    let dcache = core.dcache.as_ref().unwrap();
    assert_eq!((dcache.sets, dcache.ways, dcache.size_bytes), (64, 8, 32 * 1024));

    let l3 = soc.l3_cache.as_ref().unwrap();
    assert_eq!((l3.sets, l3.ways, l3.banks), (1024, 6, 1));
    assert_eq!(l3.size_bytes, 1024 * 6 * 64);
}

#[test]
fn default_directories_track_children() {
    let soc = resolve_all(&build_stack("default", 1).unwrap()).unwrap();
    let l2 = soc.cores[0].l2_cache.as_ref().unwrap();
    assert_eq!((l2.sets, l2.banks), (512, 4));
    assert_eq!(
        l2.client_directory,
        Some(ClientDirectory {
            client: "dcache".to_string(),
            sets: 128,
            ways: 10,
        })
    );

    let l3 = soc.l3_cache.as_ref().unwrap();
    assert_eq!((l3.sets, l3.ways, l3.banks), (4096, 6, 4));
    assert_eq!(l3.client_directory.as_ref().map(|d| d.sets), Some(1024));
}

/// The L3 directory grows with the core count, rounded to a power of two.
#[rstest]
#[case(1, 1024)]
#[case(2, 2048)]
#[case(3, 4096)]
#[case(4, 4096)]
fn l3_directory_scales_with_cores(#[case] cores: usize, #[case] sets: usize) {
    let stack = build_stack("default", cores).unwrap();
    let l3 = resolve(&stack, &keys::L3_CACHE).unwrap().unwrap();
    assert_eq!(l3.client_directory.map(|d| d.sets), Some(sets));
}

#[test]
fn jtag_preset_enables_debug_transport() {
    let soc = resolve_all(&build_stack("default-jtag", 1).unwrap()).unwrap();
    assert!(soc.debug.enabled);
    assert!(soc.debug.jtag);

    let plain = resolve_all(&build_stack("default", 1).unwrap()).unwrap();
    assert!(!plain.debug.jtag);
}

// ──────────────────────────────────────────────────────────
// Cache geometry
// ──────────────────────────────────────────────────────────

#[test]
fn two_mib_l2_has_4096_sets() {
    let stack = ConfigStack::from(with_l2(CacheSize::kib(2048))) + minimal::minimal();
    let l2 = resolve(&stack, &keys::L2_CACHE).unwrap().unwrap();
    assert_eq!(l2.sets, 4096);
    assert!(resolve_all(&stack).is_ok());
}

#[test]
fn non_power_of_two_l2_fails_validation() {
    let stack = ConfigStack::from(with_l2(CacheSize::kib(2000))) + minimal::minimal();
    let l2 = resolve(&stack, &keys::L2_CACHE).unwrap().unwrap();
    assert_eq!(l2.sets, 4000);

    match resolve_all(&stack) {
        Err(ParamError::Invariant(report)) => {
            assert_eq!(report.len(), 1);
            assert!(report.mentions("L2CacheParamsOpt"));
        }
        other => panic!("expected invariant violation, got {other:?}"),
    }
}

#[test]
fn outer_levels_use_pseudo_lru() {
    let soc = resolve_all(&build_stack("default", 1).unwrap()).unwrap();
    let core = &soc.cores[0];
    assert_eq!(core.dcache.as_ref().unwrap().replacement, ReplacementPolicy::Lru);
    assert_eq!(core.l2_cache.as_ref().unwrap().replacement, ReplacementPolicy::Plru);
    assert_eq!(soc.l3_cache.as_ref().unwrap().replacement, ReplacementPolicy::Plru);
}

/// Absurd child geometry reaches the validator instead of overflowing the directory math.
#[test]
fn oversized_dcache_is_reported_not_overflowed() {
    let registry = KeyRegistry::builtin().unwrap();
    let layer = from_json(
        "huge-dcache",
        &registry,
        serde_json::json!({
            "DCacheParamsOpt": {
                "name": "dcache",
                "level": 1,
                "size_bytes": 131_072,
                "ways": 8,
                "sets": 9_223_372_036_854_775_808_u64,
                "block_bytes": 64,
                "banks": 1,
                "inclusive": true
            }
        }),
    )
    .unwrap();
    let stack = build_stack("default", 2).unwrap().alter(layer);

    let l2 = resolve(&stack, &keys::L2_CACHE).unwrap().unwrap();
    let directory = l2.client_directory.unwrap();
    assert!(directory.sets.is_power_of_two());

    match resolve_all(&stack) {
        Err(ParamError::Invariant(report)) => assert!(report.mentions("DCacheParamsOpt")),
        other => panic!("expected invariant violation, got {other:?}"),
    }
}

#[test]
fn cache_size_display_describes_level() {
    let size = CacheSize::kib(1024).ways(16).banks(4).non_inclusive();
    assert_eq!(size.bytes(), 1024 * 1024);
    assert_eq!(size.to_string(), "1024KiB, 16w, 4 banks, non-inclusive");
    assert_eq!(CacheSize::kib(64).to_string(), "64KiB, 8w");
}
