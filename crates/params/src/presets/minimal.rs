//! Small-footprint presets for quick elaboration and simulation.

use crate::config::{BranchPredictor, DispatchParams, PageWalkParams, TlbParams};
use crate::keys::{
    BRANCH_PREDICTOR, COMMIT_WIDTH, DCACHE, DECODE_WIDTH, DISPATCH, ENABLE_BPU, ENABLE_LOOP,
    FETCH_WIDTH, FTQ_SIZE, IBUF_SIZE, ICACHE, ISSUE_QUEUE_SIZE, ITLB, L2_CACHE, L2TLB, L3_CACHE,
    LDTLB, LOAD_QUEUE_SIZE, PHYS_REGS, RENAME_WIDTH, ROB_SIZE, STORE_BUFFER_SIZE,
    STORE_BUFFER_THRESHOLD, STORE_QUEUE_SIZE, STTLB, USE_FAKE_DCACHE, USE_FAKE_L1PLUS_CACHE,
    USE_FAKE_L2_CACHE, USE_FAKE_L3_CACHE, USE_FAKE_PTW,
};
use crate::params::{ConfigStack, Layer};

use super::cache;

/// Sets per L1 cache in the minimal core.
const L1_SETS: usize = 64;

/// Sets in the minimal, single-bank L3.
const L3_SETS: usize = 1024;

/// Layer shrinking the core to the smallest useful out-of-order machine.
///
/// Cache levels keep the associativity of the stack below and only lose sets; the L2 is
/// elided and the L3 collapses to a single bank.
pub fn minimal_layer() -> Layer {
    Layer::new("MinimalCore")
        .set(&FETCH_WIDTH, 4)
        .set(&DECODE_WIDTH, 2)
        .set(&RENAME_WIDTH, 2)
        .set(&COMMIT_WIDTH, 2)
        .set(&ISSUE_QUEUE_SIZE, 8)
        .set(&PHYS_REGS, 64)
        .set(&ROB_SIZE, 32)
        .set(&FTQ_SIZE, 8)
        .set(&IBUF_SIZE, 16)
        .set(&LOAD_QUEUE_SIZE, 16)
        .set(&STORE_QUEUE_SIZE, 12)
        .set(&STORE_BUFFER_SIZE, 4)
        .set(&STORE_BUFFER_THRESHOLD, 3)
        .set(&DISPATCH, DispatchParams::uniform(12, 4))
        .set(&ENABLE_BPU, false)
        .set(&ENABLE_LOOP, false)
        .set(&BRANCH_PREDICTOR, BranchPredictor::Static)
        .derive(&ICACHE, |cx| {
            let icache = cx.up(&ICACHE)?;
            let banks = icache.banks;
            Ok(icache.resized(L1_SETS, banks))
        })
        .partial(&DCACHE, |cx| {
            Ok(cx.up(&DCACHE)?.map(|dcache| {
                let banks = dcache.banks;
                Some(dcache.resized(L1_SETS, banks))
            }))
        })
        .set(&ITLB, TlbParams::fully_associative("itlb", 4, 2))
        .set(&LDTLB, TlbParams::fully_associative("ldtlb", 4, 2))
        .set(&STTLB, TlbParams::fully_associative("sttlb", 4, 2))
        .set(
            &L2TLB,
            PageWalkParams {
                l1_size: 4,
                l2_sets: 4,
                l2_ways: 4,
                l3_sets: 4,
                l3_ways: 8,
                sp_size: 2,
            },
        )
        .set(&L2_CACHE, None)
        .set(&USE_FAKE_L2_CACHE, true)
        .derive(&L3_CACHE, |cx| {
            Ok(cx.up(&L3_CACHE)?.map(|l3| l3.resized(L3_SETS, 1)))
        })
}

/// The `minimal` preset: [`minimal_layer`] over `default`.
pub fn minimal() -> ConfigStack {
    (ConfigStack::from(minimal_layer()) + cache::default()).named("MinimalConfig")
}

/// Layer replacing the memory hierarchy with fake ports for fast simulation.
pub fn sim_layer() -> Layer {
    Layer::new("FakeMemory")
        .set(&USE_FAKE_DCACHE, true)
        .set(&USE_FAKE_PTW, true)
        .set(&USE_FAKE_L1PLUS_CACHE, true)
        .set(&USE_FAKE_L3_CACHE, true)
        .set(&DCACHE, None)
        .set(&L3_CACHE, None)
}

/// The `minimal-sim` preset.
pub fn minimal_sim() -> ConfigStack {
    (ConfigStack::from(sim_layer()) + minimal()).named("MinimalSimConfig")
}
