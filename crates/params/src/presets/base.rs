//! The base configuration every other preset builds on.

use crate::config::{
    BranchPredictor, CacheParams, DispatchParams, PageWalkParams, TlbParams, defaults,
};
use crate::keys::{
    BRANCH_PREDICTOR, COMMIT_WIDTH, DCACHE, DECODE_WIDTH, DISPATCH, ENABLE_BPU, ENABLE_LOOP,
    FETCH_WIDTH, FTQ_SIZE, IBUF_SIZE, ICACHE, ISSUE_QUEUE_SIZE, ITLB, L2_CACHE, L2TLB, L3_CACHE,
    LDTLB, LOAD_QUEUE_SIZE, PHYS_REGS, RENAME_WIDTH, ROB_SIZE, STORE_BUFFER_SIZE,
    STORE_QUEUE_SIZE, STTLB, USE_FAKE_L2_CACHE, USE_FAKE_L3_CACHE,
};
use crate::params::{ConfigStack, Layer};

/// Layer supplying every core and SoC parameter that has no key default.
///
/// The base core has L1 caches only: the private L2 and the shared L3 are elided.
pub fn base_layer() -> Layer {
    Layer::new("BaseConfig")
        .set(&FETCH_WIDTH, defaults::FETCH_WIDTH)
        .set(&DECODE_WIDTH, defaults::DECODE_WIDTH)
        .set(&RENAME_WIDTH, defaults::RENAME_WIDTH)
        .set(&COMMIT_WIDTH, defaults::COMMIT_WIDTH)
        .set(&ISSUE_QUEUE_SIZE, defaults::ISSUE_QUEUE_SIZE)
        .set(&PHYS_REGS, defaults::PHYS_REGS)
        .set(&ROB_SIZE, defaults::ROB_SIZE)
        .set(&FTQ_SIZE, defaults::FTQ_SIZE)
        .set(&IBUF_SIZE, defaults::IBUF_SIZE)
        .set(&LOAD_QUEUE_SIZE, defaults::LOAD_QUEUE_SIZE)
        .set(&STORE_QUEUE_SIZE, defaults::STORE_QUEUE_SIZE)
        .set(&STORE_BUFFER_SIZE, defaults::STORE_BUFFER_SIZE)
        .set(&DISPATCH, DispatchParams::default())
        .set(&BRANCH_PREDICTOR, BranchPredictor::Tage)
        .set(&ENABLE_BPU, true)
        .set(&ENABLE_LOOP, true)
        .set(
            &ICACHE,
            CacheParams::with_capacity(
                "icache",
                1,
                defaults::ICACHE_BYTES,
                defaults::ICACHE_WAYS,
                1,
            ),
        )
        .set(
            &DCACHE,
            Some(CacheParams::with_capacity(
                "dcache",
                1,
                defaults::DCACHE_BYTES,
                defaults::DCACHE_WAYS,
                1,
            )),
        )
        .set(&L2_CACHE, None)
        .set(&USE_FAKE_L2_CACHE, true)
        .set(
            &ITLB,
            TlbParams::fully_associative("itlb", defaults::ITLB_WAYS, defaults::TLB_SUPER_WAYS),
        )
        .set(
            &LDTLB,
            TlbParams::set_associative("ldtlb", defaults::DTLB_SETS, 1, defaults::TLB_SUPER_WAYS),
        )
        .set(
            &STTLB,
            TlbParams::set_associative("sttlb", defaults::DTLB_SETS, 1, defaults::TLB_SUPER_WAYS),
        )
        .set(&L2TLB, PageWalkParams::default())
        .set(&L3_CACHE, None)
        .set(&USE_FAKE_L3_CACHE, true)
}

/// The `base` preset.
pub fn base() -> ConfigStack {
    ConfigStack::from(base_layer())
}
