//! Built-in parameter keys.
//!
//! Core keys are resolved once per hart (with [`HART_ID`] set by the hart's top layer); SoC keys
//! are resolved once for the whole stack. Key names follow the generator's parameter names.

use crate::common::Result;
use crate::config::{
    BranchPredictor, CacheParams, DebugParams, DispatchParams, PageWalkParams, TlbParams,
};
use crate::params::{AnyKey, Key, Lookup};

fn one_core(_: &mut Lookup<'_>) -> Result<usize> {
    Ok(1)
}

fn not_fake(_: &mut Lookup<'_>) -> Result<bool> {
    Ok(false)
}

fn drain_below_full(cx: &mut Lookup<'_>) -> Result<usize> {
    Ok(cx.site(&STORE_BUFFER_SIZE)?.saturating_sub(1))
}

fn no_debug_changes(_: &mut Lookup<'_>) -> Result<DebugParams> {
    Ok(DebugParams::default())
}

// ──────────────────────────────────────────────────────────
// SoC
// ──────────────────────────────────────────────────────────

/// Number of harts in the SoC.
pub static NUM_CORES: Key<usize> = Key::with_default("NumCores", one_core);

/// Identity of the hart being resolved. Set per hart by `soc::hart_stack`.
pub static HART_ID: Key<usize> = Key::new("HartId");

/// Shared L3 cache geometry; `None` when the L3 is elided.
pub static L3_CACHE: Key<Option<CacheParams>> = Key::new("L3CacheParamsOpt");

/// Elide the shared L3 cache.
pub static USE_FAKE_L3_CACHE: Key<bool> = Key::with_default("UseFakeL3Cache", not_fake);

/// Debug module and JTAG transport.
pub static DEBUG: Key<DebugParams> = Key::with_default("DebugParams", no_debug_changes);

// ──────────────────────────────────────────────────────────
// Core: widths and queues
// ──────────────────────────────────────────────────────────

/// Instructions fetched per cycle.
pub static FETCH_WIDTH: Key<usize> = Key::new("FetchWidth");
/// Instructions decoded per cycle.
pub static DECODE_WIDTH: Key<usize> = Key::new("DecodeWidth");
/// Instructions renamed per cycle.
pub static RENAME_WIDTH: Key<usize> = Key::new("RenameWidth");
/// Instructions committed per cycle.
pub static COMMIT_WIDTH: Key<usize> = Key::new("CommitWidth");
/// Entries per issue queue.
pub static ISSUE_QUEUE_SIZE: Key<usize> = Key::new("IssQueSize");
/// Physical integer registers.
pub static PHYS_REGS: Key<usize> = Key::new("NRPhyRegs");
/// Reorder buffer entries.
pub static ROB_SIZE: Key<usize> = Key::new("RobSize");
/// Fetch target queue entries.
pub static FTQ_SIZE: Key<usize> = Key::new("FtqSize");
/// Instruction buffer entries.
pub static IBUF_SIZE: Key<usize> = Key::new("IBufSize");
/// Load queue entries.
pub static LOAD_QUEUE_SIZE: Key<usize> = Key::new("LoadQueueSize");
/// Store queue entries.
pub static STORE_QUEUE_SIZE: Key<usize> = Key::new("StoreQueueSize");
/// Committed-store buffer entries.
pub static STORE_BUFFER_SIZE: Key<usize> = Key::new("StoreBufferSize");
/// Store buffer drain threshold; defaults to one below the buffer size.
pub static STORE_BUFFER_THRESHOLD: Key<usize> =
    Key::with_default("StoreBufferThreshold", drain_below_full);
/// Dispatch queue sizing.
pub static DISPATCH: Key<DispatchParams> = Key::new("DispatchParams");

// ──────────────────────────────────────────────────────────
// Core: branch prediction
// ──────────────────────────────────────────────────────────

/// Branch predictor algorithm.
pub static BRANCH_PREDICTOR: Key<BranchPredictor> = Key::new("BranchPredictor");
/// Branch prediction unit enabled.
pub static ENABLE_BPU: Key<bool> = Key::new("EnableBPU");
/// Loop predictor enabled.
pub static ENABLE_LOOP: Key<bool> = Key::new("EnableLoop");

// ──────────────────────────────────────────────────────────
// Core: caches and TLBs
// ──────────────────────────────────────────────────────────

/// L1 instruction cache.
pub static ICACHE: Key<CacheParams> = Key::new("ICacheParams");
/// L1 data cache; `None` when elided.
pub static DCACHE: Key<Option<CacheParams>> = Key::new("DCacheParamsOpt");
/// Private L2 cache; `None` when elided.
pub static L2_CACHE: Key<Option<CacheParams>> = Key::new("L2CacheParamsOpt");
/// Instruction TLB.
pub static ITLB: Key<TlbParams> = Key::new("ITlbParams");
/// Load data TLB.
pub static LDTLB: Key<TlbParams> = Key::new("LdTlbParams");
/// Store data TLB.
pub static STTLB: Key<TlbParams> = Key::new("StTlbParams");
/// Second-level TLB page-walk caches.
pub static L2TLB: Key<PageWalkParams> = Key::new("L2TlbParams");

// ──────────────────────────────────────────────────────────
// Core: elision flags
// ──────────────────────────────────────────────────────────

/// Replace the data cache with a fake memory port.
pub static USE_FAKE_DCACHE: Key<bool> = Key::with_default("UseFakeDCache", not_fake);
/// Replace the page-table walker with a fake.
pub static USE_FAKE_PTW: Key<bool> = Key::with_default("UseFakePTW", not_fake);
/// Replace the L1+ instruction cache with a fake.
pub static USE_FAKE_L1PLUS_CACHE: Key<bool> = Key::with_default("UseFakeL1plusCache", not_fake);
/// Elide the private L2 cache.
pub static USE_FAKE_L2_CACHE: Key<bool> = Key::with_default("UseFakeL2Cache", not_fake);

/// Declares the SoC and core key slices plus their concatenation from one list of each.
macro_rules! key_slices {
    (soc: [$($soc:ident),* $(,)?], core: [$($core:ident),* $(,)?] $(,)?) => {
        /// Keys resolved once for the whole SoC.
        pub static SOC: &[&dyn AnyKey] = &[$(&$soc),*];

        /// Keys resolved once per hart.
        pub static CORE: &[&dyn AnyKey] = &[$(&$core),*];

        /// Every built-in key.
        pub static ALL: &[&dyn AnyKey] = &[$(&$soc,)* $(&$core),*];
    };
}

key_slices! {
    soc: [NUM_CORES, L3_CACHE, USE_FAKE_L3_CACHE, DEBUG],
    core: [
        HART_ID,
        FETCH_WIDTH,
        DECODE_WIDTH,
        RENAME_WIDTH,
        COMMIT_WIDTH,
        ISSUE_QUEUE_SIZE,
        PHYS_REGS,
        ROB_SIZE,
        FTQ_SIZE,
        IBUF_SIZE,
        LOAD_QUEUE_SIZE,
        STORE_QUEUE_SIZE,
        STORE_BUFFER_SIZE,
        STORE_BUFFER_THRESHOLD,
        DISPATCH,
        BRANCH_PREDICTOR,
        ENABLE_BPU,
        ENABLE_LOOP,
        ICACHE,
        DCACHE,
        L2_CACHE,
        ITLB,
        LDTLB,
        STTLB,
        L2TLB,
        USE_FAKE_DCACHE,
        USE_FAKE_PTW,
        USE_FAKE_L1PLUS_CACHE,
        USE_FAKE_L2_CACHE,
    ],
}
