//! Assembly of resolved core and SoC parameter sets.
//!
//! Resolution runs in separate passes:
//! 1. **SoC pass:** One pass over the stack for the shared keys (`NumCores`, L3, debug).
//! 2. **Hart passes:** One pass per hart over the stack with a `HartId` layer on top, so rules
//!    that depend on the hart see their own id and memo tables are never shared between harts.
//! 3. **Validation:** The assembled set is checked before it is returned.

use tracing::{debug, info};

use crate::common::Result;
use crate::config::{CoreParameterSet, SocParameterSet};
use crate::keys;
use crate::params::{ConfigStack, Layer};
use crate::validate::validate;

/// Returns `stack` with a top layer fixing `HartId` to `hart`.
pub fn hart_stack(stack: &ConfigStack, hart: usize) -> ConfigStack {
    stack.alter(Layer::new(format!("Hart({hart})")).set(&keys::HART_ID, hart))
}

impl CoreParameterSet {
    /// Resolves one hart's parameters in a single pass over `stack`.
    ///
    /// `stack` must supply `HartId`; see [`hart_stack`].
    ///
    /// # Errors
    ///
    /// Returns the first resolution error (missing key, cycle, type mismatch).
    pub fn resolve(stack: &ConfigStack) -> Result<Self> {
        let mut pass = stack.pass();
        Ok(Self {
            hart_id: pass.get(&keys::HART_ID)?,
            fetch_width: pass.get(&keys::FETCH_WIDTH)?,
            decode_width: pass.get(&keys::DECODE_WIDTH)?,
            rename_width: pass.get(&keys::RENAME_WIDTH)?,
            commit_width: pass.get(&keys::COMMIT_WIDTH)?,
            issue_queue_size: pass.get(&keys::ISSUE_QUEUE_SIZE)?,
            phys_regs: pass.get(&keys::PHYS_REGS)?,
            rob_size: pass.get(&keys::ROB_SIZE)?,
            ftq_size: pass.get(&keys::FTQ_SIZE)?,
            ibuf_size: pass.get(&keys::IBUF_SIZE)?,
            load_queue_size: pass.get(&keys::LOAD_QUEUE_SIZE)?,
            store_queue_size: pass.get(&keys::STORE_QUEUE_SIZE)?,
            store_buffer_size: pass.get(&keys::STORE_BUFFER_SIZE)?,
            store_buffer_threshold: pass.get(&keys::STORE_BUFFER_THRESHOLD)?,
            dispatch: pass.get(&keys::DISPATCH)?,
            branch_predictor: pass.get(&keys::BRANCH_PREDICTOR)?,
            enable_bpu: pass.get(&keys::ENABLE_BPU)?,
            enable_loop: pass.get(&keys::ENABLE_LOOP)?,
            icache: pass.get(&keys::ICACHE)?,
            dcache: pass.get(&keys::DCACHE)?,
            l2_cache: pass.get(&keys::L2_CACHE)?,
            itlb: pass.get(&keys::ITLB)?,
            ldtlb: pass.get(&keys::LDTLB)?,
            sttlb: pass.get(&keys::STTLB)?,
            l2tlb: pass.get(&keys::L2TLB)?,
            use_fake_dcache: pass.get(&keys::USE_FAKE_DCACHE)?,
            use_fake_ptw: pass.get(&keys::USE_FAKE_PTW)?,
            use_fake_l1plus_cache: pass.get(&keys::USE_FAKE_L1PLUS_CACHE)?,
            use_fake_l2_cache: pass.get(&keys::USE_FAKE_L2_CACHE)?,
        })
    }
}

impl SocParameterSet {
    /// Resolves the shared parameters and every hart, without validating.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error from the SoC pass or any hart pass.
    pub fn resolve(stack: &ConfigStack) -> Result<Self> {
        let mut pass = stack.pass();
        let core_count = pass.get(&keys::NUM_CORES)?;
        let l3_cache = pass.get(&keys::L3_CACHE)?;
        let use_fake_l3_cache = pass.get(&keys::USE_FAKE_L3_CACHE)?;
        let debug = pass.get(&keys::DEBUG)?;

        let cores = (0..core_count)
            .map(|hart| {
                debug!(stack = %stack, hart, "resolving hart");
                CoreParameterSet::resolve(&hart_stack(stack, hart))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            stack: stack.name().to_string(),
            cores,
            l3_cache,
            use_fake_l3_cache,
            debug,
        })
    }
}

/// Resolves and validates the complete parameter set of `stack`.
///
/// # Arguments
///
/// * `stack` - A preset stack, usually from [`crate::build_stack`].
///
/// # Returns
///
/// The SoC parameters with one entry per hart, in hart order.
///
/// # Errors
///
/// Returns the first resolution error, or [`crate::ParamError::Invariant`] listing every
/// violated invariant.
pub fn resolve_all(stack: &ConfigStack) -> Result<SocParameterSet> {
    let soc = SocParameterSet::resolve(stack)?;
    validate(&soc)?;
    info!(stack = %stack, cores = soc.cores.len(), "configuration resolved");
    Ok(soc)
}
