//! Post-resolution invariant checks.
//!
//! Validation is exhaustive: every predicate is evaluated and every failure is recorded, so one
//! run reports everything that is wrong with a configuration. It covers:
//! 1. **Cache geometry:** Positive ways, sets and banks; 64-byte blocks; power-of-two sets; the
//!    declared capacity must equal `sets * ways * block_bytes * banks` exactly.
//! 2. **Pipeline:** Positive widths, `rename <= decode <= fetch`, queue and buffer relations.
//! 3. **TLBs:** Positive, power-of-two set counts for every TLB and page-walk cache.
//! 4. **Exclusivity:** Elided levels carry no geometry and present levels do; a disabled BPU
//!    means the static predictor; JTAG needs the debug module.

use tracing::warn;

use crate::common::constants::ARCH_INT_REGS;
use crate::common::{BLOCK_BYTES, InvariantReport, ParamError, Result, Violation};
use crate::config::{
    BranchPredictor, CacheParams, CoreParameterSet, PageWalkParams, SocParameterSet, TlbParams,
};
use crate::keys;

/// Collects violations for one scope.
struct Checker<'a> {
    scope: String,
    violations: &'a mut Vec<Violation>,
}

impl Checker<'_> {
    fn require(&mut self, holds: bool, keys: &[&'static str], predicate: String) {
        if !holds {
            self.fail(keys, predicate);
        }
    }

    fn fail(&mut self, keys: &[&'static str], predicate: String) {
        self.violations.push(Violation {
            scope: self.scope.clone(),
            keys: keys.to_vec(),
            predicate,
        });
    }

    fn cache(&mut self, key: &'static str, cache: &CacheParams) {
        let name = &cache.name;
        self.require(cache.ways > 0, &[key], format!("{name}: ways > 0"));
        self.require(cache.sets > 0, &[key], format!("{name}: sets > 0"));
        self.require(cache.banks > 0, &[key], format!("{name}: banks > 0"));
        self.require(
            cache.block_bytes == BLOCK_BYTES,
            &[key],
            format!("{name}: block_bytes == {BLOCK_BYTES} (got {})", cache.block_bytes),
        );
        if cache.sets > 0 {
            self.require(
                cache.sets.is_power_of_two(),
                &[key],
                format!("{name}: sets is a power of two (got {})", cache.sets),
            );
        }
        let capacity = cache.capacity();
        self.require(
            capacity == cache.size_bytes,
            &[key],
            format!(
                "{name}: sets * ways * block_bytes * banks == size_bytes \
                 ({} * {} * {} * {} = {capacity}, declared {})",
                cache.sets, cache.ways, cache.block_bytes, cache.banks, cache.size_bytes
            ),
        );
        if let Some(directory) = &cache.client_directory {
            self.require(
                directory.ways > 0,
                &[key],
                format!("{name}: client directory ways > 0"),
            );
            self.require(
                directory.sets.is_power_of_two(),
                &[key],
                format!(
                    "{name}: client directory sets is a positive power of two (got {})",
                    directory.sets
                ),
            );
        }
    }

    fn elision(
        &mut self,
        flag: &'static str,
        fake: bool,
        key: &'static str,
        cache: Option<&CacheParams>,
    ) {
        match (fake, cache) {
            (true, Some(cache)) => {
                self.fail(&[flag, key], format!("{flag} implies no {} geometry", cache.name));
            }
            (false, None) => {
                self.fail(&[flag, key], format!("{key} must be present unless {flag} is set"));
            }
            _ => {}
        }
    }

    fn tlb(&mut self, key: &'static str, tlb: &TlbParams) {
        let name = &tlb.name;
        self.require(tlb.normal_ways > 0, &[key], format!("{name}: ways > 0"));
        self.require(
            tlb.normal_sets.is_power_of_two(),
            &[key],
            format!("{name}: sets is a positive power of two (got {})", tlb.normal_sets),
        );
    }

    fn page_walk(&mut self, key: &'static str, pwc: &PageWalkParams) {
        self.require(pwc.l1_size > 0, &[key], "l1_size > 0".to_string());
        self.require(pwc.sp_size > 0, &[key], "sp_size > 0".to_string());
        let levels = [("l2", pwc.l2_sets, pwc.l2_ways), ("l3", pwc.l3_sets, pwc.l3_ways)];
        for (level, sets, ways) in levels {
            self.require(ways > 0, &[key], format!("{level}_ways > 0"));
            self.require(
                sets.is_power_of_two(),
                &[key],
                format!("{level}_sets is a positive power of two (got {sets})"),
            );
        }
    }

    fn core(&mut self, core: &CoreParameterSet) {
        let fetch = keys::FETCH_WIDTH.name();
        let decode = keys::DECODE_WIDTH.name();
        let rename = keys::RENAME_WIDTH.name();
        let commit = keys::COMMIT_WIDTH.name();

        for (key, width) in [
            (fetch, core.fetch_width),
            (decode, core.decode_width),
            (rename, core.rename_width),
            (commit, core.commit_width),
        ] {
            self.require(width > 0, &[key], format!("{key} > 0"));
        }
        self.require(
            core.rename_width <= core.decode_width,
            &[rename, decode],
            format!("{rename} <= {decode} ({} > {})", core.rename_width, core.decode_width),
        );
        self.require(
            core.decode_width <= core.fetch_width,
            &[decode, fetch],
            format!("{decode} <= {fetch} ({} > {})", core.decode_width, core.fetch_width),
        );

        let rob = keys::ROB_SIZE.name();
        self.require(
            core.commit_width <= core.rob_size,
            &[commit, rob],
            format!("{commit} <= {rob} ({} > {})", core.commit_width, core.rob_size),
        );

        let sb = keys::STORE_BUFFER_SIZE.name();
        let threshold = keys::STORE_BUFFER_THRESHOLD.name();
        self.require(
            core.store_buffer_threshold > 0,
            &[threshold],
            format!("{threshold} > 0"),
        );
        self.require(
            core.store_buffer_threshold <= core.store_buffer_size,
            &[threshold, sb],
            format!(
                "{threshold} <= {sb} ({} > {})",
                core.store_buffer_threshold, core.store_buffer_size
            ),
        );

        let iq = keys::ISSUE_QUEUE_SIZE.name();
        let dispatch = keys::DISPATCH.name();
        let dq = &core.dispatch;
        for (queue, size, deq) in [
            ("int", dq.int_dq_size, dq.int_deq_width),
            ("fp", dq.fp_dq_size, dq.fp_deq_width),
            ("ls", dq.ls_dq_size, dq.ls_deq_width),
        ] {
            self.require(
                core.issue_queue_size >= deq,
                &[iq, dispatch],
                format!("{iq} >= {queue}_deq_width ({} < {deq})", core.issue_queue_size),
            );
            self.require(
                size >= core.rename_width,
                &[dispatch, rename],
                format!("{queue}_dq_size >= {rename} ({size} < {})", core.rename_width),
            );
        }

        let phys = keys::PHYS_REGS.name();
        self.require(
            core.phys_regs > ARCH_INT_REGS,
            &[phys],
            format!("{phys} > {ARCH_INT_REGS} (got {})", core.phys_regs),
        );

        self.cache(keys::ICACHE.name(), &core.icache);
        if let Some(dcache) = &core.dcache {
            self.cache(keys::DCACHE.name(), dcache);
        }
        if let Some(l2) = &core.l2_cache {
            self.cache(keys::L2_CACHE.name(), l2);
        }
        self.elision(
            keys::USE_FAKE_DCACHE.name(),
            core.use_fake_dcache,
            keys::DCACHE.name(),
            core.dcache.as_ref(),
        );
        self.elision(
            keys::USE_FAKE_L2_CACHE.name(),
            core.use_fake_l2_cache,
            keys::L2_CACHE.name(),
            core.l2_cache.as_ref(),
        );

        self.tlb(keys::ITLB.name(), &core.itlb);
        self.tlb(keys::LDTLB.name(), &core.ldtlb);
        self.tlb(keys::STTLB.name(), &core.sttlb);
        self.page_walk(keys::L2TLB.name(), &core.l2tlb);

        let bpu = keys::ENABLE_BPU.name();
        let predictor = keys::BRANCH_PREDICTOR.name();
        self.require(
            core.enable_bpu || core.branch_predictor == BranchPredictor::Static,
            &[bpu, predictor],
            format!(
                "{bpu} == false implies {predictor} == Static (got {:?})",
                core.branch_predictor
            ),
        );
    }
}

/// Evaluates every invariant of `soc` and returns all violations found.
pub fn check(soc: &SocParameterSet) -> InvariantReport {
    let mut violations = Vec::new();

    let mut chip = Checker {
        scope: "soc".to_string(),
        violations: &mut violations,
    };
    let cores = keys::NUM_CORES.name();
    chip.require(
        !soc.cores.is_empty(),
        &[cores],
        format!("{cores} >= 1 (got 0)"),
    );
    if let Some(l3) = &soc.l3_cache {
        chip.cache(keys::L3_CACHE.name(), l3);
    }
    chip.elision(
        keys::USE_FAKE_L3_CACHE.name(),
        soc.use_fake_l3_cache,
        keys::L3_CACHE.name(),
        soc.l3_cache.as_ref(),
    );
    chip.require(
        !soc.debug.jtag || soc.debug.enabled,
        &[keys::DEBUG.name()],
        "jtag implies enabled".to_string(),
    );

    for (index, core) in soc.cores.iter().enumerate() {
        let mut hart = Checker {
            scope: format!("core {index}"),
            violations: &mut violations,
        };
        hart.require(
            core.hart_id == index,
            &[keys::HART_ID.name()],
            format!("HartId == {index} (got {})", core.hart_id),
        );
        hart.core(core);
    }

    InvariantReport { violations }
}

/// Validates `soc`, failing with every violated invariant.
///
/// Each violation is also logged at `warn` level.
///
/// # Errors
///
/// Returns [`ParamError::Invariant`] if any check fails.
pub fn validate(soc: &SocParameterSet) -> Result<()> {
    let report = check(soc);
    if report.is_empty() {
        return Ok(());
    }
    for violation in &report.violations {
        warn!(
            stack = %soc.stack,
            scope = %violation.scope,
            predicate = %violation.predicate,
            "configuration invariant violated"
        );
    }
    Err(ParamError::Invariant(report))
}
