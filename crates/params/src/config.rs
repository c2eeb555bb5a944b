//! Parameter value types for cores and the SoC.
//!
//! This module defines every structured value a key can carry. It provides:
//! 1. **Defaults:** Baseline microarchitecture constants used by the base preset.
//! 2. **Enums:** Replacement policy, branch predictor and TLB associativity.
//! 3. **Geometry:** Cache, client directory, TLB and page-walk cache parameters.
//! 4. **Bundles:** [`CoreParameterSet`] (one hart) and [`SocParameterSet`] (the whole chip).
//!
//! All types serialize to JSON for downstream generators and deserialize for overrides.

use serde::{Deserialize, Serialize};

use crate::common::BLOCK_BYTES;

/// Baseline microarchitecture constants.
///
/// These values define the base preset; every other preset starts from them and overrides
/// what it needs.
pub(crate) mod defaults {
    /// Instructions fetched per cycle.
    pub const FETCH_WIDTH: usize = 8;

    /// Instructions decoded per cycle.
    pub const DECODE_WIDTH: usize = 6;

    /// Instructions renamed per cycle.
    ///
    /// Must not exceed the decode width.
    pub const RENAME_WIDTH: usize = 6;

    /// Instructions committed per cycle.
    pub const COMMIT_WIDTH: usize = 6;

    /// Entries per issue queue.
    pub const ISSUE_QUEUE_SIZE: usize = 16;

    /// Physical integer registers.
    pub const PHYS_REGS: usize = 192;

    /// Reorder buffer entries.
    pub const ROB_SIZE: usize = 256;

    /// Fetch target queue entries.
    pub const FTQ_SIZE: usize = 64;

    /// Instruction buffer entries between fetch and decode.
    pub const IBUF_SIZE: usize = 48;

    /// Load queue entries.
    pub const LOAD_QUEUE_SIZE: usize = 80;

    /// Store queue entries.
    pub const STORE_QUEUE_SIZE: usize = 64;

    /// Committed-store buffer entries.
    pub const STORE_BUFFER_SIZE: usize = 16;

    /// Integer, floating-point and load/store dispatch queue sizes.
    pub const DISPATCH_QUEUE_SIZE: usize = 16;

    /// Dispatch queue dequeue width (per queue).
    pub const DISPATCH_DEQ_WIDTH: usize = 4;

    /// Instruction cache capacity (64 KiB, 4 ways, 256 sets).
    pub const ICACHE_BYTES: usize = 64 * 1024;

    /// Instruction cache associativity.
    pub const ICACHE_WAYS: usize = 4;

    /// Data cache capacity (64 KiB, 8 ways, 128 sets).
    pub const DCACHE_BYTES: usize = 64 * 1024;

    /// Data cache associativity.
    pub const DCACHE_WAYS: usize = 8;

    /// Instruction TLB entries (fully associative).
    pub const ITLB_WAYS: usize = 32;

    /// Data TLB sets (direct-mapped normal pages).
    pub const DTLB_SETS: usize = 128;

    /// Superpage entries per first-level TLB.
    pub const TLB_SUPER_WAYS: usize = 8;

    /// Page-walk cache: level-1 entries.
    pub const PWC_L1_SIZE: usize = 16;

    /// Page-walk cache: level-2 sets and ways.
    pub const PWC_L2_SETS: usize = 32;
    /// Page-walk cache: level-2 ways.
    pub const PWC_L2_WAYS: usize = 4;

    /// Page-walk cache: level-3 sets.
    pub const PWC_L3_SETS: usize = 128;
    /// Page-walk cache: level-3 ways.
    pub const PWC_L3_WAYS: usize = 4;

    /// Page-walk cache: superpage entries.
    pub const PWC_SP_SIZE: usize = 16;

    /// JTAG IDCODE reported by the debug transport module.
    pub const JTAG_IDCODE: u32 = 0x1000_0DFB;

    /// System bus access width of the debug module, in bits.
    pub const SBA_BUS_WIDTH: u32 = 64;
}

/// Cache and TLB replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Tree-based pseudo-LRU.
    #[serde(alias = "Plru")]
    Plru,
    /// First In First Out.
    #[serde(alias = "Fifo")]
    Fifo,
    /// Random victim selection.
    #[serde(alias = "Random")]
    Random,
    /// Most Recently Used.
    #[serde(alias = "Mru")]
    Mru,
}

/// Branch prediction algorithm types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Always predict not-taken. The only predictor allowed with the BPU disabled.
    #[default]
    Static,
    /// Global history XOR PC indexed pattern table.
    GShare,
    /// Perceptron-based predictor.
    Perceptron,
    /// Tagged geometric history length predictor.
    #[serde(alias = "TAGE")]
    Tage,
    /// Tournament of local and global predictors.
    Tournament,
}

/// How TLB entries are organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlbAssociativity {
    /// One set; any entry may hold any page.
    #[default]
    Full,
    /// Set-associative, indexed by the low VPN bits.
    Set,
}

/// Directory a non-inclusive cache keeps of its children's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDirectory {
    /// Name of the child cache tracked.
    pub client: String,
    /// Directory sets.
    pub sets: usize,
    /// Directory ways.
    pub ways: usize,
}

/// Geometry of one cache level.
///
/// `sets` is derived from the declared size with integer division; the validator rejects any
/// geometry where `sets * ways * block_bytes * banks != size_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheParams {
    /// Name used by the generator (`icache`, `dcache`, `L2`, `L3`).
    pub name: String,
    /// Hierarchy level (1 for L1).
    pub level: u8,
    /// Declared total capacity across all banks, in bytes.
    pub size_bytes: usize,
    /// Associativity.
    pub ways: usize,
    /// Sets per bank.
    pub sets: usize,
    /// Block size in bytes.
    pub block_bytes: usize,
    /// Number of independently indexed banks.
    pub banks: usize,
    /// Whether the level holds a superset of its children's contents.
    pub inclusive: bool,
    /// Replacement policy.
    #[serde(default)]
    pub replacement: ReplacementPolicy,
    /// Client directory, present only on non-inclusive levels.
    #[serde(default)]
    pub client_directory: Option<ClientDirectory>,
}

impl CacheParams {
    /// Builds a cache geometry from a declared capacity.
    ///
    /// # Arguments
    ///
    /// * `name` - Generator-facing name of the cache.
    /// * `level` - Hierarchy level.
    /// * `size_bytes` - Declared total capacity.
    /// * `ways` - Associativity.
    /// * `banks` - Bank count.
    ///
    /// # Returns
    ///
    /// An inclusive, LRU geometry with `sets = size_bytes / banks / ways / 64` (integer
    /// division; zero when `ways` or `banks` is zero).
    pub fn with_capacity(
        name: &str,
        level: u8,
        size_bytes: usize,
        ways: usize,
        banks: usize,
    ) -> Self {
        let sets = size_bytes
            .checked_div(banks)
            .and_then(|per_bank| per_bank.checked_div(ways))
            .map_or(0, |per_way| per_way / BLOCK_BYTES);
        Self {
            name: name.to_string(),
            level,
            size_bytes,
            ways,
            sets,
            block_bytes: BLOCK_BYTES,
            banks,
            inclusive: true,
            replacement: ReplacementPolicy::default(),
            client_directory: None,
        }
    }

    /// Returns this geometry with a new set and bank count, recomputing the declared size.
    #[must_use]
    pub fn resized(mut self, sets: usize, banks: usize) -> Self {
        self.sets = sets;
        self.banks = banks;
        self.size_bytes = self.capacity();
        self
    }

    /// Returns this geometry with the given inclusivity.
    #[must_use]
    pub fn with_inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    /// Returns this geometry with the given replacement policy.
    #[must_use]
    pub fn with_replacement(mut self, replacement: ReplacementPolicy) -> Self {
        self.replacement = replacement;
        self
    }

    /// Returns this geometry with the given client directory.
    #[must_use]
    pub fn with_directory(mut self, directory: Option<ClientDirectory>) -> Self {
        self.client_directory = directory;
        self
    }

    /// Capacity implied by the geometry: `sets * ways * block_bytes * banks` (saturating).
    pub const fn capacity(&self) -> usize {
        self.sets
            .saturating_mul(self.ways)
            .saturating_mul(self.block_bytes)
            .saturating_mul(self.banks)
    }
}

/// Geometry of a first-level TLB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlbParams {
    /// Generator-facing name (`itlb`, `ldtlb`, `sttlb`).
    pub name: String,
    /// Sets for normal (4 KiB) pages.
    pub normal_sets: usize,
    /// Ways for normal pages.
    pub normal_ways: usize,
    /// Organisation of the normal-page array.
    pub normal_associativity: TlbAssociativity,
    /// Fully associative superpage entries.
    pub super_ways: usize,
    /// Replacement policy for both arrays.
    pub replacement: ReplacementPolicy,
}

impl TlbParams {
    /// Fully associative TLB with `ways` normal entries.
    pub fn fully_associative(name: &str, ways: usize, super_ways: usize) -> Self {
        Self {
            name: name.to_string(),
            normal_sets: 1,
            normal_ways: ways,
            normal_associativity: TlbAssociativity::Full,
            super_ways,
            replacement: ReplacementPolicy::Plru,
        }
    }

    /// Set-associative TLB.
    pub fn set_associative(name: &str, sets: usize, ways: usize, super_ways: usize) -> Self {
        Self {
            name: name.to_string(),
            normal_sets: sets,
            normal_ways: ways,
            normal_associativity: TlbAssociativity::Set,
            super_ways,
            replacement: ReplacementPolicy::Plru,
        }
    }
}

/// Page-walk caches of the shared second-level TLB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWalkParams {
    /// Fully associative level-1 entries.
    pub l1_size: usize,
    /// Level-2 sets.
    pub l2_sets: usize,
    /// Level-2 ways.
    pub l2_ways: usize,
    /// Level-3 sets.
    pub l3_sets: usize,
    /// Level-3 ways.
    pub l3_ways: usize,
    /// Superpage entries.
    pub sp_size: usize,
}

impl Default for PageWalkParams {
    fn default() -> Self {
        Self {
            l1_size: defaults::PWC_L1_SIZE,
            l2_sets: defaults::PWC_L2_SETS,
            l2_ways: defaults::PWC_L2_WAYS,
            l3_sets: defaults::PWC_L3_SETS,
            l3_ways: defaults::PWC_L3_WAYS,
            sp_size: defaults::PWC_SP_SIZE,
        }
    }
}

/// Dispatch queue sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Integer dispatch queue entries.
    pub int_dq_size: usize,
    /// Floating-point dispatch queue entries.
    pub fp_dq_size: usize,
    /// Load/store dispatch queue entries.
    pub ls_dq_size: usize,
    /// Integer dispatch queue dequeue width.
    pub int_deq_width: usize,
    /// Floating-point dispatch queue dequeue width.
    pub fp_deq_width: usize,
    /// Load/store dispatch queue dequeue width.
    pub ls_deq_width: usize,
}

impl DispatchParams {
    /// All three queues with the same size and dequeue width.
    pub const fn uniform(size: usize, deq_width: usize) -> Self {
        Self {
            int_dq_size: size,
            fp_dq_size: size,
            ls_dq_size: size,
            int_deq_width: deq_width,
            fp_deq_width: deq_width,
            ls_deq_width: deq_width,
        }
    }
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self::uniform(defaults::DISPATCH_QUEUE_SIZE, defaults::DISPATCH_DEQ_WIDTH)
    }
}

/// Debug module and JTAG transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugParams {
    /// Instantiate the RISC-V debug module.
    pub enabled: bool,
    /// Expose the debug module through a JTAG DTM.
    pub jtag: bool,
    /// IDCODE reported over JTAG.
    pub jtag_idcode: u32,
    /// System bus access width in bits (0 disables system bus access).
    pub sba_bus_width: u32,
}

impl Default for DebugParams {
    fn default() -> Self {
        Self {
            enabled: true,
            jtag: false,
            jtag_idcode: defaults::JTAG_IDCODE,
            sba_bus_width: defaults::SBA_BUS_WIDTH,
        }
    }
}

/// Fully resolved parameters of one hart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreParameterSet {
    /// Hart identifier (index in the SoC core list).
    pub hart_id: usize,
    /// Instructions fetched per cycle.
    pub fetch_width: usize,
    /// Instructions decoded per cycle.
    pub decode_width: usize,
    /// Instructions renamed per cycle.
    pub rename_width: usize,
    /// Instructions committed per cycle.
    pub commit_width: usize,
    /// Entries per issue queue.
    pub issue_queue_size: usize,
    /// Physical integer registers.
    pub phys_regs: usize,
    /// Reorder buffer entries.
    pub rob_size: usize,
    /// Fetch target queue entries.
    pub ftq_size: usize,
    /// Instruction buffer entries.
    pub ibuf_size: usize,
    /// Load queue entries.
    pub load_queue_size: usize,
    /// Store queue entries.
    pub store_queue_size: usize,
    /// Committed-store buffer entries.
    pub store_buffer_size: usize,
    /// Store buffer occupancy that triggers a drain.
    pub store_buffer_threshold: usize,
    /// Dispatch queues.
    pub dispatch: DispatchParams,
    /// Branch predictor algorithm.
    pub branch_predictor: BranchPredictor,
    /// Branch prediction unit enabled.
    pub enable_bpu: bool,
    /// Loop predictor enabled.
    pub enable_loop: bool,
    /// L1 instruction cache.
    pub icache: CacheParams,
    /// L1 data cache; `None` when elided.
    pub dcache: Option<CacheParams>,
    /// Private L2 cache; `None` when elided.
    pub l2_cache: Option<CacheParams>,
    /// Instruction TLB.
    pub itlb: TlbParams,
    /// Load data TLB.
    pub ldtlb: TlbParams,
    /// Store data TLB.
    pub sttlb: TlbParams,
    /// Second-level TLB page-walk caches.
    pub l2tlb: PageWalkParams,
    /// Replace the data cache with a fake memory port.
    pub use_fake_dcache: bool,
    /// Replace the page-table walker with a fake.
    pub use_fake_ptw: bool,
    /// Replace the L1+ instruction cache with a fake.
    pub use_fake_l1plus_cache: bool,
    /// Elide the private L2 cache.
    pub use_fake_l2_cache: bool,
}

/// Fully resolved parameters of the whole chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocParameterSet {
    /// Name of the stack the set was resolved from.
    pub stack: String,
    /// One entry per hart, in hart order.
    pub cores: Vec<CoreParameterSet>,
    /// Shared L3 cache; `None` when elided.
    pub l3_cache: Option<CacheParams>,
    /// Elide the shared L3 cache.
    pub use_fake_l3_cache: bool,
    /// Debug module and JTAG settings.
    pub debug: DebugParams,
}
