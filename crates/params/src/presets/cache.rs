//! Cache-hierarchy layers and the presets built from them.
//!
//! Each `with_*` layer installs one cache level and clears its elision flag:
//! 1. **Geometry:** `sets = bytes / banks / ways / 64`, integer arithmetic, never checked here.
//!    L1 keeps true LRU; the outer levels use tree PLRU.
//! 2. **Client directory:** Non-inclusive levels track their children. The directory is
//!    derived lazily from the `site` view, so it follows whatever child geometry the final
//!    stack resolves to, including layers added above this one.

use std::fmt;

use crate::common::{BLOCK_BYTES, KIB, Result};
use crate::config::{CacheParams, ClientDirectory, ReplacementPolicy};
use crate::keys::{
    DCACHE, L2_CACHE, L3_CACHE, NUM_CORES, USE_FAKE_DCACHE, USE_FAKE_L2_CACHE, USE_FAKE_L3_CACHE,
};
use crate::params::{ConfigStack, Layer, Lookup};

use super::base::base;

/// Declared size and organisation of one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSize {
    kib: usize,
    ways: usize,
    banks: usize,
    inclusive: bool,
}

impl CacheSize {
    /// An inclusive, single-bank, 8-way cache of `kib` KiB.
    pub const fn kib(kib: usize) -> Self {
        Self {
            kib,
            ways: 8,
            banks: 1,
            inclusive: true,
        }
    }

    /// Sets the associativity.
    #[must_use]
    pub const fn ways(mut self, ways: usize) -> Self {
        self.ways = ways;
        self
    }

    /// Sets the bank count.
    #[must_use]
    pub const fn banks(mut self, banks: usize) -> Self {
        self.banks = banks;
        self
    }

    /// Makes the level non-inclusive, giving it a client directory.
    #[must_use]
    pub const fn non_inclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    /// Declared capacity in bytes.
    pub const fn bytes(self) -> usize {
        self.kib.saturating_mul(KIB)
    }

    fn geometry(self, name: &str, level: u8) -> CacheParams {
        CacheParams::with_capacity(name, level, self.bytes(), self.ways, self.banks)
            .with_inclusive(self.inclusive)
    }
}

impl fmt::Display for CacheSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}KiB, {}w", self.kib, self.ways)?;
        if self.banks > 1 {
            write!(f, ", {} banks", self.banks)?;
        }
        if !self.inclusive {
            f.write_str(", non-inclusive")?;
        }
        Ok(())
    }
}

/// Smallest power of two holding `raw` sets, and at least one.
fn directory_sets(raw: usize) -> usize {
    let raw = raw.max(1);
    raw.checked_next_power_of_two().unwrap_or(raw)
}

/// Directory an L2 keeps of its core's data cache.
fn l2_directory(cx: &mut Lookup<'_>, banks: usize) -> Result<Option<ClientDirectory>> {
    let Some(dcache) = cx.site(&DCACHE)? else {
        return Ok(None);
    };
    let raw = dcache.sets.saturating_mul(2).checked_div(banks).unwrap_or(0);
    Ok(Some(ClientDirectory {
        client: dcache.name,
        sets: directory_sets(raw),
        ways: dcache.ways.saturating_add(2),
    }))
}

/// Directory the L3 keeps of every core's nearest private cache.
fn l3_directory(cx: &mut Lookup<'_>, banks: usize) -> Result<Option<ClientDirectory>> {
    let child = match cx.site_opt(&L2_CACHE)?.flatten() {
        Some(l2) => Some(l2),
        None => cx.site_opt(&DCACHE)?.flatten(),
    };
    let Some(child) = child else {
        return Ok(None);
    };
    let cores = cx.site(&NUM_CORES)?;
    let client_bytes = child.capacity().saturating_mul(cores);
    let raw = client_bytes
        .saturating_mul(2)
        .checked_div(banks)
        .and_then(|per_bank| per_bank.checked_div(child.ways))
        .map_or(0, |per_way| per_way / BLOCK_BYTES);
    Ok(Some(ClientDirectory {
        client: child.name,
        sets: directory_sets(raw),
        ways: child.ways,
    }))
}

/// Installs an L1 data cache of the given size.
pub fn with_l1d(size: CacheSize) -> Layer {
    Layer::new(format!("WithL1D({size})"))
        .set(&DCACHE, Some(size.geometry("dcache", 1)))
        .set(&USE_FAKE_DCACHE, false)
}

/// Installs a private L2 cache of the given size.
pub fn with_l2(size: CacheSize) -> Layer {
    Layer::new(format!("WithL2({size})"))
        .derive(&L2_CACHE, move |cx| {
            let mut l2 = size.geometry("l2", 2).with_replacement(ReplacementPolicy::Plru);
            if !l2.inclusive {
                l2 = l2.with_directory(l2_directory(cx, size.banks)?);
            }
            Ok(Some(l2))
        })
        .set(&USE_FAKE_L2_CACHE, false)
}

/// Installs a shared L3 cache of the given size.
pub fn with_l3(size: CacheSize) -> Layer {
    Layer::new(format!("WithL3({size})"))
        .derive(&L3_CACHE, move |cx| {
            let mut l3 = size.geometry("l3", 3).with_replacement(ReplacementPolicy::Plru);
            if !l3.inclusive {
                l3 = l3.with_directory(l3_directory(cx, size.banks)?);
            }
            Ok(Some(l3))
        })
        .set(&USE_FAKE_L3_CACHE, false)
}

fn hierarchy(l1d: CacheSize, l2: CacheSize, l3: CacheSize) -> ConfigStack {
    ConfigStack::from(with_l3(l3))
        + ConfigStack::from(with_l2(l2))
        + ConfigStack::from(with_l1d(l1d))
        + base()
}

/// The `default` preset: 128 KiB L1D, 1 MiB non-inclusive L2, 6 MiB non-inclusive L3.
pub fn default() -> ConfigStack {
    hierarchy(
        CacheSize::kib(128),
        CacheSize::kib(1024).banks(4).non_inclusive(),
        CacheSize::kib(6 * 1024).ways(6).banks(4).non_inclusive(),
    )
    .named("DefaultConfig")
}

/// The `large` preset: doubles every level of `default`.
pub fn large() -> ConfigStack {
    hierarchy(
        CacheSize::kib(256),
        CacheSize::kib(2 * 1024).banks(4).non_inclusive(),
        CacheSize::kib(12 * 1024).ways(6).banks(4).non_inclusive(),
    )
    .named("LargeConfig")
}
