//! Common definitions shared by the resolution engine, presets and validator.
//!
//! This module provides:
//! 1. **Constants:** Fixed geometry constants (cache block size, KiB).
//! 2. **Error Handling:** The [`ParamError`] type and the violation report it carries.

/// Fixed geometry constants.
pub mod constants;

/// Error types and the invariant violation report.
pub mod error;

pub use constants::{BLOCK_BYTES, KIB};
pub use error::{InvariantReport, ParamError, Result, Violation};
