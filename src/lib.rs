//! # mcpl-phits
//!
//! Conversion between MCPL particle list files and binary PHITS dump files.
//!
//! - [`phits_to_mcpl`]: reads a PHITS dump (4 or 8 byte record markers, with or
//!   without polarisation, optionally gzipped) and writes MCPL, optionally
//!   embedding the PHITS input deck and dump summary file.
//! - [`mcpl_to_phits`]: reads MCPL (optionally gzipped) and writes a PHITS dump.
pub mod ancillary;
pub mod codec;
pub mod convert;
pub mod format;
pub mod types;

// Re-export the main types for convenience
pub use convert::{
    ConversionSummary,
    McplToPhitsOptions,
    PhitsToMcplOptions,
    mcpl_to_phits::mcpl_to_phits,
    phits_to_mcpl::phits_to_mcpl,
};
pub use format::{
    dump::{DumpReader, DumpRecord, DumpWriter},
    mcpl::{McplHeader, McplReader, McplWriter},
};
pub use types::{
    error::{ConvertError, Result},
    models::{ConversionStats, MarkerWidth, Particle},
};
