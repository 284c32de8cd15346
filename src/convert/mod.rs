//! Conversion passes between PHITS dump files and MCPL files.
//!
//! Each pass is a single linear loop: read one source particle, translate
//! it, write it, repeat. Nothing is buffered beyond the current particle and
//! no state outlives the call.
//!
//! - [`phits_to_mcpl`](phits_to_mcpl::phits_to_mcpl): PHITS dump -> MCPL
//! - [`mcpl_to_phits`](mcpl_to_phits::mcpl_to_phits): MCPL -> PHITS dump

pub mod mcpl_to_phits;
pub mod phits_to_mcpl;

use std::path::{Path, PathBuf};

use log::info;

use crate::types::error::{ConvertError, Result};
use crate::types::models::{ConversionStats, MarkerWidth};

/// Settings for [`phits_to_mcpl`](phits_to_mcpl::phits_to_mcpl).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhitsToMcplOptions {
    /// Store floats as `f64` instead of `f32`.
    pub double_precision: bool,
    /// Gzip the MCPL file once it is complete.
    pub gzip: bool,
    /// PHITS input deck to embed as the `phits_input_deck` blob.
    pub input_deck: Option<PathBuf>,
    /// PHITS dump summary to embed as the `phits_dump_summary_file` blob.
    pub dump_summary: Option<PathBuf>,
    /// Maximum number of particles to write, 0 for no limit.
    pub limit: u64,
}

impl Default for PhitsToMcplOptions {
    fn default() -> Self {
        Self {
            double_precision: false,
            gzip: true,
            input_deck: None,
            dump_summary: None,
            limit: 0,
        }
    }
}

/// Settings for [`mcpl_to_phits`](mcpl_to_phits::mcpl_to_phits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McplToPhitsOptions {
    /// Write 13-field records with polarisation instead of 10-field records.
    pub polarisation: bool,
    /// Maximum number of particles to write, 0 for no limit.
    pub limit: u64,
    pub marker_width: MarkerWidth,
}

impl Default for McplToPhitsOptions {
    fn default() -> Self {
        Self {
            polarisation: true,
            limit: 0,
            marker_width: MarkerWidth::Four,
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// File actually created, including any `.mcpl` or `.gz` suffix added.
    pub output: PathBuf,
    pub stats: ConversionStats,
}

/// Rejects textually identical input and output paths.
pub(crate) fn check_distinct_paths(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(ConvertError::InvalidArgument(format!(
            "input and output files are identical ({})",
            input.display()
        )));
    }
    Ok(())
}

/// Records and reports how many source records the particle limit left unread.
///
/// `total` is the source's record count when known.
pub(crate) fn report_limit_reached(
    stats: &mut ConversionStats,
    limit: u64,
    total: Option<u64>,
    source: &str,
) {
    match total {
        Some(total) => {
            let consumed = stats.skipped + stats.filtered + stats.written;
            stats.ignored_remaining = total.saturating_sub(consumed);
            if stats.ignored_remaining > 0 {
                info!(
                    "Output limit of {} particles reached. \
                     Ignoring remaining {} particles in the {} file.",
                    limit, stats.ignored_remaining, source
                );
            }
        }
        None => info!(
            "Output limit of {} particles reached. \
             Ignoring any remaining particles in the {} file.",
            limit, source
        ),
    }
}
