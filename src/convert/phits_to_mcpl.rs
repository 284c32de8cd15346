use std::path::Path;

use log::{info, warn};

use super::{ConversionSummary, PhitsToMcplOptions, check_distinct_paths, report_limit_reached};
use crate::ancillary;
use crate::codec::{compression, units};
use crate::format::dump::DumpReader;
use crate::format::mcpl::McplWriter;
use crate::types::error::Result;
use crate::types::models::ConversionStats;

pub const SOURCE_NAME: &str = "PHITS";
pub const INPUT_DECK_BLOB: &str = "phits_input_deck";
pub const DUMP_SUMMARY_BLOB: &str = "phits_dump_summary_file";

/// Converts a binary PHITS dump file into an MCPL file.
///
/// Records without a kf-code are counted as filtered and records whose
/// kf-code has no PDG counterpart as skipped; both are dropped with one
/// warning each, and the skip total is reported once more at the end.
/// Polarisation is stored in the output exactly when the dump has it.
///
/// # Errors
/// Returns an error if:
/// - An ancillary file is missing, too short, too large, not text or lacks
///   the word `dump` (checked before any output is created)
/// - The dump file cannot be opened or is malformed
/// - Writing the MCPL file fails
pub fn phits_to_mcpl(
    dump_path: impl AsRef<Path>,
    mcpl_path: impl AsRef<Path>,
    options: &PhitsToMcplOptions,
) -> Result<ConversionSummary> {
    let (dump_path, mcpl_path) = (dump_path.as_ref(), mcpl_path.as_ref());
    check_distinct_paths(dump_path, mcpl_path)?;

    let input_deck = options
        .input_deck
        .as_deref()
        .map(ancillary::load_dump_companion)
        .transpose()?;
    let dump_summary = options
        .dump_summary
        .as_deref()
        .map(ancillary::load_dump_companion)
        .transpose()?;

    let mut reader = DumpReader::open(dump_path)?;
    let mut writer = McplWriter::create(mcpl_path)?;

    writer.set_source_name(SOURCE_NAME)?;
    writer.add_comment(&format!(
        "Converted from PHITS with phits2mcpl (from mcpl-phits v{})",
        env!("CARGO_PKG_VERSION")
    ))?;
    if options.double_precision {
        writer.enable_double_precision()?;
    }
    if reader.has_polarisation() {
        writer.enable_polarisation()?;
    }
    if let Some(data) = &input_deck {
        writer.add_blob(INPUT_DECK_BLOB, data)?;
    }
    if let Some(data) = &dump_summary {
        writer.add_blob(DUMP_SUMMARY_BLOB, data)?;
    }

    let mut stats = ConversionStats::default();
    while let Some(record) = reader.read_record()? {
        if record.kf_code == 0 {
            warn!("Ignored particle with no PHITS kf-code set in {}.", reader.path().display());
            stats.filtered += 1;
            continue;
        }
        let particle = units::dump_record_to_particle(&record);
        if particle.pdg_code == 0 {
            warn!(
                "Ignored particle with PHITS kf-code ({}) which can not be converted \
                 to a PDG code.",
                record.kf_code
            );
            stats.skipped += 1;
            continue;
        }
        writer.add_particle(&particle)?;
        stats.written += 1;

        if stats.written == options.limit {
            report_limit_reached(&mut stats, options.limit, reader.record_count(), "PHITS");
            break;
        }
    }

    if stats.skipped > 0 {
        warn!(
            "Ignored {} particles in the input PHITS file since their kf-codes \
             could not be converted to PDG codes.",
            stats.skipped
        );
    }

    let output = writer.output_path().to_path_buf();
    let did_gzip = if options.gzip {
        writer.close_and_gzip()?
    } else {
        writer.close()?;
        false
    };
    let output = if did_gzip { compression::gz_path(&output) } else { output };

    info!("Created {} with {} particles.", output.display(), stats.written);
    Ok(ConversionSummary { output, stats })
}
