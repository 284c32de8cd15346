use std::path::Path;

use log::{info, warn};

use super::{ConversionSummary, McplToPhitsOptions, check_distinct_paths, report_limit_reached};
use crate::codec::{particle_codes, units};
use crate::format::dump::DumpWriter;
use crate::format::mcpl::McplReader;
use crate::types::error::Result;
use crate::types::models::ConversionStats;

/// Per-particle warnings about unconvertible PDG codes stop after this many.
pub const MAX_SKIP_WARNINGS: u64 = 100;

/// Converts an MCPL file into a binary PHITS dump file.
///
/// Particles with PDG code 0 are dropped with one warning each. Particles
/// whose PDG code PHITS cannot represent are counted as skipped; the first
/// [`MAX_SKIP_WARNINGS`] are reported individually and the total once at the
/// end. The output may hold more than `i32::MAX` particles, which is reported
/// but not prevented.
///
/// # Errors
/// Returns an error if the MCPL file cannot be read or the dump file cannot
/// be written. A write failure leaves the partial dump file on disk.
pub fn mcpl_to_phits(
    mcpl_path: impl AsRef<Path>,
    dump_path: impl AsRef<Path>,
    options: &McplToPhitsOptions,
) -> Result<ConversionSummary> {
    let (mcpl_path, dump_path) = (mcpl_path.as_ref(), dump_path.as_ref());
    check_distinct_paths(mcpl_path, dump_path)?;

    let mut reader = McplReader::open(mcpl_path)?;
    info!(
        "Opened MCPL file {} produced with \"{}\" (contains {} particles)",
        reader.path().display(),
        reader.source_name(),
        reader.particle_count()
    );

    info!("Creating (or overwriting) output PHITS file.");
    let mut writer = DumpWriter::create(dump_path, options.marker_width, options.polarisation)?;

    let mut stats = ConversionStats::default();
    info!("Initiating particle conversion loop.");
    while let Some(particle) = reader.read_particle()? {
        if particle.pdg_code == 0 {
            warn!("Ignored particle with no PDG code set in the MCPL file.");
            stats.filtered += 1;
            continue;
        }

        let kf_code = particle_codes::pdg_to_phits(particle.pdg_code);
        if kf_code == 0 {
            stats.skipped += 1;
            if stats.skipped <= MAX_SKIP_WARNINGS {
                warn!(
                    "Found PDG code ({}) in the MCPL file which can not be converted \
                     to a PHITS particle code",
                    particle.pdg_code
                );
                if stats.skipped == MAX_SKIP_WARNINGS {
                    warn!("Suppressing future warnings regarding non-convertible PDG codes.");
                }
            }
            continue;
        }

        if stats.written == i32::MAX as u64 {
            warn!(
                "Writing more than {} (maximum value of 32 bit integers) particles \
                 in the PHITS dump file - it is not known whether PHITS will be able \
                 to deal with such files correctly.",
                i32::MAX
            );
        }
        writer.write(&units::particle_to_dump_record(&particle, kf_code))?;
        stats.written += 1;

        if stats.written == options.limit {
            let total = Some(reader.particle_count());
            report_limit_reached(&mut stats, options.limit, total, "MCPL");
            break;
        }
    }
    info!("Ending particle conversion loop.");

    if stats.skipped > 0 {
        warn!(
            "Ignored {} particles in the input MCPL file since their PDG codes \
             could not be converted to PHITS codes.",
            stats.skipped
        );
    }
    writer.finish()?;

    let output = dump_path.to_path_buf();
    info!("Created {} with {} particles.", output.display(), stats.written);
    Ok(ConversionSummary { output, stats })
}
