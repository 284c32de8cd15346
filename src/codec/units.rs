//! Unit conversion between PHITS dump records and MCPL particles.
//!
//! Only time is rescaled. Position (cm), direction and kinetic energy (MeV)
//! are shared by both formats and copied unchanged.

use crate::codec::particle_codes;
use crate::format::dump::DumpRecord;
use crate::types::models::Particle;

/// Factor applied to a PHITS time to obtain an MCPL time.
pub const PHITS_TO_MCPL_TIME: f64 = 1.0e6;
/// Factor applied to an MCPL time to obtain a PHITS time.
pub const MCPL_TO_PHITS_TIME: f64 = 1.0e-6;

/// Builds an MCPL particle from a PHITS record.
///
/// The PDG code is 0 when the record's kf-code has no PDG counterpart.
pub fn dump_record_to_particle(record: &DumpRecord) -> Particle {
    Particle {
        pdg_code: particle_codes::phits_to_pdg(record.kf_code),
        position: record.position,
        direction: record.direction,
        polarisation: record.polarisation,
        ekin: record.ekin,
        weight: record.weight,
        time: record.time * PHITS_TO_MCPL_TIME,
    }
}

/// Builds a PHITS record from an MCPL particle whose kf-code was already resolved.
pub fn particle_to_dump_record(particle: &Particle, kf_code: i32) -> DumpRecord {
    DumpRecord {
        kf_code,
        position: particle.position,
        direction: particle.direction,
        ekin: particle.ekin,
        weight: particle.weight,
        time: particle.time * MCPL_TO_PHITS_TIME,
        polarisation: particle.polarisation,
    }
}
