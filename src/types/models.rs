//! Core data structures shared by both conversion directions.
//!
//! This module defines:
//! - The format-agnostic particle record
//! - The record marker width of PHITS dump files
//! - Per-conversion counters

use super::error::{ConvertError, Result};

/// A single Monte-Carlo particle as stored in an MCPL file.
///
/// Units follow MCPL: position in cm, kinetic energy in MeV, time in ms.
/// The direction is not normalised here; writers store what they are given.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// PDG code of the species, 0 when unknown.
    pub pdg_code: i32,
    pub position: [f64; 3],
    pub direction: [f64; 3],
    /// All zeros when the source carries no polarisation.
    pub polarisation: [f64; 3],
    pub ekin: f64,
    pub weight: f64,
    pub time: f64,
}

/// Width of the Fortran record markers bracketing each PHITS dump record.
///
/// Fixed for the whole lifetime of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerWidth {
    /// 32-bit markers, what PHITS almost always expects.
    #[default]
    Four,
    /// 64-bit markers.
    Eight,
}

impl MarkerWidth {
    /// Returns the marker size in bytes.
    pub fn bytes(&self) -> usize {
        match self {
            MarkerWidth::Four => 4,
            MarkerWidth::Eight => 8,
        }
    }

    /// Largest payload length representable by a marker of this width.
    pub fn max_payload(&self) -> u64 {
        match self {
            MarkerWidth::Four => u32::MAX as u64,
            MarkerWidth::Eight => u64::MAX,
        }
    }

    pub fn from_bytes(width: usize) -> Result<Self> {
        match width {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => Err(ConvertError::InvalidArgument(format!(
                "record marker width should be 4 (32bit Fortran record markers, recommended) \
                 or 8 (64bit Fortran record markers), got {}",
                width
            ))),
        }
    }
}

impl std::fmt::Display for MarkerWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-byte", self.bytes())
    }
}

/// Counters collected during one conversion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionStats {
    /// Particles written to the destination.
    pub written: u64,
    /// Particles whose nonzero code has no counterpart in the destination format.
    pub skipped: u64,
    /// Particles dropped because their source code is 0.
    pub filtered: u64,
    /// Source records left unread after the particle limit was reached.
    pub ignored_remaining: u64,
}
