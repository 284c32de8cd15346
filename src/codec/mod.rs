//! Translation layer between the two particle representations.
//!
//! # Submodules
//!
//! - [`particle_codes`][]: PDG code <-> PHITS kf-code mapping
//! - [`units`][]: Field-by-field record translation including time rescaling
//! - [`unit_vector`][]: Compact direction + energy packing used by MCPL particles
//! - [`compression`][]: Gzip post-processing of finished output files

pub mod compression;
pub mod particle_codes;
pub mod unit_vector;
pub mod units;
