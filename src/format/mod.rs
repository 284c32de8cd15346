//! File format layer for both sides of the conversion.
//!
//! # Module Organization
//!
//! - [`record`]: Fortran record framing with 4 or 8 byte markers
//! - [`dump`]: PHITS dump records, reader and writer
//! - [`mcpl`]: MCPL header and particle encoding, reader and writer
//!
//! # Architecture
//!
//! ```text
//! PHITS dump                         MCPL
//! ┌──────────────────────┐           ┌─────────────────┐
//! │ [m] record 1 [m]     │           │  Header + blobs │
//! │ [m] record 2 [m]     │  <----->  ├─────────────────┤
//! │ ...                  │           │  Particles      │
//! └──────────────────────┘           └─────────────────┘
//!   record::read/write                 mcpl::McplReader/McplWriter
//! ```

pub mod dump;
pub mod mcpl;
pub mod record;
