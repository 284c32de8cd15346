//! MCPL particle list files.
//!
//! - [`header`]: Header layout, flags and named blobs
//! - [`particle`]: Per-particle encoding
//! - [`writer`]: Append-only file creation with optional gzip on close
//! - [`reader`]: Sequential reading of plain or gzipped files

pub mod header;
pub mod particle;
pub mod reader;
pub mod writer;

pub use header::McplHeader;
pub use reader::McplReader;
pub use writer::McplWriter;
