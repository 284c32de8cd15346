//! Binary PHITS dump files.
//!
//! A dump file is nothing but a sequence of framed records (see
//! [`record`](super::record)), one per particle, with no file header:
//!
//! ```text
//! [marker] kf, x, y, z, u, v, w, e, wt, tm, [sx, sy, sz] [marker]
//! ```
//!
//! All fields are `f64`. The polarisation triple is present in every record
//! or in none, so a record is either 80 or 104 bytes long. The marker width
//! and the polarisation choice are not stored anywhere and are recovered
//! from the first record when reading.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};

use super::record::{self, decode_marker, read_up_to};
use crate::codec::compression;
use crate::types::error::{ConvertError, Result};
use crate::types::models::MarkerWidth;

/// Number of `f64` fields in a record carrying polarisation.
pub const FIELDS_WITH_POLARISATION: usize = 13;
/// Number of `f64` fields in a record without polarisation.
pub const FIELDS_WITHOUT_POLARISATION: usize = 10;

const FIELD_SIZE: usize = std::mem::size_of::<f64>();

/// One particle exactly as PHITS stores it.
///
/// Position in cm, kinetic energy in MeV, time in ns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DumpRecord {
    /// PHITS kf-code of the species.
    pub kf_code: i32,
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub ekin: f64,
    pub weight: f64,
    pub time: f64,
    pub polarisation: [f64; 3],
}

impl DumpRecord {
    /// Payload size in bytes of a record with or without polarisation.
    pub fn payload_len(polarisation: bool) -> usize {
        FIELD_SIZE
            * if polarisation {
                FIELDS_WITH_POLARISATION
            } else {
                FIELDS_WITHOUT_POLARISATION
            }
    }

    /// All 13 fields in file order.
    pub fn fields(&self) -> [f64; FIELDS_WITH_POLARISATION] {
        [
            self.kf_code as f64,
            self.position[0],
            self.position[1],
            self.position[2],
            self.direction[0],
            self.direction[1],
            self.direction[2],
            self.ekin,
            self.weight,
            self.time,
            self.polarisation[0],
            self.polarisation[1],
            self.polarisation[2],
        ]
    }

    /// Encodes the record into `out`, replacing its contents.
    pub fn to_payload(&self, polarisation: bool, out: &mut Vec<u8>) {
        let len = Self::payload_len(polarisation);
        out.clear();
        out.resize(len, 0);
        LittleEndian::write_f64_into(&self.fields()[..len / FIELD_SIZE], out);
    }

    /// Decodes an 80 or 104 byte payload. Missing polarisation reads as zeros.
    pub fn from_payload(bytes: &[u8]) -> Result<Self> {
        let nfields = match bytes.len() / FIELD_SIZE {
            n @ (FIELDS_WITHOUT_POLARISATION | FIELDS_WITH_POLARISATION)
                if bytes.len() % FIELD_SIZE == 0 =>
            {
                n
            }
            _ => {
                return Err(ConvertError::InvalidFormat(format!(
                    "PHITS dump record has {} bytes, expected {} or {}",
                    bytes.len(),
                    Self::payload_len(false),
                    Self::payload_len(true)
                )));
            }
        };
        let mut f = [0.0f64; FIELDS_WITH_POLARISATION];
        LittleEndian::read_f64_into(bytes, &mut f[..nfields]);
        Ok(Self {
            kf_code: f[0] as i32,
            position: [f[1], f[2], f[3]],
            direction: [f[4], f[5], f[6]],
            ekin: f[7],
            weight: f[8],
            time: f[9],
            polarisation: [f[10], f[11], f[12]],
        })
    }
}

fn is_valid_payload_len(len: u64) -> bool {
    len == DumpRecord::payload_len(false) as u64 || len == DumpRecord::payload_len(true) as u64
}

/// Sequential reader of PHITS dump files, optionally gzipped.
pub struct DumpReader {
    input: Box<dyn Read>,
    path: PathBuf,
    marker_width: MarkerWidth,
    payload_len: usize,
    record_count: Option<u64>,
    records_read: u64,
    buf: Vec<u8>,
}

impl DumpReader {
    /// Opens a dump file and detects its record layout from the first record.
    ///
    /// Files ending in `.gz` are decompressed on the fly. An empty file is a
    /// valid dump holding zero particles.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The first record is neither 80 nor 104 bytes with 4 or 8 byte markers
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening PHITS dump file: {}", path.display());
        let file = File::open(path).map_err(|source| ConvertError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let file_size = file.metadata()?.len();
        let gzipped = compression::is_gzip_path(path);
        let mut input: Box<dyn Read> = if gzipped {
            debug!("Decompressing {} with gzip", path.display());
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        // Largest possible first frame: 8-byte markers around a 104-byte payload
        let mut head = vec![0u8; 2 * 8 + DumpRecord::payload_len(true)];
        let got = read_up_to(&mut input, &mut head)?;
        head.truncate(got);

        let (marker_width, payload_len) = if head.is_empty() {
            debug!("Empty PHITS dump file");
            (MarkerWidth::Four, DumpRecord::payload_len(false))
        } else {
            detect_layout(&head).ok_or_else(|| {
                ConvertError::InvalidFormat(format!(
                    "{} does not look like a binary PHITS dump file: the first record \
                     must be {} or {} bytes with 4 or 8 byte record markers",
                    path.display(),
                    DumpRecord::payload_len(false),
                    DumpRecord::payload_len(true)
                ))
            })?
        };
        debug!(
            "Detected {} record markers and {} byte records (polarisation: {})",
            marker_width,
            payload_len,
            payload_len == DumpRecord::payload_len(true)
        );

        let frame_len = (2 * marker_width.bytes() + payload_len) as u64;
        let record_count = if gzipped {
            None
        } else if file_size % frame_len == 0 {
            Some(file_size / frame_len)
        } else {
            warn!(
                "Size of {} ({} bytes) is not a multiple of the record size ({} bytes); \
                 the file may be truncated",
                path.display(),
                file_size,
                frame_len
            );
            None
        };

        Ok(Self {
            input: Box::new(Cursor::new(head).chain(input)),
            path: path.to_path_buf(),
            marker_width,
            payload_len,
            record_count,
            records_read: 0,
            buf: Vec::with_capacity(DumpRecord::payload_len(true)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker_width(&self) -> MarkerWidth {
        self.marker_width
    }

    /// Whether every record carries the polarisation triple.
    pub fn has_polarisation(&self) -> bool {
        self.payload_len == DumpRecord::payload_len(true)
    }

    /// Total records in the file, known only for uncompressed well-formed files.
    pub fn record_count(&self) -> Option<u64> {
        self.record_count
    }

    /// Reads the next record, or `None` at the end of the file.
    pub fn read_record(&mut self) -> Result<Option<DumpRecord>> {
        let Some(leading) = record::read_marker(&mut self.input, self.marker_width)? else {
            return Ok(None);
        };
        if leading != self.payload_len as u64 {
            return Err(ConvertError::InvalidFormat(format!(
                "record {} in {} has {} bytes while the first record has {}",
                self.records_read + 1,
                self.path.display(),
                leading,
                self.payload_len
            )));
        }
        record::read_record_body(&mut self.input, self.marker_width, leading, &mut self.buf)?;
        self.records_read += 1;
        DumpRecord::from_payload(&self.buf).map(Some)
    }
}

impl Iterator for DumpReader {
    type Item = Result<DumpRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Tries both marker widths against the first frame in `head`.
///
/// A hypothesis holds when the leading marker is a valid record length and
/// the trailing marker at the implied offset repeats it. 4-byte markers win
/// if both hold.
fn detect_layout(head: &[u8]) -> Option<(MarkerWidth, usize)> {
    [MarkerWidth::Four, MarkerWidth::Eight]
        .into_iter()
        .find_map(|width| {
            let w = width.bytes();
            let leading = decode_marker(head.get(..w)?, width);
            if !is_valid_payload_len(leading) {
                return None;
            }
            let len = leading as usize;
            let trailing = decode_marker(head.get(w + len..2 * w + len)?, width);
            (trailing == leading).then_some((width, len))
        })
}

/// Sequential writer of uncompressed PHITS dump files.
pub struct DumpWriter {
    out: BufWriter<File>,
    path: PathBuf,
    marker_width: MarkerWidth,
    polarisation: bool,
    records_written: u64,
    buf: Vec<u8>,
}

impl DumpWriter {
    /// Creates (or overwrites) a dump file.
    pub fn create(
        path: impl AsRef<Path>,
        marker_width: MarkerWidth,
        polarisation: bool,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ConvertError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Created PHITS dump file {} ({} markers, polarisation: {})",
            path.display(),
            marker_width,
            polarisation
        );
        Ok(Self {
            out: BufWriter::new(file),
            path: path.to_path_buf(),
            marker_width,
            polarisation,
            records_written: 0,
            buf: Vec::with_capacity(DumpRecord::payload_len(true)),
        })
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Appends one framed record.
    pub fn write(&mut self, record: &DumpRecord) -> Result<()> {
        record.to_payload(self.polarisation, &mut self.buf);
        record::write_record(&mut self.out, self.marker_width, &self.buf)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flushes and closes the file, returning the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        debug!(
            "Finished PHITS dump file {} with {} records",
            self.path.display(),
            self.records_written
        );
        Ok(self.records_written)
    }
}
