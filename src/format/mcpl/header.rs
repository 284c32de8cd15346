//! MCPL file header.
//!
//! # Header Structure
//! ```text
//! [4 bytes]  Magic "MCPL"
//! [3 bytes]  Format version as ASCII digits ("003", "002" is read too)
//! [1 byte]   Endianness of all numbers ('L')
//! [8 bytes]  Particle count (u64, patched when the writer closes)
//! [4 bytes]  x8: ncomments, nblobs, userflags flag, polarisation flag,
//!            single-precision flag, universal PDG code (i32),
//!            particle size in bytes, universal weight flag
//! [8 bytes]  Universal weight (f64), only if the flag is set
//! [...]      Source name, comments, blob keys, blob payloads;
//!            each one a u32 length followed by that many bytes
//! ```

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};

use crate::types::error::{ConvertError, Result};

pub const MAGIC: &[u8; 4] = b"MCPL";
/// Version written by [`McplWriter`](super::McplWriter).
pub const FORMAT_VERSION: u32 = 3;
/// Oldest version that can still be read.
pub const OLDEST_READABLE_VERSION: u32 = 2;
/// Byte offset of the particle count, patched when a writer closes.
pub const PARTICLE_COUNT_OFFSET: u64 = 8;

/// Everything stored ahead of the first particle.
#[derive(Debug, Clone, PartialEq)]
pub struct McplHeader {
    pub version: u32,
    pub particle_count: u64,
    pub source_name: String,
    pub comments: Vec<String>,
    /// Named binary attachments in insertion order.
    pub blobs: Vec<(String, Vec<u8>)>,
    pub userflags: bool,
    pub polarisation: bool,
    pub single_precision: bool,
    /// PDG code shared by every particle, 0 if stored per particle.
    pub universal_pdg_code: i32,
    /// Weight shared by every particle, `None` if stored per particle.
    pub universal_weight: Option<f64>,
}

impl Default for McplHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            particle_count: 0,
            source_name: String::new(),
            comments: Vec::new(),
            blobs: Vec::new(),
            userflags: false,
            polarisation: false,
            single_precision: true,
            universal_pdg_code: 0,
            universal_weight: None,
        }
    }
}

impl McplHeader {
    pub fn float_size(&self) -> usize {
        if self.single_precision { 4 } else { 8 }
    }

    /// Size of one encoded particle in bytes.
    pub fn particle_size(&self) -> usize {
        let mut nfloats = 3 + 3 + 1; // position, packed direction + ekin, time
        if self.polarisation {
            nfloats += 3;
        }
        if self.universal_weight.is_none() {
            nfloats += 1;
        }
        let mut size = nfloats * self.float_size();
        if self.universal_pdg_code == 0 {
            size += 4;
        }
        if self.userflags {
            size += 4;
        }
        size
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data.as_slice())
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        trace!(
            "Writing MCPL header: {} comments, {} blobs, particle size {}",
            self.comments.len(),
            self.blobs.len(),
            self.particle_size()
        );
        out.write_all(MAGIC)?;
        out.write_all(format!("{:03}", self.version).as_bytes())?;
        out.write_u8(b'L')?;
        out.write_u64::<LittleEndian>(self.particle_count)?;

        out.write_u32::<LittleEndian>(length_u32(self.comments.len(), "comment count")?)?;
        out.write_u32::<LittleEndian>(length_u32(self.blobs.len(), "blob count")?)?;
        out.write_u32::<LittleEndian>(self.userflags as u32)?;
        out.write_u32::<LittleEndian>(self.polarisation as u32)?;
        out.write_u32::<LittleEndian>(self.single_precision as u32)?;
        out.write_i32::<LittleEndian>(self.universal_pdg_code)?;
        out.write_u32::<LittleEndian>(self.particle_size() as u32)?;
        out.write_u32::<LittleEndian>(self.universal_weight.is_some() as u32)?;
        if let Some(weight) = self.universal_weight {
            out.write_f64::<LittleEndian>(weight)?;
        }

        write_bytes(out, self.source_name.as_bytes())?;
        for comment in &self.comments {
            write_bytes(out, comment.as_bytes())?;
        }
        for (key, _) in &self.blobs {
            write_bytes(out, key.as_bytes())?;
        }
        for (_, data) in &self.blobs {
            write_bytes(out, data)?;
        }
        Ok(())
    }

    /// Parses a header from the very start of an MCPL stream.
    pub fn read<R: Read>(input: &mut R) -> Result<Self> {
        let mut start = [0u8; 8];
        input.read_exact(&mut start)?;
        if &start[..4] != MAGIC {
            return Err(ConvertError::InvalidFormat("not an MCPL file (bad magic)".to_string()));
        }
        let version: u32 = std::str::from_utf8(&start[4..7])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                ConvertError::InvalidFormat("unreadable MCPL format version".to_string())
            })?;
        if !(OLDEST_READABLE_VERSION..=FORMAT_VERSION).contains(&version) {
            return Err(ConvertError::InvalidFormat(format!(
                "unsupported MCPL format version {} (versions {} to {} are supported)",
                version, OLDEST_READABLE_VERSION, FORMAT_VERSION
            )));
        }
        if start[7] != b'L' {
            return Err(ConvertError::InvalidFormat(format!(
                "unsupported MCPL endianness marker '{}' (only little-endian files are supported)",
                start[7] as char
            )));
        }

        let particle_count = input.read_u64::<LittleEndian>()?;
        let ncomments = input.read_u32::<LittleEndian>()?;
        let nblobs = input.read_u32::<LittleEndian>()?;
        let userflags = input.read_u32::<LittleEndian>()? != 0;
        let polarisation = input.read_u32::<LittleEndian>()? != 0;
        let single_precision = input.read_u32::<LittleEndian>()? != 0;
        let universal_pdg_code = input.read_i32::<LittleEndian>()?;
        let particle_size = input.read_u32::<LittleEndian>()?;
        let universal_weight = match input.read_u32::<LittleEndian>()? {
            0 => None,
            _ => Some(input.read_f64::<LittleEndian>()?),
        };

        let source_name = read_string(input, "source name")?;
        let comments = (0..ncomments)
            .map(|_| read_string(input, "comment"))
            .collect::<Result<Vec<_>>>()?;
        let keys = (0..nblobs)
            .map(|_| read_string(input, "blob key"))
            .collect::<Result<Vec<_>>>()?;
        let blobs = keys
            .into_iter()
            .map(|key| Ok((key, read_bytes(input, "blob")?)))
            .collect::<Result<Vec<_>>>()?;

        let header = Self {
            version,
            particle_count,
            source_name,
            comments,
            blobs,
            userflags,
            polarisation,
            single_precision,
            universal_pdg_code,
            universal_weight,
        };
        if header.particle_size() != particle_size as usize {
            return Err(ConvertError::InvalidFormat(format!(
                "MCPL header declares particle size {} but its flags imply {}",
                particle_size,
                header.particle_size()
            )));
        }
        debug!(
            "MCPL header: source='{}', {} particles, polarisation={}, single precision={}",
            header.source_name, header.particle_count, header.polarisation, header.single_precision
        );
        Ok(header)
    }
}

pub(crate) fn length_u32(len: usize, context: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        ConvertError::InvalidArgument(format!("{} of {} exceeds the MCPL limit", context, len))
    })
}

fn write_bytes<W: Write>(out: &mut W, data: &[u8]) -> Result<()> {
    out.write_u32::<LittleEndian>(length_u32(data.len(), "header entry length")?)?;
    out.write_all(data)?;
    Ok(())
}

fn read_bytes<R: Read>(input: &mut R, context: &'static str) -> Result<Vec<u8>> {
    let len = input.read_u32::<LittleEndian>()? as u64;
    let mut data = Vec::new();
    let found = input.by_ref().take(len).read_to_end(&mut data)? as u64;
    if found != len {
        return Err(ConvertError::Truncated {
            context,
            expected: len,
            found,
        });
    }
    Ok(data)
}

fn read_string<R: Read>(input: &mut R, context: &'static str) -> Result<String> {
    let bytes = read_bytes(input, context)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
