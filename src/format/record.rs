//! Fortran unformatted sequential record framing.
//!
//! # Record Structure
//! ```text
//! [4|8 bytes] Payload length (little-endian unsigned)
//! [N bytes]   Payload
//! [4|8 bytes] Payload length again, must equal the leading marker
//! ```

use std::io::{ErrorKind, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::trace;

use crate::types::error::{ConvertError, Result};
use crate::types::models::MarkerWidth;

/// Writes one framed record.
///
/// A short write on any of the three parts is returned as an error; the
/// stream is left as it is and must be considered corrupt.
pub fn write_record<W: Write>(out: &mut W, width: MarkerWidth, payload: &[u8]) -> Result<()> {
    let len = payload.len() as u64;
    if len > width.max_payload() {
        return Err(ConvertError::InvalidArgument(format!(
            "record of {} bytes does not fit in a {} marker",
            len, width
        )));
    }
    write_marker(out, width, len)?;
    out.write_all(payload)?;
    write_marker(out, width, len)?;
    Ok(())
}

/// Reads one framed record into `payload`.
///
/// Returns `Ok(false)` if the stream ended cleanly before a new record.
/// A short payload or trailing marker is a `Truncated` error and a trailing
/// marker that differs from the leading one is a `MarkerMismatch`.
pub fn read_record<R: Read>(
    input: &mut R,
    width: MarkerWidth,
    payload: &mut Vec<u8>,
) -> Result<bool> {
    let Some(leading) = read_marker(input, width)? else {
        return Ok(false);
    };
    read_record_body(input, width, leading, payload)?;
    Ok(true)
}

/// Reads the payload and trailing marker of a record whose leading marker,
/// `leading`, has already been consumed.
pub fn read_record_body<R: Read>(
    input: &mut R,
    width: MarkerWidth,
    leading: u64,
    payload: &mut Vec<u8>,
) -> Result<()> {
    trace!("Reading record body of {} bytes", leading);
    payload.clear();
    let found = input.by_ref().take(leading).read_to_end(payload)? as u64;
    if found != leading {
        return Err(ConvertError::Truncated {
            context: "record payload",
            expected: leading,
            found,
        });
    }

    let trailing = read_marker(input, width)?.ok_or(ConvertError::Truncated {
        context: "trailing record marker",
        expected: width.bytes() as u64,
        found: 0,
    })?;
    if trailing != leading {
        return Err(ConvertError::MarkerMismatch { leading, trailing });
    }
    Ok(())
}

/// Reads a single marker, or `None` at a clean end of stream.
pub fn read_marker<R: Read>(input: &mut R, width: MarkerWidth) -> Result<Option<u64>> {
    let mut buf = [0u8; 8];
    let wanted = width.bytes();
    let got = read_up_to(input, &mut buf[..wanted])?;
    if got == 0 {
        return Ok(None);
    }
    if got < wanted {
        return Err(ConvertError::Truncated {
            context: "record marker",
            expected: wanted as u64,
            found: got as u64,
        });
    }
    Ok(Some(decode_marker(&buf[..wanted], width)))
}

/// Interprets `bytes` (exactly `width.bytes()` long) as a marker value.
pub fn decode_marker(bytes: &[u8], width: MarkerWidth) -> u64 {
    match width {
        MarkerWidth::Four => LittleEndian::read_u32(bytes) as u64,
        MarkerWidth::Eight => LittleEndian::read_u64(bytes),
    }
}

fn write_marker<W: Write>(out: &mut W, width: MarkerWidth, value: u64) -> Result<()> {
    match width {
        MarkerWidth::Four => out.write_u32::<LittleEndian>(value as u32)?,
        MarkerWidth::Eight => out.write_u64::<LittleEndian>(value)?,
    }
    Ok(())
}

/// Fills as much of `buf` as the stream allows, returning the byte count.
pub(crate) fn read_up_to<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
