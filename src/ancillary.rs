//! Loading of ancillary text files embedded into MCPL headers.
//!
//! The PHITS input deck and dump summary file can be attached to the MCPL
//! output. Both checks applied here are deliberately weak: a byte-range text
//! heuristic and the presence of the word `dump`. They catch a wrong file
//! passed by mistake without ever rejecting a legitimate one.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::types::error::{ConvertError, Result};

/// Files below this size are rejected as suspiciously short.
pub const MIN_FILE_SIZE: u64 = 50;
/// Files above this size (100 MiB) are rejected as too large.
pub const MAX_FILE_SIZE: u64 = 104_857_600;
/// Word that must occur in both the input deck and the dump summary file.
pub const DUMP_KEYWORD: &str = "dump";

/// Classifies `bytes` as probably text.
///
/// Accepts 9..=13, 32..=126 and every byte >= 128, so ASCII and UTF-8 pass.
/// UTF-16/32 text is reported as binary, and binary data made only of
/// accepted bytes is reported as text.
pub fn is_probably_text(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| (9..=13).contains(&b) || (32..=126).contains(&b) || b >= 128)
}

/// Reads a whole file subject to the size bounds, optionally requiring text.
pub fn load_file(path: &Path, require_text: bool) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file.metadata()?.len();
    if size < MIN_FILE_SIZE {
        return Err(ConvertError::FileTooShort {
            path: path.to_path_buf(),
            size,
        });
    }
    if size > MAX_FILE_SIZE {
        return Err(ConvertError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    let mut data = Vec::with_capacity(size as usize);
    (&mut file).take(MAX_FILE_SIZE + 1).read_to_end(&mut data)?;
    if data.len() as u64 > MAX_FILE_SIZE {
        return Err(ConvertError::FileTooLarge {
            path: path.to_path_buf(),
            size: data.len() as u64,
            limit: MAX_FILE_SIZE,
        });
    }

    if require_text && !is_probably_text(&data) {
        return Err(ConvertError::NotText {
            path: path.to_path_buf(),
        });
    }
    debug!("Loaded {} ({} bytes)", path.display(), data.len());
    Ok(data)
}

/// Loads a PHITS input deck or dump summary file for embedding.
///
/// The file must be text and contain the word `dump` somewhere.
pub fn load_dump_companion(path: &Path) -> Result<Vec<u8>> {
    let data = load_file(path, true)?;
    let keyword = DUMP_KEYWORD.as_bytes();
    if !data.windows(keyword.len()).any(|w| w == keyword) {
        return Err(ConvertError::MissingKeyword {
            path: path.to_path_buf(),
            keyword: DUMP_KEYWORD,
        });
    }
    Ok(data)
}
