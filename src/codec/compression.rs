//! Whole-file gzip compression.
//!
//! Output files are compressed only after they were completely written and
//! closed; nothing is ever streamed through the encoder while converting.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, trace};

use crate::types::error::{ConvertError, Result};

/// Returns `path` with `.gz` appended to its file name.
pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Whether `path` names a gzipped file, judged by a `.gz` extension in any case.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Compresses `path` into `path.gz` and removes the original.
///
/// On failure the original is left untouched and any partial `.gz` removed.
pub fn gzip_file(path: &Path) -> Result<PathBuf> {
    let target = gz_path(path);
    debug!("Compressing {} into {}", path.display(), target.display());
    match compress_into(path, &target) {
        Ok(bytes) => {
            trace!("Compressed {} bytes", bytes);
            fs::remove_file(path)?;
            Ok(target)
        }
        Err(e) => {
            let _ = fs::remove_file(&target);
            Err(e)
        }
    }
}

fn compress_into(source: &Path, target: &Path) -> Result<u64> {
    let input = File::open(source).map_err(|source_err| ConvertError::Open {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    let output = File::create(target).map_err(|source_err| ConvertError::Open {
        path: target.to_path_buf(),
        source: source_err,
    })?;
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    let bytes = io::copy(&mut BufReader::new(input), &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(bytes)
}
