use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::{debug, info};

use super::header::McplHeader;
use super::particle;
use crate::codec::compression;
use crate::format::record::read_up_to;
use crate::types::error::{ConvertError, Result};
use crate::types::models::Particle;

/// Sequential reader of MCPL files, optionally gzipped.
pub struct McplReader {
    input: Box<dyn Read>,
    path: PathBuf,
    header: McplHeader,
    particles_read: u64,
    buf: Vec<u8>,
}

impl McplReader {
    /// Opens an MCPL file and parses its header.
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening MCPL file: {}", path.display());
        let file = File::open(path).map_err(|source| ConvertError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut input: Box<dyn Read> = if compression::is_gzip_path(path) {
            debug!("Decompressing {} with gzip", path.display());
            Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file))))
        } else {
            Box::new(BufReader::new(file))
        };
        let header = McplHeader::read(&mut input)?;
        let buf = vec![0u8; header.particle_size()];
        Ok(Self {
            input,
            path: path.to_path_buf(),
            header,
            particles_read: 0,
            buf,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &McplHeader {
        &self.header
    }

    pub fn source_name(&self) -> &str {
        &self.header.source_name
    }

    pub fn comments(&self) -> &[String] {
        &self.header.comments
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.header.blob(key)
    }

    /// Particle count declared in the header.
    pub fn particle_count(&self) -> u64 {
        self.header.particle_count
    }

    pub fn has_polarisation(&self) -> bool {
        self.header.polarisation
    }

    pub fn is_double_precision(&self) -> bool {
        !self.header.single_precision
    }

    /// Reads the next particle, or `None` once the declared count is exhausted.
    pub fn read_particle(&mut self) -> Result<Option<Particle>> {
        if self.particles_read >= self.header.particle_count {
            return Ok(None);
        }
        let got = read_up_to(&mut self.input, &mut self.buf)?;
        if got != self.buf.len() {
            return Err(ConvertError::Truncated {
                context: "MCPL particle",
                expected: self.buf.len() as u64,
                found: got as u64,
            });
        }
        let particle = particle::decode(&self.header, &mut self.buf.as_slice())?;
        self.particles_read += 1;
        Ok(Some(particle))
    }
}

impl Iterator for McplReader {
    type Item = Result<Particle>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_particle().transpose()
    }
}
