use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info, warn};

use super::header::{self, McplHeader, PARTICLE_COUNT_OFFSET};
use super::particle;
use crate::codec::compression;
use crate::types::error::{ConvertError, Result};
use crate::types::models::Particle;

/// Append-only writer of MCPL files.
///
/// Header settings may be changed until the first particle is added; the
/// header is written at that point and the particle count is patched in
/// when the writer is closed.
#[derive(Debug)]
pub struct McplWriter {
    out: BufWriter<File>,
    path: PathBuf,
    header: McplHeader,
    header_written: bool,
}

impl McplWriter {
    /// Creates (or overwrites) an MCPL file.
    ///
    /// `.mcpl` is appended to the file name unless already present, so the
    /// actual location is available from [`output_path`](Self::output_path).
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = with_mcpl_extension(path.as_ref());
        let file = File::create(&path).map_err(|source| ConvertError::Open {
            path: path.clone(),
            source,
        })?;
        debug!("Created MCPL file {}", path.display());
        Ok(Self {
            out: BufWriter::new(file),
            path,
            header: McplHeader::default(),
            header_written: false,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &McplHeader {
        &self.header
    }

    pub fn set_source_name(&mut self, name: &str) -> Result<()> {
        self.header_mut("set the source name")?.source_name = name.to_string();
        Ok(())
    }

    pub fn add_comment(&mut self, comment: &str) -> Result<()> {
        self.header_mut("add a comment")?.comments.push(comment.to_string());
        Ok(())
    }

    pub fn enable_double_precision(&mut self) -> Result<()> {
        self.header_mut("enable double precision")?.single_precision = false;
        Ok(())
    }

    pub fn enable_polarisation(&mut self) -> Result<()> {
        self.header_mut("enable polarisation")?.polarisation = true;
        Ok(())
    }

    /// Attaches a named binary blob to the header. Keys must be unique.
    pub fn add_blob(&mut self, key: &str, data: &[u8]) -> Result<()> {
        header::length_u32(data.len(), "blob length")?;
        let header = self.header_mut("add a blob")?;
        if header.blob(key).is_some() {
            return Err(ConvertError::InvalidArgument(format!(
                "duplicate MCPL blob key \"{}\"",
                key
            )));
        }
        header.blobs.push((key.to_string(), data.to_vec()));
        Ok(())
    }

    /// Appends one particle, writing the header first if needed.
    pub fn add_particle(&mut self, particle: &Particle) -> Result<()> {
        self.ensure_header_written()?;
        particle::encode(&self.header, particle, &mut self.out)?;
        self.header.particle_count += 1;
        Ok(())
    }

    pub fn particle_count(&self) -> u64 {
        self.header.particle_count
    }

    /// Finishes the file and records the final particle count.
    pub fn close(mut self) -> Result<PathBuf> {
        self.ensure_header_written()?;
        self.out.flush()?;
        self.out.seek(SeekFrom::Start(PARTICLE_COUNT_OFFSET))?;
        self.out.write_u64::<LittleEndian>(self.header.particle_count)?;
        self.out.flush()?;
        info!(
            "Closed MCPL file {} with {} particles",
            self.path.display(),
            self.header.particle_count
        );
        Ok(self.path)
    }

    /// Closes the file and then gzips it, returning whether compression happened.
    ///
    /// A failed compression is logged and leaves the uncompressed file in place.
    pub fn close_and_gzip(self) -> Result<bool> {
        let path = self.close()?;
        match compression::gzip_file(&path) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Could not gzip {}: {}", path.display(), e);
                Ok(false)
            }
        }
    }

    fn header_mut(&mut self, action: &str) -> Result<&mut McplHeader> {
        if self.header_written {
            return Err(ConvertError::InvalidState(format!(
                "cannot {} after particles were added to {}",
                action,
                self.path.display()
            )));
        }
        Ok(&mut self.header)
    }

    fn ensure_header_written(&mut self) -> Result<()> {
        if !self.header_written {
            self.header.write(&mut self.out)?;
            self.header_written = true;
        }
        Ok(())
    }
}

fn with_mcpl_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "mcpl") {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".mcpl");
    PathBuf::from(name)
}
