//! Encoding of single MCPL particles.
//!
//! Field order, each float being `f32` or `f64` per the header:
//! ```text
//! [polx, poly, polz]            if polarisation is enabled
//! x, y, z
//! packed direction + ekin (3)   see codec::unit_vector
//!                               (version 2: octahedral direction (2), ekin)
//! time
//! [weight]                      unless a universal weight is set
//! [pdg code: i32]               unless a universal PDG code is set
//! [userflags: u32]              if userflags are enabled
//! ```

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::header::{FORMAT_VERSION, McplHeader};
use crate::codec::unit_vector;
use crate::types::error::Result;
use crate::types::models::Particle;

/// Encodes one particle in the current format version.
pub fn encode<W: Write>(header: &McplHeader, particle: &Particle, out: &mut W) -> Result<()> {
    let single = header.single_precision;
    if header.polarisation {
        for v in particle.polarisation {
            write_float(out, single, v)?;
        }
    }
    for v in particle.position {
        write_float(out, single, v)?;
    }
    for v in unit_vector::pack(particle.direction, particle.ekin) {
        write_float(out, single, v)?;
    }
    write_float(out, single, particle.time)?;
    if header.universal_weight.is_none() {
        write_float(out, single, particle.weight)?;
    }
    if header.universal_pdg_code == 0 {
        out.write_i32::<LittleEndian>(particle.pdg_code)?;
    }
    if header.userflags {
        out.write_u32::<LittleEndian>(0)?;
    }
    Ok(())
}

/// Decodes one particle. Userflags are read and discarded.
pub fn decode<R: Read>(header: &McplHeader, input: &mut R) -> Result<Particle> {
    let single = header.single_precision;
    let mut particle = Particle::default();
    if header.polarisation {
        particle.polarisation = read_triple(input, single)?;
    }
    particle.position = read_triple(input, single)?;
    let packed = read_triple(input, single)?;
    if header.version < FORMAT_VERSION {
        particle.direction = unit_vector::unpack_octahedral([packed[0], packed[1]]);
        particle.ekin = packed[2];
    } else {
        (particle.direction, particle.ekin) = unit_vector::unpack(packed);
    }
    particle.time = read_float(input, single)?;
    particle.weight = match header.universal_weight {
        Some(weight) => weight,
        None => read_float(input, single)?,
    };
    particle.pdg_code = match header.universal_pdg_code {
        0 => input.read_i32::<LittleEndian>()?,
        code => code,
    };
    if header.userflags {
        input.read_u32::<LittleEndian>()?;
    }
    Ok(particle)
}

fn write_float<W: Write>(out: &mut W, single: bool, value: f64) -> Result<()> {
    if single {
        out.write_f32::<LittleEndian>(value as f32)?;
    } else {
        out.write_f64::<LittleEndian>(value)?;
    }
    Ok(())
}

fn read_float<R: Read>(input: &mut R, single: bool) -> Result<f64> {
    Ok(if single {
        input.read_f32::<LittleEndian>()? as f64
    } else {
        input.read_f64::<LittleEndian>()?
    })
}

fn read_triple<R: Read>(input: &mut R, single: bool) -> Result<[f64; 3]> {
    Ok([
        read_float(input, single)?,
        read_float(input, single)?,
        read_float(input, single)?,
    ])
}
