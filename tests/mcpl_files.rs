use std::fs;

use mcpl_phits::codec::compression::gzip_file;
use mcpl_phits::codec::unit_vector::{pack, unpack, unpack_octahedral};
use mcpl_phits::format::mcpl::header::FORMAT_VERSION;
use mcpl_phits::{ConvertError, McplReader, McplWriter, Particle};
use tempfile::TempDir;

fn particle(pdg_code: i32, i: usize) -> Particle {
    let f = i as f64;
    Particle {
        pdg_code,
        position: [f, 2.0 * f, -3.0 * f],
        direction: [0.48, -0.6, 0.64],
        polarisation: [0.25, 0.5, -0.75],
        ekin: 0.5 + f,
        weight: 1.5,
        time: 0.25 * f,
    }
}

fn assert_direction_close(actual: [f64; 3], expected: [f64; 3], tolerance: f64) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() <= tolerance, "{:?} differs from {:?}", actual, expected);
    }
}

#[test]
fn unit_vector_packing_round_trips() {
    let directions = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.48, 0.6, 0.64],
        [0.64, -0.48, -0.6],
        [-0.6, 0.64, 0.48],
        [0.6, 0.8, 0.0],
    ];
    for direction in directions {
        for ekin in [0.0, 2.5] {
            let (unpacked, e) = unpack(pack(direction, ekin));
            assert_eq!(e, ekin);
            assert_direction_close(unpacked, direction, 1e-12);
        }
    }
}

#[test]
fn header_and_particles_round_trip_in_double_precision() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("out.mcpl")).unwrap();
    writer.set_source_name("unit test").unwrap();
    writer.add_comment("first comment").unwrap();
    writer.add_comment("second comment").unwrap();
    writer.enable_double_precision().unwrap();
    writer.enable_polarisation().unwrap();
    writer.add_blob("notes", b"some bytes\x00\x01").unwrap();
    for i in 0..3 {
        writer.add_particle(&particle(22, i)).unwrap();
    }
    assert_eq!(writer.particle_count(), 3);
    let path = writer.close().unwrap();

    let mut reader = McplReader::open(&path).unwrap();
    assert_eq!(reader.path(), path);
    assert_eq!(reader.header().version, FORMAT_VERSION);
    assert_eq!(reader.source_name(), "unit test");
    assert_eq!(reader.comments(), ["first comment", "second comment"]);
    assert_eq!(reader.blob("notes"), Some(&b"some bytes\x00\x01"[..]));
    assert_eq!(reader.blob("absent"), None);
    assert_eq!(reader.particle_count(), 3);
    assert!(reader.has_polarisation());
    assert!(reader.is_double_precision());

    for i in 0..3 {
        let expected = particle(22, i);
        let actual = reader.read_particle().unwrap().unwrap();
        assert_eq!(actual.pdg_code, expected.pdg_code);
        assert_eq!(actual.position, expected.position);
        assert_eq!(actual.polarisation, expected.polarisation);
        assert_eq!(actual.ekin, expected.ekin);
        assert_eq!(actual.weight, expected.weight);
        assert_eq!(actual.time, expected.time);
        assert_direction_close(actual.direction, expected.direction, 1e-12);
    }
    assert!(reader.read_particle().unwrap().is_none());
}

#[test]
fn single_precision_is_the_default() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("single.mcpl")).unwrap();
    writer.add_particle(&particle(2112, 1)).unwrap();
    let path = writer.close().unwrap();

    let mut reader = McplReader::open(&path).unwrap();
    assert!(!reader.is_double_precision());
    assert!(!reader.has_polarisation());
    // Header size is fixed here: 8 + 8 + 32 bytes plus an empty source name
    let particle_size = reader.header().particle_size();
    assert_eq!(particle_size, 8 * 4 + 4);
    assert_eq!(fs::metadata(&path).unwrap().len(), 48 + 4 + particle_size as u64);

    let p = reader.read_particle().unwrap().unwrap();
    assert_eq!(p.pdg_code, 2112);
    assert_eq!(p.polarisation, [0.0; 3]);
    assert!((p.ekin - 1.5).abs() < 1e-6);
    assert_direction_close(p.direction, [0.48, -0.6, 0.64], 1e-6);
}

#[test]
fn mcpl_extension_is_appended() {
    let dir = TempDir::new().unwrap();
    let writer = McplWriter::create(dir.path().join("particles")).unwrap();
    let expected = dir.path().join("particles.mcpl");
    assert_eq!(writer.output_path(), expected);
    assert_eq!(writer.close().unwrap(), expected);
    assert!(expected.exists());

    let reader = McplReader::open(&expected).unwrap();
    assert_eq!(reader.particle_count(), 0);
}

#[test]
fn header_is_frozen_after_first_particle() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("frozen.mcpl")).unwrap();
    writer.add_particle(&particle(11, 0)).unwrap();
    assert!(matches!(
        writer.add_comment("too late"),
        Err(ConvertError::InvalidState(_))
    ));
    assert!(matches!(
        writer.enable_polarisation(),
        Err(ConvertError::InvalidState(_))
    ));
}

#[test]
fn duplicate_blob_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("blobs.mcpl")).unwrap();
    writer.add_blob("deck", b"one").unwrap();
    assert!(matches!(
        writer.add_blob("deck", b"two"),
        Err(ConvertError::InvalidArgument(_))
    ));
}

#[test]
fn gzipped_output_is_readable() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("zipped.mcpl")).unwrap();
    for i in 0..5 {
        writer.add_particle(&particle(-11, i)).unwrap();
    }
    assert!(writer.close_and_gzip().unwrap());
    assert!(!dir.path().join("zipped.mcpl").exists());

    let reader = McplReader::open(dir.path().join("zipped.mcpl.gz")).unwrap();
    assert_eq!(reader.particle_count(), 5);
    let particles: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(particles.len(), 5);
    assert!(particles.iter().all(|p| p.pdg_code == -11));
}

#[test]
fn foreign_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.mcpl");
    fs::write(&path, b"NOTMCPL-and-some-more-bytes-to-fill-the-header-area").unwrap();
    assert!(matches!(
        McplReader::open(&path),
        Err(ConvertError::InvalidFormat(_))
    ));

    for version in [b"MCPL001L", b"MCPL004L"] {
        fs::write(&path, version).unwrap();
        assert!(matches!(
            McplReader::open(&path),
            Err(ConvertError::InvalidFormat(_))
        ));
    }
}

#[test]
fn truncated_particle_data_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("cut.mcpl")).unwrap();
    writer.add_particle(&particle(11, 0)).unwrap();
    writer.add_particle(&particle(11, 1)).unwrap();
    let path = writer.close().unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&path, &bytes).unwrap();

    let mut reader = McplReader::open(&path).unwrap();
    assert!(reader.read_particle().unwrap().is_some());
    assert!(matches!(
        reader.read_particle(),
        Err(ConvertError::Truncated { .. })
    ));
}

/// Double precision file without polarisation, userflags or universal values.
fn mcpl_file(version: &[u8; 3], source_name: &str, particles: &[[f64; 8]], pdg: i32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MCPL");
    bytes.extend_from_slice(version);
    bytes.push(b'L');
    bytes.extend_from_slice(&(particles.len() as u64).to_le_bytes());
    // ncomments, nblobs, userflags, polarisation, single precision, universal pdg
    for value in [0u32, 0, 0, 0, 0, 0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.extend_from_slice(&68u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&(source_name.len() as u32).to_le_bytes());
    bytes.extend_from_slice(source_name.as_bytes());
    for fields in particles {
        for value in fields {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&pdg.to_le_bytes());
    }
    bytes
}

#[test]
fn writer_matches_the_published_layout() {
    // x, y, z, 1/z in place of x, y, -ekin (x is negative), time, weight
    let fields = [1.0, 2.0, 3.0, 1.0 / 0.6, 0.0, -2.5, 0.5, 2.0];
    let expected = mcpl_file(b"003", "G4", &[fields], 2112);

    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("layout.mcpl")).unwrap();
    writer.set_source_name("G4").unwrap();
    writer.enable_double_precision().unwrap();
    let particle = Particle {
        pdg_code: 2112,
        position: [1.0, 2.0, 3.0],
        direction: [-0.8, 0.0, 0.6],
        ekin: 2.5,
        time: 0.5,
        weight: 2.0,
        ..Default::default()
    };
    writer.add_particle(&particle).unwrap();
    let path = writer.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), expected);

    let read = McplReader::open(&path).unwrap().read_particle().unwrap().unwrap();
    assert_eq!(read.ekin, 2.5);
    assert_direction_close(read.direction, [-0.8, 0.0, 0.6], 1e-12);
}

#[test]
fn octahedral_unpacking() {
    assert_direction_close(unpack_octahedral([0.0, 0.0]), [0.0, 0.0, 1.0], 1e-15);
    assert_direction_close(unpack_octahedral([1.0, 0.0]), [1.0, 0.0, 0.0], 1e-15);
    assert_direction_close(unpack_octahedral([0.0, -1.0]), [0.0, -1.0, 0.0], 1e-15);
    assert_direction_close(unpack_octahedral([3.0 / 7.0, 0.0]), [0.6, 0.0, 0.8], 1e-12);
    assert_direction_close(unpack_octahedral([1.0, 4.0 / 7.0]), [0.6, 0.0, -0.8], 1e-12);
    assert_direction_close(unpack_octahedral([-1.0, -4.0 / 7.0]), [-0.6, 0.0, -0.8], 1e-12);
}

#[test]
fn version_2_files_are_readable() {
    // x, y, z, octahedral u, v, ekin, time, weight
    let particles = [
        [1.0, 2.0, 3.0, 3.0 / 7.0, 0.0, 4.0, 0.5, 1.0],
        [-1.0, 0.0, 5.0, 1.0, 4.0 / 7.0, 0.25, 1.5, 0.75],
    ];
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.mcpl");
    fs::write(&path, mcpl_file(b"002", "legacy", &particles, 22)).unwrap();

    let mut reader = McplReader::open(&path).unwrap();
    assert_eq!(reader.header().version, 2);
    assert_eq!(reader.source_name(), "legacy");
    assert_eq!(reader.particle_count(), 2);

    let first = reader.read_particle().unwrap().unwrap();
    assert_eq!(first.pdg_code, 22);
    assert_eq!(first.position, [1.0, 2.0, 3.0]);
    assert_eq!(first.ekin, 4.0);
    assert_eq!(first.time, 0.5);
    assert_eq!(first.weight, 1.0);
    assert_direction_close(first.direction, [0.6, 0.0, 0.8], 1e-12);

    let second = reader.read_particle().unwrap().unwrap();
    assert_eq!(second.ekin, 0.25);
    assert_direction_close(second.direction, [0.6, 0.0, -0.8], 1e-12);
    assert!(reader.read_particle().unwrap().is_none());
}

#[test]
fn gzip_extension_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let mut writer = McplWriter::create(dir.path().join("upper.mcpl")).unwrap();
    writer.add_particle(&particle(11, 0)).unwrap();
    let gz = gzip_file(&writer.close().unwrap()).unwrap();
    let upper = dir.path().join("UPPER.MCPL.GZ");
    fs::rename(&gz, &upper).unwrap();

    let mut reader = McplReader::open(&upper).unwrap();
    assert_eq!(reader.particle_count(), 1);
    assert_eq!(reader.read_particle().unwrap().unwrap().pdg_code, 11);
}
