use std::fs;
use std::path::Path;

use mcpl_phits::codec::compression::gzip_file;
use mcpl_phits::format::record::write_record;
use mcpl_phits::{ConvertError, DumpReader, DumpRecord, DumpWriter, MarkerWidth};
use tempfile::TempDir;

fn sample(i: usize) -> DumpRecord {
    let f = i as f64;
    DumpRecord {
        kf_code: 2112,
        position: [f, f + 0.5, -f],
        direction: [0.0, 0.0, 1.0],
        ekin: 1.0 + f,
        weight: 1.0,
        time: 10.0 * f,
        polarisation: [0.5, -0.5, 0.0],
    }
}

fn write_dump(path: &Path, width: MarkerWidth, polarisation: bool, n: usize) {
    let mut writer = DumpWriter::create(path, width, polarisation).unwrap();
    for i in 0..n {
        writer.write(&sample(i)).unwrap();
        assert_eq!(writer.records_written(), i as u64 + 1);
    }
    assert_eq!(writer.finish().unwrap(), n as u64);
}

#[test]
fn payload_lengths() {
    let mut buf = Vec::new();
    sample(1).to_payload(false, &mut buf);
    assert_eq!(buf.len(), 80);
    sample(1).to_payload(true, &mut buf);
    assert_eq!(buf.len(), 104);
    assert_eq!(&buf[..8], &2112.0f64.to_le_bytes());
}

#[test]
fn payload_without_polarisation_reads_zero_polarisation() {
    let mut buf = Vec::new();
    sample(3).to_payload(false, &mut buf);
    let record = DumpRecord::from_payload(&buf).unwrap();
    assert_eq!(record.polarisation, [0.0; 3]);
    assert_eq!(record.kf_code, 2112);
    assert_eq!(record.time, 30.0);
}

#[test]
fn payload_of_wrong_length_is_rejected() {
    for len in [0, 72, 81, 96, 112] {
        assert!(matches!(
            DumpRecord::from_payload(&vec![0u8; len]),
            Err(ConvertError::InvalidFormat(_))
        ));
    }
}

#[test]
fn reader_detects_layout() {
    let dir = TempDir::new().unwrap();
    for width in [MarkerWidth::Four, MarkerWidth::Eight] {
        for polarisation in [false, true] {
            let path = dir.path().join(format!("{}_{}.dmp", width.bytes(), polarisation));
            write_dump(&path, width, polarisation, 4);

            let mut reader = DumpReader::open(&path).unwrap();
            assert_eq!(reader.path(), path);
            assert_eq!(reader.marker_width(), width);
            assert_eq!(reader.has_polarisation(), polarisation);
            assert_eq!(reader.record_count(), Some(4));

            for i in 0..4 {
                let mut expected = sample(i);
                if !polarisation {
                    expected.polarisation = [0.0; 3];
                }
                assert_eq!(reader.read_record().unwrap(), Some(expected));
            }
            assert_eq!(reader.read_record().unwrap(), None);
        }
    }
}

#[test]
fn reader_handles_gzipped_dumps() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("particles.dmp");
    write_dump(&path, MarkerWidth::Four, true, 3);
    let gz = gzip_file(&path).unwrap();
    assert!(!path.exists());

    let reader = DumpReader::open(&gz).unwrap();
    assert!(reader.has_polarisation());
    assert_eq!(reader.record_count(), None);
    let records: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(records, (0..3).map(sample).collect::<Vec<_>>());
}

#[test]
fn empty_dump_has_no_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.dmp");
    fs::write(&path, b"").unwrap();

    let mut reader = DumpReader::open(&path).unwrap();
    assert_eq!(reader.record_count(), Some(0));
    assert_eq!(reader.read_record().unwrap(), None);
}

#[test]
fn unrecognised_first_record_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("text.dmp");
    let text = "this is certainly not a PHITS dump file at all, just text\n".repeat(3);
    fs::write(&path, text).unwrap();

    assert!(matches!(
        DumpReader::open(&path),
        Err(ConvertError::InvalidFormat(_))
    ));
}

#[test]
fn inconsistent_record_lengths_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.dmp");
    let mut bytes = Vec::new();
    let mut payload = Vec::new();
    sample(0).to_payload(false, &mut payload);
    write_record(&mut bytes, MarkerWidth::Four, &payload).unwrap();
    sample(1).to_payload(true, &mut payload);
    write_record(&mut bytes, MarkerWidth::Four, &payload).unwrap();
    fs::write(&path, &bytes).unwrap();

    let mut reader = DumpReader::open(&path).unwrap();
    assert_eq!(reader.record_count(), None);
    assert!(reader.read_record().unwrap().is_some());
    assert!(matches!(
        reader.read_record(),
        Err(ConvertError::InvalidFormat(_))
    ));
}

#[test]
fn truncated_dump_fails_on_the_last_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cut.dmp");
    write_dump(&path, MarkerWidth::Four, false, 2);
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 10);
    fs::write(&path, &bytes).unwrap();

    let mut reader = DumpReader::open(&path).unwrap();
    assert!(reader.read_record().unwrap().is_some());
    assert!(matches!(
        reader.read_record(),
        Err(ConvertError::Truncated { .. })
    ));
}
