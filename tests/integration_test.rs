use seqconv::convert::{self, ConvertOptions};
use seqconv::{ByteOrder, ErrorKind, Family, HeaderKind, LabelTable, SequenceContainer, SeqError, Version};
use std::fs;
use tempfile::tempdir;

fn sample() -> SequenceContainer {
    let mut c = SequenceContainer::new(Family::F);
    c.payload = vec![0x01, 0x02, 0x00, 0x00];
    c.labels = LabelTable::from_pairs([("intro", 0), ("loop", 2)]).unwrap();
    c
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
}

#[test]
fn test_end_to_end_labels_and_trim() {
    let bytes = sample().to_bytes().unwrap();
    let back = SequenceContainer::read(&bytes).unwrap();

    assert_eq!(back.payload, vec![0x01, 0x02]);
    assert_eq!(back.labels.get("intro"), Some(0));
    assert_eq!(back.labels.get("loop"), Some(2));

    // Label block at 0x60, table at 0x68; each reference resolves to its entry.
    let table = 0x68;
    assert_eq!(be_u32(&bytes, table), 2);
    for (i, (name, offset)) in [("intro", 0u32), ("loop", 2)].into_iter().enumerate() {
        let slot = table + 4 + i * 8;
        assert_eq!(&bytes[slot..slot + 4], &[0x51, 0x00, 0x00, 0x00]);
        let entry = table + be_u32(&bytes, slot + 4) as usize;
        assert_eq!(&bytes[entry..entry + 2], &[0x1F, 0x00]);
        assert_eq!(be_u32(&bytes, entry + 4), offset);
        assert_eq!(be_u32(&bytes, entry + 8) as usize, name.len());
        assert_eq!(&bytes[entry + 12..entry + 12 + name.len()], name.as_bytes());
        assert_eq!(bytes[entry + 12 + name.len()], 0);
    }
}

#[test]
fn test_rewrite_is_byte_identical() {
    let mut c = sample();
    c.payload = vec![0x10, 0x20, 0x30];
    let first = c.to_bytes().unwrap();
    let second = SequenceContainer::read(&first).unwrap().to_bytes().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_write_to_writer_matches_to_bytes() {
    let mut out = Vec::new();
    sample().write(&mut out).unwrap();
    assert_eq!(out, sample().to_bytes().unwrap());
    let back = SequenceContainer::from_reader(out.as_slice()).unwrap();
    assert_eq!(back.labels, sample().labels);
}

#[test]
fn test_convert_f_to_c_with_sidecar() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("song.bfseq");
    let output = dir.path().join("song.bcseq");
    convert::store(&sample(), &input).unwrap();

    let opts = ConvertOptions {
        family: Some(Family::C),
        version: Some(Version::new(1, 2, 3)),
        export_labels: true,
        ..Default::default()
    };
    let report = convert::convert(&input, &output, &opts).unwrap();
    assert_eq!(report.bytes_written, fs::metadata(&output).unwrap().len());

    let converted = convert::load(&output).unwrap();
    assert_eq!(converted.family, Family::C);
    assert_eq!(converted.byte_order, ByteOrder::Little);
    assert_eq!(converted.version, Version::new(1, 2, 3));
    assert_eq!(converted.payload, vec![0x01, 0x02]);

    let raw = fs::read(&output).unwrap();
    assert_eq!(&raw[..6], b"CSEQ\xFF\xFE");
    // Secondary layout, little-endian: 0x01020300.
    assert_eq!(&raw[8..12], &[0x00, 0x03, 0x02, 0x01]);

    let sidecar = report.labels_path.unwrap();
    assert_eq!(sidecar, dir.path().join("songLabels.txt"));
    assert_eq!(fs::read_to_string(sidecar).unwrap(), "intro: 0\nloop: 2\n");
}

#[test]
fn test_failed_conversion_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.bfseq");
    let output = dir.path().join("out.bcseq");

    let mut bytes = sample().to_bytes().unwrap();
    bytes[4] = 0x00;
    fs::write(&input, &bytes).unwrap();

    let err = convert::convert(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, SeqError::InvalidBom(_)));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_failed_sidecar_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("song.bfseq");
    let output = dir.path().join("out.bcseq");
    convert::store(&sample(), &input).unwrap();
    // A directory where the sidecar should go makes its commit fail.
    fs::create_dir(dir.path().join("outLabels.txt")).unwrap();

    let opts = ConvertOptions { export_labels: true, ..Default::default() };
    let err = convert::convert(&input, &output, &opts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!output.exists());
    // Only the input and the blocking directory remain; no stray temp files.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_truncated_input() {
    let bytes = sample().to_bytes().unwrap();
    let err = SequenceContainer::read(&bytes[..0x70]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
}

#[test]
fn test_inspect_all_header_kinds() {
    let dir = tempdir().unwrap();

    let typed = dir.path().join("a.bfseq");
    convert::store(&sample(), &typed).unwrap();
    let header = convert::inspect(&typed).unwrap();
    assert_eq!(header.kind, HeaderKind::Typed);
    assert_eq!(header.blocks.len(), 2);

    // SSEQ, little-endian, 0x10 header + 0x10 body.
    let mut legacy = b"SSEQ\xFF\xFE\x00\x01\x20\x00\x00\x00\x10\x00\x01\x00".to_vec();
    legacy.extend_from_slice(&[0xAA; 0x10]);
    let legacy_path = dir.path().join("b.sseq");
    fs::write(&legacy_path, &legacy).unwrap();
    let header = convert::inspect(&legacy_path).unwrap();
    assert_eq!(header.kind, HeaderKind::Legacy);
    assert_eq!(header.byte_order, ByteOrder::Little);
    assert_eq!(header.blocks[0].offset, 0x10);
    assert_eq!(header.blocks[0].size, 0x10);

    // RSEQ, big-endian, version 1.1, one block.
    let mut indexed = b"RSEQ\xFE\xFF\x01\x01\x00\x00\x00\x40\x00\x20\x00\x01".to_vec();
    indexed.extend_from_slice(&[0, 0, 0, 0x20, 0, 0, 0, 0x20]);
    indexed.resize(0x40, 0);
    let indexed_path = dir.path().join("c.brseq");
    fs::write(&indexed_path, &indexed).unwrap();
    let header = convert::inspect(&indexed_path).unwrap();
    assert_eq!(header.kind, HeaderKind::Indexed);
    assert_eq!(header.version, Version::new(1, 1, 0));
    assert_eq!(header.blocks[0].offset, 0x20);
}

#[test]
fn test_switch_byte_order_round_trip() {
    let mut c = sample();
    c.byte_order = ByteOrder::Little;
    c.payload = vec![0xFF; 0x21];
    let back = SequenceContainer::read(&c.to_bytes().unwrap()).unwrap();
    assert_eq!(back, c);
    assert_eq!(back.platform(), seqconv::Platform::Nx);
}
