use super::*;

fn get_str(oracle: &mut MetaOracle, name: &str) -> String {
    oracle
        .get(name)
        .expect("Failed to query oracle")
        .as_str()
        .expect("Field is not a string")
        .to_owned()
}

// --- Field Tests ---

#[test]
fn test_size_and_index() {
    let mut chunk = Chunk::new(&b"hello"[..]);
    chunk.index = 3;
    let mut oracle = oracle(&chunk);

    assert_eq!(oracle.get("size").unwrap(), Value::Int(5));
    assert_eq!(oracle.get("index").unwrap(), Value::Int(3));
}

#[test]
fn test_unknown_field() {
    let chunk = Chunk::new(&b"hello"[..]);
    let mut oracle = oracle(&chunk);

    let result = oracle.get("sha512");

    assert!(
        matches!(result, Err(Error::UnknownField(ref name)) if name == "sha512"),
        "Unknown field must fail with UnknownField, got {:?}",
        result
    );
}

#[test]
fn test_field_names_round_trip() {
    for field in Field::ALL {
        assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
    }
}

#[test]
fn test_digests_of_known_input() {
    let chunk = Chunk::new(&b"abc"[..]);
    let mut oracle = oracle(&chunk);

    assert_eq!(get_str(&mut oracle, "crc32"), "352441c2");
    assert_eq!(get_str(&mut oracle, "md5"), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(
        get_str(&mut oracle, "sha1"),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        get_str(&mut oracle, "sha256"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_digests_of_empty_input() {
    let chunk = Chunk::new(Bytes::new());
    let mut oracle = oracle(&chunk);

    assert_eq!(get_str(&mut oracle, "crc32"), "00000000");
    assert_eq!(get_str(&mut oracle, "md5"), "d41d8cd98f00b204e9800998ecf8427e");
}

// --- Entropy Tests ---

#[test]
fn test_entropy_bounds() {
    assert_eq!(entropy(&[]), 0.0, "Empty input has zero entropy");
    assert_eq!(entropy(&[7u8; 100]), 0.0, "Constant input has zero entropy");

    let uniform: Vec<u8> = (0..=255u8).collect();
    assert!((entropy(&uniform) - 8.0).abs() < 1e-9);

    assert!((entropy(b"abab") - 1.0).abs() < 1e-9);
}

#[test]
fn test_entropy_memoized() {
    let chunk = Chunk::new(&b"some payload with entropy"[..]);
    let mut oracle = oracle(&chunk);

    let first = oracle.get("entropy").unwrap();
    let second = oracle.get("entropy").unwrap();

    assert_eq!(first, second);
    assert_eq!(
        oracle.computations(),
        1,
        "Entropy must be computed exactly once"
    );
}

#[test]
fn test_ext_reuses_size() {
    let chunk = Chunk::new(&b"%PDF-1.7 ..."[..]);
    let mut oracle = oracle(&chunk);

    assert_eq!(get_str(&mut oracle, "ext"), "pdf");
    assert_eq!(oracle.computations(), 2, "Computing ext computes size first");

    oracle.get("size").unwrap();
    assert_eq!(oracle.computations(), 2, "Size must be served from the cache");
}

#[test]
fn test_snapshot_ignores_body_changes() {
    let mut chunk = Chunk::new(&b"four"[..]);
    let mut oracle = oracle(&chunk);

    assert_eq!(oracle.get("size").unwrap(), Value::Int(4));

    chunk.set_body(&b"eight!!!"[..]);

    assert_eq!(oracle.get("size").unwrap(), Value::Int(4));
}

#[test]
fn test_populate_writes_meta_only() {
    let mut chunk = Chunk::new(&b"abc"[..]);
    let mut oracle = oracle(&chunk);

    oracle.populate(&mut chunk, Field::Size);
    oracle.populate(&mut chunk, Field::Crc32);

    assert_eq!(chunk.body.as_ref(), b"abc", "The oracle must not touch the body");
    assert_eq!(chunk.get_meta("size").unwrap(), &Value::Int(3));
    assert_eq!(chunk.get_meta("crc32").unwrap().as_str(), Some("352441c2"));
}

// --- Extension Tests ---

#[test]
fn test_guess_extension() {
    assert_eq!(guess_extension(b"MZ\x90\x00", 4), "exe");
    assert_eq!(guess_extension(b"\x7fELF\x02\x01", 6), "elf");
    assert_eq!(guess_extension(b"PK\x03\x04rest", 8), "zip");
    assert_eq!(guess_extension(b"\x1f\x8b\x08\x00", 4), "gz");
    assert_eq!(guess_extension(b"plain text\n", 11), "txt");
    assert_eq!(guess_extension(b"\x00\x01\x02\x03", 4), UNKNOWN_EXTENSION);
    assert_eq!(guess_extension(b"", 0), UNKNOWN_EXTENSION);
}

#[test]
fn test_guess_extension_size_beyond_data() {
    assert_eq!(guess_extension(b"MZ", 4096), "exe");
    assert_eq!(guess_extension(b"ok", 300), "txt");
    assert_eq!(guess_extension(b"\x7fEL", 6), UNKNOWN_EXTENSION);
}

#[test]
fn test_guess_extension_tar_offset() {
    let mut data = vec![0u8; 512];
    data[257..262].copy_from_slice(b"ustar");

    assert_eq!(guess_extension(&data, data.len()), "tar");
    assert_eq!(
        guess_extension(&data[..260], 260),
        UNKNOWN_EXTENSION,
        "A truncated header must not match"
    );
}
