use super::*;
use crate::args::{ArgValue, Args, SeqExpr};
use crate::chunk::{Chunk, Value};
use crate::error::Error;
use crate::oracle::Field;
use crate::unit::{ChunkStream, Mode, Unit};
use bytes::Bytes;

fn build(name: &str, args: Args) -> Box<dyn Unit> {
    Registry::builtin().build(name, args).unwrap()
}

fn filter_all(unit: &dyn Unit, chunks: Vec<Chunk>) -> Vec<Chunk> {
    let input: ChunkStream<'_> = Box::new(chunks.into_iter().map(Ok));
    unit.filter(input, Mode::default())
        .collect::<Result<_, _>>()
        .unwrap()
}

fn process_one(unit: &dyn Unit, body: &'static [u8]) -> Vec<Bytes> {
    unit.process(&Chunk::new(body))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

// --- Registry Tests ---

#[test]
fn test_builtin_registry_names() {
    let registry = Registry::builtin();

    for name in ["xor", "add", "sub", "mul", "shl", "shr", "neg", "put", "chop", "iff", "hex"] {
        assert!(registry.contains(name), "{name} must be registered");
    }
    assert_eq!(registry.names().count(), 11);
    assert!(!Registry::new().contains("xor"));
}

#[test]
fn test_build_xor_from_args() {
    let args = Args::new().with("argument", 0x20i128).unwrap();
    let unit = build("xor", args);

    assert_eq!(unit.name(), "xor");
    assert_eq!(process_one(unit.as_ref(), b"abc"), vec![Bytes::from_static(b"ABC")]);
}

#[test]
fn test_build_add_with_layout() {
    let args = Args::new()
        .with("argument", 1i128)
        .and_then(|a| a.with("blocksize", 2usize))
        .and_then(|a| a.with("bigendian", true))
        .unwrap();
    let unit = build("add", args);

    assert_eq!(
        process_one(unit.as_ref(), b"\x00\xFF\x01"),
        vec![Bytes::from_static(b"\x01\x00\x01")]
    );
}

#[test]
fn test_build_unknown_unit() {
    let err = Registry::builtin().build("nope", Args::new()).err().unwrap();

    assert!(matches!(&err, Error::UnknownUnit(name) if name == "nope"));
}

#[test]
fn test_build_unknown_argument() {
    let args = Args::new()
        .with("argument", 1i128)
        .and_then(|a| a.with("colour", "blue"))
        .unwrap();

    let err = Registry::builtin().build("xor", args).err().unwrap();

    assert!(
        matches!(&err, Error::UnknownArgument { name, unit } if name == "colour" && unit == "xor"),
        "Unexpected error: {err:?}"
    );
}

#[test]
fn test_build_missing_operand() {
    let err = Registry::builtin().build("sub", Args::new()).err().unwrap();

    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_build_invalid_blocksize() {
    let args = Args::new()
        .with("argument", 1i128)
        .and_then(|a| a.with("blocksize", 0usize))
        .unwrap();

    let err = Registry::builtin().build("xor", args).err().unwrap();

    assert!(matches!(err, Error::InvalidBlockSize(0)));
}

#[test]
fn test_build_neg_without_operand() {
    let unit = build("neg", Args::new());

    assert_eq!(process_one(unit.as_ref(), b"\x0F"), vec![Bytes::from_static(b"\xF0")]);
}

#[test]
fn test_custom_registration() {
    let mut registry = Registry::new();
    registry.register("upper-hex", Hex::from_args);

    assert!(registry.contains("upper-hex"));
    assert_eq!(registry.build("upper-hex", Args::new()).unwrap().name(), "hex");
}

// --- Put Tests ---

#[test]
fn test_put_body_by_default() {
    let unit = build("put", Args::new().with("name", "copy").unwrap());

    let out = filter_all(unit.as_ref(), vec![Chunk::new(&b"payload"[..])]);

    assert_eq!(out[0].get_meta("copy").unwrap(), &Value::Bytes(Bytes::from_static(b"payload")));
    assert_eq!(out[0].body.as_ref(), b"payload", "put must not change the body");
}

#[test]
fn test_put_literal_values() {
    let put = Put::new("n", PutValue::Literal(Value::Int(5)));

    let out = filter_all(&put, vec![Chunk::new(&b"a"[..]), Chunk::new(&b"b"[..])]);

    assert!(out.iter().all(|c| c.get_meta("n").unwrap() == &Value::Int(5)));
}

#[test]
fn test_put_copies_variable() {
    let put = Put::new("copy", PutValue::Expr(SeqExpr::var("src")));
    let mut chunk = Chunk::new(&b"x"[..]);
    chunk.set_meta("src", "text");

    let out = filter_all(&put, vec![chunk]);

    assert_eq!(out[0].get_meta("copy").unwrap().as_str(), Some("text"));
}

#[test]
fn test_put_missing_variable_drops_chunk() {
    let put = Put::new("copy", PutValue::Expr(SeqExpr::var("absent")));

    assert!(matches!(
        put.evaluate(&Chunk::new(&b"x"[..])),
        Err(Error::MissingMetaVariable { .. })
    ));
    assert!(filter_all(&put, vec![Chunk::new(&b"x"[..])]).is_empty());
}

#[test]
fn test_put_oracle_field() {
    let put = Put::new("digest", PutValue::Expr(SeqExpr::Field(Field::Crc32)));

    let out = filter_all(&put, vec![Chunk::new(&b"abc"[..])]);

    assert_eq!(out[0].get_meta("digest").unwrap().as_str(), Some("352441c2"));
}

#[test]
fn test_put_sequence_stores_first_element() {
    let args = Args::new()
        .with("name", "first")
        .and_then(|a| a.with("value", SeqExpr::Values(vec![7, 8, 9])))
        .unwrap();
    let unit = build("put", args);

    let out = filter_all(unit.as_ref(), vec![Chunk::new(&b"x"[..])]);

    assert_eq!(out[0].get_meta("first").unwrap(), &Value::Int(7));
}

#[test]
fn test_put_requires_name() {
    let err = Registry::builtin().build("put", Args::new()).err().unwrap();

    assert!(matches!(&err, Error::InvalidArgument { name, .. } if name == "name"));
}

#[test]
fn test_put_value_kinds_from_args() {
    for (value, expected) in [
        (ArgValue::Number(3), Value::Int(3)),
        (ArgValue::Text("t".into()), Value::Str("t".into())),
        (ArgValue::Flag(true), Value::Bool(true)),
    ] {
        let args = Args::new().with("name", "v").and_then(|a| a.with("value", value)).unwrap();
        let out = filter_all(build("put", args).as_ref(), vec![Chunk::new(Bytes::new())]);
        assert_eq!(out[0].get_meta("v").unwrap(), &expected);
    }
}

// --- Iff Tests ---

#[test]
fn test_iff_hides_falsy_chunks() {
    let iff = Iff::new("keep", false);
    let mut yes = Chunk::new(&b"yes"[..]);
    yes.set_meta("keep", 1u8);
    let mut zero = Chunk::new(&b"zero"[..]);
    zero.set_meta("keep", 0u8);
    let missing = Chunk::new(&b"missing"[..]);

    let out = filter_all(&iff, vec![yes, zero, missing]);

    let visible: Vec<bool> = out.iter().map(|c| c.visible).collect();
    assert_eq!(visible, vec![true, false, false], "iff hides chunks instead of dropping them");
}

#[test]
fn test_iff_negate() {
    let args = Args::new()
        .with("name", "flag")
        .and_then(|a| a.with("negate", true))
        .unwrap();
    let unit = build("iff", args);
    let mut set = Chunk::new(&b"set"[..]);
    set.set_meta("flag", true);

    let out = filter_all(unit.as_ref(), vec![set, Chunk::new(&b"unset"[..])]);

    assert!(!out[0].visible);
    assert!(out[1].visible);
}

// --- Chop Tests ---

#[test]
fn test_chop_pieces() {
    let chop = Chop::try_new(3).unwrap();

    assert!(chop.opens_frame());
    assert_eq!(
        process_one(&chop, b"abcdefgh"),
        vec![
            Bytes::from_static(b"abc"),
            Bytes::from_static(b"def"),
            Bytes::from_static(b"gh")
        ]
    );
    assert!(process_one(&chop, b"").is_empty());
}

#[test]
fn test_chop_rejects_zero() {
    assert!(matches!(Chop::try_new(0), Err(Error::InvalidArgument { .. })));
    assert!(Registry::builtin().build("chop", Args::new()).is_err(), "chop requires a size");
}

// --- Hex Tests ---

#[test]
fn test_hex_decode_ignores_whitespace() {
    assert_eq!(process_one(&Hex, b"48 65\n6c6C6f"), vec![Bytes::from_static(b"Hello")]);
}

#[test]
fn test_hex_reverse_encodes() {
    let out = Hex.reverse(&Chunk::new(&b"\x01\xAB"[..])).unwrap();

    assert_eq!(out.as_ref(), b"01ab");
}

#[test]
fn test_hex_invalid_input() {
    let err = Hex.process(&Chunk::new(&b"abc"[..])).err().unwrap();

    assert!(matches!(&err, Error::Unit { unit, .. } if unit == "hex"));
}
