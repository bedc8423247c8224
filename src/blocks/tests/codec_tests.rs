use super::*;

// --- Construction Tests ---

#[test]
fn test_blocksize_bounds() {
    assert!(BlockCodec::try_new(MIN_BLOCK_SIZE, false).is_ok());
    assert!(BlockCodec::try_new(MAX_BLOCK_SIZE, true).is_ok());

    for blocksize in [0, MAX_BLOCK_SIZE + 1, 64] {
        let err = BlockCodec::try_new(blocksize, false).unwrap_err();
        assert!(
            matches!(err, Error::InvalidBlockSize(n) if n == blocksize),
            "blocksize {blocksize} must be rejected, got {err:?}"
        );
    }
}

#[test]
#[should_panic]
fn test_new_panics_on_zero_blocksize() {
    let _ = BlockCodec::new(0, false);
}

#[test]
fn test_block_mask() {
    assert_eq!(block_mask(1), 0xFF);
    assert_eq!(block_mask(2), 0xFFFF);
    assert_eq!(block_mask(3), 0xFF_FFFF);
    assert_eq!(block_mask(16), u128::MAX);
}

// --- Chunking Tests ---

#[test]
fn test_chunk_big_endian_with_rest() {
    let codec = BlockCodec::new(2, true);
    let data = [0x00, 0x01, 0x00, 0x02, 0xFF];

    let blocks: Vec<u128> = codec.chunk(&data).collect();

    assert_eq!(blocks, vec![1, 2]);
    assert_eq!(codec.rest(&data), &[0xFF]);
    assert_eq!(codec.count(&data), 2);
}

#[test]
fn test_chunk_little_endian() {
    let codec = BlockCodec::new(2, false);
    let data = [0x01, 0x00, 0x02, 0x00, 0xFF];

    let blocks: Vec<u128> = codec.chunk(&data).collect();

    assert_eq!(blocks, vec![1, 2]);
    assert_eq!(codec.rest(&data), &[0xFF]);
}

#[test]
fn test_chunk_odd_blocksize() {
    let codec = BlockCodec::new(3, true);
    let data = [0x01, 0x02, 0x03, 0x0A, 0x0B, 0x0C, 0xEE, 0xFF];

    let blocks: Vec<u128> = codec.chunk(&data).collect();

    assert_eq!(blocks, vec![0x010203, 0x0A0B0C]);
    assert_eq!(codec.rest(&data), &[0xEE, 0xFF]);
}

#[test]
fn test_rest_empty_for_single_bytes() {
    let codec = BlockCodec::default();
    let data = b"any length at all";

    assert!(codec.rest(data).is_empty(), "Blocks of one byte never leave a rest");
    assert_eq!(codec.chunk(data).len(), data.len());
}

#[test]
fn test_chunk_shorter_than_block() {
    let codec = BlockCodec::new(8, false);
    let data = [1, 2, 3];

    assert_eq!(codec.chunk(&data).count(), 0);
    assert_eq!(codec.rest(&data), &data);
}

// --- Packing Tests ---

#[test]
fn test_unchunk_masks_values() {
    let codec = BlockCodec::new(1, false);

    let out = codec.unchunk([0x1FF, 0x100, 0x42]);

    assert_eq!(out.as_ref(), &[0xFF, 0x00, 0x42]);
}

#[test]
fn test_unchunk_big_endian() {
    let codec = BlockCodec::new(4, true);

    let out = codec.unchunk([0x0102_0304]);

    assert_eq!(out.as_ref(), &[1, 2, 3, 4]);
}

#[test]
fn test_full_width_blocks() {
    let codec = BlockCodec::new(16, false);
    let data: Vec<u8> = (0..=16).collect();

    let blocks: Vec<u128> = codec.chunk(&data).collect();
    assert_eq!(blocks, vec![u128::from_le_bytes(data[..16].try_into().unwrap())]);

    let mut out = codec.unchunk(blocks);
    out.extend_from_slice(codec.rest(&data));
    assert_eq!(out.as_ref(), &data[..]);
}

#[test]
fn test_chunk_unchunk_round_trip() {
    let data: Vec<u8> = (0u8..=200).collect();

    for blocksize in MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE {
        for bigendian in [false, true] {
            let codec = BlockCodec::new(blocksize, bigendian);

            let mut out = codec.unchunk(codec.chunk(&data));
            out.extend_from_slice(codec.rest(&data));

            assert_eq!(
                out.as_ref(),
                &data[..],
                "Round trip failed for blocksize {blocksize}, bigendian {bigendian}"
            );
        }
    }
}
