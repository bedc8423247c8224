use super::*;
use crate::args::SeqExpr;
use crate::blocks::{ArithmeticUnit, BlockConfig};
use crate::units::{Chop, Xor};
use futures::StreamExt;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use std::io;
use tokio::io::{AsyncRead, ReadBuf};

fn payload(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

// --- Input Tests ---

#[tokio::test]
async fn test_empty_input() {
    let data: [u8; 0] = [];
    let pipeline = Pipeline::new();

    let chunks: Vec<_> = pipeline.as_stream(&data[..]).collect().await;

    // The empty source is still one chunk
    assert_eq!(chunks.len(), 1, "Empty input must yield one empty chunk");
    assert!(chunks[0].as_ref().unwrap().body.is_empty());
}

#[tokio::test]
async fn test_input_larger_than_read_size() {
    let data = payload(READ_SIZE * 3 + 17, 1);
    let pipeline = Pipeline::new();

    let chunks: Vec<_> = pipeline.as_stream(&data[..]).collect().await;

    assert_eq!(chunks.len(), 1, "The whole source must be read into a single chunk");

    let chunk = chunks[0].as_ref().expect("Failed to read source");
    assert_eq!(chunk.body.as_ref(), &data[..]);
}

// --- Pipeline Tests ---

#[tokio::test]
async fn test_stream_runs_pipeline() {
    let data = payload(50_000, 2);
    let xor = ArithmeticUnit::binary(Xor, BlockConfig::default(), SeqExpr::Scalar(0x20)).unwrap();
    let pipeline = Pipeline::new().unit(Chop::try_new(4_096).unwrap()).unit(xor);

    let mut reconstructed = Vec::with_capacity(data.len());
    let mut chunk_count = 0;

    let mut stream = pipeline.as_stream(&data[..]);

    while let Some(chunk_res) = stream.next().await {
        let chunk = chunk_res.expect("Failed to process chunk");
        assert!(chunk.body.len() <= 4_096);
        reconstructed.extend_from_slice(chunk.body.as_ref());
        chunk_count += 1;
    }

    assert_eq!(chunk_count, 13);
    let expected: Vec<u8> = data.iter().map(|b| b ^ 0x20).collect();
    assert_eq!(reconstructed, expected, "Every chunk must pass through every unit");
}

#[tokio::test]
async fn test_file_source() {
    let path = std::env::temp_dir().join(format!("refinery-stream-{}.bin", std::process::id()));
    let data = payload(10_000, 3);
    tokio::fs::write(&path, &data).await.expect("Failed to write test file");

    let file = tokio::fs::File::open(&path).await.expect("Failed to open test file");
    let reader = tokio::io::BufReader::new(file);
    let pipeline = Pipeline::new().close_joined();

    let chunks: Vec<_> = pipeline.as_stream(reader).collect().await;
    let _ = tokio::fs::remove_file(&path).await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].as_ref().unwrap().body.as_ref(), &data[..]);
}

// --- Error Test ---

struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::task::Poll::Ready(Err(io::Error::other("simulated read error")))
    }
}

#[tokio::test]
async fn test_reader_error() {
    let pipeline = Pipeline::new();

    let mut stream = pipeline.as_stream(FailingReader);
    let result = stream
        .next()
        .await
        .expect("Stream expected to yield a result");

    // The read error is reported first, and the stream ends after it
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(stream.next().await.is_none());
}
