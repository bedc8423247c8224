//!
//! Fixed-width block codec and elementwise block arithmetic.
//!
//! A [`BlockCodec`] splits a byte buffer into unsigned integers of `blocksize`
//! bytes each. Trailing bytes that do not fill a complete block are kept apart
//! as the *rest* and are never transformed. Block values are `u128`, which
//! bounds the block size to [`MAX_BLOCK_SIZE`] bytes.
//!
//! [`ArithmeticUnit`] builds on the codec: it applies an [`Operation`] to every
//! block, first through a typed lane array (the vectorized path) and, if that
//! is unavailable or fails, block by block.
//!

mod arithmetic;
mod lanes;

pub use arithmetic::{ArithmeticUnit, Operation};
pub use lanes::{Column, FastPathError, Lane};

use crate::error::{Error, Result};
use bytes::BytesMut;
use std::slice::ChunksExact;

/// Lower limit for the `blocksize` parameter.
pub const MIN_BLOCK_SIZE: usize = 1;
/// Upper limit for the `blocksize` parameter.
pub const MAX_BLOCK_SIZE: usize = 16;

/// Returns the mask `(1 << 8 * blocksize) - 1`.
#[inline]
pub fn block_mask(blocksize: usize) -> u128 {
    match blocksize * 8 {
        bits if bits >= 128 => u128::MAX,
        bits => (1u128 << bits) - 1,
    }
}

/// Block layout shared by all block-oriented units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// Number of bytes per block.
    pub blocksize: usize,
    /// Whether blocks are read and written in big endian byte order.
    pub bigendian: bool,
    /// Whether the vectorized path may be attempted.
    pub vectorize: bool,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            blocksize: 1,
            bigendian: false,
            vectorize: true,
        }
    }
}

impl BlockConfig {
    pub fn new(blocksize: usize, bigendian: bool) -> Self {
        Self {
            blocksize,
            bigendian,
            ..Self::default()
        }
    }
}

/// Packs and unpacks fixed-width unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCodec {
    blocksize: usize,
    bigendian: bool,
}

impl Default for BlockCodec {
    fn default() -> Self {
        Self {
            blocksize: 1,
            bigendian: false,
        }
    }
}

impl BlockCodec {
    ///
    /// Constructs a new `BlockCodec`.
    ///
    /// ## Panics
    ///
    /// Panics if `blocksize` is outside `MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE`.
    ///
    pub fn new(blocksize: usize, bigendian: bool) -> Self {
        match Self::try_new(blocksize, bigendian) {
            Ok(instance) => instance,
            Err(e) => panic!("{}", e),
        }
    }

    ///
    /// Constructs a new `BlockCodec`.
    /// Unlike `new`, this method returns a `Result` instead of panicking on invalid arguments.
    ///
    /// ## Errors
    ///
    /// Returns `Error::InvalidBlockSize` if `blocksize` is outside
    /// `MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE`.
    ///
    pub fn try_new(blocksize: usize, bigendian: bool) -> Result<Self> {
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&blocksize) {
            return Err(Error::InvalidBlockSize(blocksize));
        }
        Ok(Self {
            blocksize,
            bigendian,
        })
    }

    pub fn from_config(config: &BlockConfig) -> Result<Self> {
        Self::try_new(config.blocksize, config.bigendian)
    }

    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    pub fn bigendian(&self) -> bool {
        self.bigendian
    }

    pub fn mask(&self) -> u128 {
        block_mask(self.blocksize)
    }

    /// Number of complete blocks in `data`.
    pub fn count(&self, data: &[u8]) -> usize {
        data.len() / self.blocksize
    }

    /// Iterates over the complete blocks of `data` as integers.
    pub fn chunk<'a>(&self, data: &'a [u8]) -> Blocks<'a> {
        Blocks {
            inner: data.chunks_exact(self.blocksize),
            codec: *self,
        }
    }

    /// The trailing bytes of `data` that do not fill a complete block.
    pub fn rest<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.count(data) * self.blocksize..]
    }

    /// Packs `values` into consecutive blocks. Values are masked to the block width.
    pub fn unchunk<I>(&self, values: I) -> BytesMut
    where
        I: IntoIterator<Item = u128>,
    {
        let values = values.into_iter();
        let mut out = BytesMut::with_capacity(values.size_hint().0 * self.blocksize);
        for value in values {
            self.pack(value, &mut out);
        }
        out
    }

    #[inline]
    pub fn pack(&self, value: u128, out: &mut BytesMut) {
        if self.bigendian {
            out.extend_from_slice(&value.to_be_bytes()[16 - self.blocksize..]);
        } else {
            out.extend_from_slice(&value.to_le_bytes()[..self.blocksize]);
        }
    }

    #[inline]
    pub fn unpack(&self, block: &[u8]) -> u128 {
        let fold = |acc: u128, &b: &u8| (acc << 8) | b as u128;
        if self.bigendian {
            block.iter().fold(0, fold)
        } else {
            block.iter().rev().fold(0, fold)
        }
    }
}

/// An iterator over the complete blocks of a buffer.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    inner: ChunksExact<'a, u8>,
    codec: BlockCodec,
}

impl Iterator for Blocks<'_> {
    type Item = u128;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|block| self.codec.unpack(block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Blocks<'_> {}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
