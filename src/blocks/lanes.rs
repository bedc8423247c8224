use super::BlockCodec;
use super::arithmetic::Operation;
use crate::args::Operand;
use bytes::BytesMut;
use num_traits::{PrimInt, WrappingAdd, WrappingMul, WrappingSub};
use std::fmt::Debug;
use thiserror::Error;

/// Reasons for the vectorized path to hand over to block iteration.
#[derive(Debug, Error)]
pub enum FastPathError {
    #[error("vectorized arithmetic is not available in this build")]
    Unavailable,

    #[error("no lane type for blocks of {0} bytes")]
    UnsupportedWidth(usize),

    #[error("lane count {lanes} does not match block count {blocks}")]
    LengthMismatch { lanes: usize, blocks: usize },

    #[error("{0}")]
    Operation(String),
}

/// A native unsigned integer type that holds exactly one block.
pub trait Lane: PrimInt + WrappingAdd + WrappingSub + WrappingMul + Debug + 'static {
    const BITS: u32;

    /// Truncates a block value to the lane width.
    fn from_block(value: u128) -> Self;

    fn to_block(self) -> u128;
}

macro_rules! impl_lane {
    ($($t:ty),*) => {
        $(
            impl Lane for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline]
                fn from_block(value: u128) -> Self {
                    value as $t
                }

                #[inline]
                fn to_block(self) -> u128 {
                    self as u128
                }
            }
        )*
    };
}

impl_lane!(u8, u16, u32, u64, u128);

/// An operand normalized for a lane array: broadcast scalar or one value per lane.
#[derive(Debug, Clone, PartialEq)]
pub enum Column<L> {
    Scalar(L),
    Array(Vec<L>),
}

impl<L: Lane> Column<L> {
    /// Normalizes `operand` for `len` lanes, cycling shorter sequences.
    pub fn normalize(operand: &Operand, len: usize) -> Self {
        match operand {
            Operand::Scalar(v) => Column::Scalar(L::from_block(*v)),
            Operand::Cycle(_) => Column::Array(operand.iter().take(len).map(L::from_block).collect()),
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> L {
        match self {
            Column::Scalar(v) => *v,
            Column::Array(values) => values[i],
        }
    }
}

#[cfg(feature = "vectorized")]
pub(crate) fn run<O: Operation>(
    op: &O,
    codec: &BlockCodec,
    data: &[u8],
    operands: &[Operand],
) -> Result<BytesMut, FastPathError> {
    match codec.blocksize() {
        1 => run_lanes::<u8, O>(op, codec, data, operands),
        2 => run_lanes::<u16, O>(op, codec, data, operands),
        4 => run_lanes::<u32, O>(op, codec, data, operands),
        8 => run_lanes::<u64, O>(op, codec, data, operands),
        16 => run_lanes::<u128, O>(op, codec, data, operands),
        n => Err(FastPathError::UnsupportedWidth(n)),
    }
}

#[cfg(not(feature = "vectorized"))]
pub(crate) fn run<O: Operation>(
    _op: &O,
    _codec: &BlockCodec,
    _data: &[u8],
    _operands: &[Operand],
) -> Result<BytesMut, FastPathError> {
    Err(FastPathError::Unavailable)
}

#[cfg(feature = "vectorized")]
fn run_lanes<L, O>(
    op: &O,
    codec: &BlockCodec,
    data: &[u8],
    operands: &[Operand],
) -> Result<BytesMut, FastPathError>
where
    L: Lane + bytemuck::Pod,
    O: Operation,
{
    let rest = codec.rest(data);
    let body = &data[..data.len() - rest.len()];

    let mut lanes: Vec<L> = bytemuck::pod_collect_to_vec(body);
    let blocks = codec.count(data);
    if lanes.len() != blocks {
        return Err(FastPathError::LengthMismatch {
            lanes: lanes.len(),
            blocks,
        });
    }

    // Lanes are read in native order and swapped when the block order differs.
    let swap = codec.bigendian() != cfg!(target_endian = "big");
    if swap {
        lanes.iter_mut().for_each(|lane| *lane = lane.swap_bytes());
    }

    let columns: Vec<Column<L>> = operands
        .iter()
        .map(|operand| Column::normalize(operand, lanes.len()))
        .collect();

    op.inplace(&mut lanes, &columns)?;

    if swap {
        lanes.iter_mut().for_each(|lane| *lane = lane.swap_bytes());
    }

    let mut out = BytesMut::with_capacity(data.len());
    out.extend_from_slice(bytemuck::cast_slice(&lanes));
    out.extend_from_slice(rest);
    Ok(out)
}
