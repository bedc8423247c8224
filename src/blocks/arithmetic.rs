use super::lanes::{self, Column, FastPathError, Lane};
use super::{BlockCodec, BlockConfig};
use crate::args::{Argument, Operand, SeqExpr};
use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::unit::{self, Outputs, Unit};
use bytes::{Bytes, BytesMut};
use std::borrow::Cow;
use tracing::warn;

///
/// An elementwise operation over blocks.
///
/// `operate` receives a block and one value per operand and may return any
/// integer: the caller masks the result to the block width. `inplace` is the
/// vectorized counterpart working on a whole lane array. Its default
/// implementation maps `operate` over the lanes and truncates every result to
/// the lane width, which yields the same bytes as the masked block path.
///
pub trait Operation {
    /// Name under which units built from this operation are known.
    const NAME: &'static str;
    /// Number of operands `operate` expects.
    const ARITY: usize;

    fn operate(&self, block: u128, args: &[u128]) -> u128;

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        let mut scratch = vec![0u128; args.len()];
        for (i, lane) in lanes.iter_mut().enumerate() {
            for (slot, column) in scratch.iter_mut().zip(args) {
                *slot = column.get(i).to_block();
            }
            *lane = L::from_block(self.operate(lane.to_block(), &scratch));
        }
        Ok(())
    }
}

/// A unit applying an [`Operation`] to every block of each chunk.
#[derive(Debug, Clone)]
pub struct ArithmeticUnit<O> {
    op: O,
    config: BlockConfig,
    codec: BlockCodec,
    arguments: Vec<Argument>,
}

impl<O: Operation> ArithmeticUnit<O> {
    ///
    /// Constructs a new `ArithmeticUnit`.
    ///
    /// ## Panics
    ///
    /// Panics if the block size is invalid, if the number of operands does not
    /// match the operation's arity, or if a static operand cannot be resolved.
    ///
    pub fn new(op: O, config: BlockConfig, operands: Vec<SeqExpr>) -> Self {
        match Self::try_new(op, config, operands) {
            Ok(instance) => instance,
            Err(e) => panic!("{}", e),
        }
    }

    ///
    /// Constructs a new `ArithmeticUnit`.
    /// Unlike `new`, this method returns a `Result` instead of panicking on invalid arguments.
    ///
    /// ## Errors
    ///
    /// * `Error::InvalidBlockSize` if `config.blocksize` is out of bounds.
    /// * `Error::InvalidArgument` if `operands.len()` differs from `O::ARITY`
    ///   or a static operand resolves to an empty sequence.
    ///
    pub fn try_new(op: O, config: BlockConfig, operands: Vec<SeqExpr>) -> Result<Self> {
        let codec = BlockCodec::from_config(&config)?;

        if operands.len() != O::ARITY {
            return Err(Error::invalid_argument(
                O::NAME,
                format!("expected {} operands, got {}", O::ARITY, operands.len()),
            ));
        }

        let arguments = operands
            .into_iter()
            .map(|expr| Argument::bind(expr, O::NAME, &codec))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            op,
            config,
            codec,
            arguments,
        })
    }

    /// A unit for an operation without operands.
    pub fn unary(op: O, config: BlockConfig) -> Result<Self> {
        Self::try_new(op, config, Vec::new())
    }

    /// A unit for an operation with exactly one operand.
    pub fn binary(op: O, config: BlockConfig, operand: SeqExpr) -> Result<Self> {
        Self::try_new(op, config, vec![operand])
    }

    pub fn codec(&self) -> &BlockCodec {
        &self.codec
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// Enables or disables the vectorized path.
    pub fn vectorize(mut self, enabled: bool) -> Self {
        self.config.vectorize = enabled;
        self
    }

    /// Resolves every operand against `chunk`.
    pub fn operands(&self, chunk: &Chunk) -> Result<Vec<Operand>> {
        self.arguments
            .iter()
            .map(|argument| {
                argument
                    .resolve(chunk, O::NAME, &self.codec)
                    .map(Cow::into_owned)
            })
            .collect()
    }

    /// Transforms `data` with already resolved operands.
    pub fn apply(&self, data: &[u8], operands: &[Operand]) -> Bytes {
        if self.config.vectorize {
            match self.fast_path(data, operands) {
                Ok(out) => return out.freeze(),
                Err(e) => warn!(
                    unit = O::NAME,
                    blocksize = self.codec.blocksize(),
                    error = %e,
                    "vectorized path failed, falling back to block iteration"
                ),
            }
        }
        self.slow_path(data, operands).freeze()
    }

    /// The vectorized path over a typed lane array.
    pub fn fast_path(&self, data: &[u8], operands: &[Operand]) -> Result<BytesMut, FastPathError> {
        lanes::run(&self.op, &self.codec, data, operands)
    }

    /// The fallback path iterating block by block.
    pub fn slow_path(&self, data: &[u8], operands: &[Operand]) -> BytesMut {
        let mask = self.codec.mask();
        let mut cycles: Vec<_> = operands.iter().map(Operand::iter).collect();
        let mut scratch = vec![0u128; operands.len()];

        let blocks = self.codec.chunk(data).map(|block| {
            for (slot, cycle) in scratch.iter_mut().zip(cycles.iter_mut()) {
                *slot = cycle.next().unwrap_or_default();
            }
            self.op.operate(block, &scratch) & mask
        });

        let mut out = self.codec.unchunk(blocks);
        out.extend_from_slice(self.codec.rest(data));
        out
    }
}

impl<O: Operation> Unit for ArithmeticUnit<O> {
    fn name(&self) -> &str {
        O::NAME
    }

    fn process(&self, chunk: &Chunk) -> Result<Outputs> {
        let operands = self.operands(chunk)?;
        Ok(unit::once(self.apply(&chunk.body, &operands)))
    }
}

#[cfg(test)]
#[path = "tests/arithmetic_tests.rs"]
mod tests;
