use crate::args::{Args, SeqExpr};
use crate::blocks::{ArithmeticUnit, BlockConfig, Column, FastPathError, Lane, Operation};
use crate::error::{Error, Result};
use crate::unit::Unit;

/// Bitwise exclusive or with the operand.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xor;

/// Addition modulo the block width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

/// Subtraction modulo the block width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sub;

/// Multiplication modulo the block width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mul;

/// Left shift; shifting by the block width or more yields zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shl;

/// Right shift; shifting by the block width or more yields zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shr;

/// Bitwise complement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neg;

#[inline]
fn zip_lanes<L: Lane>(lanes: &mut [L], column: &Column<L>, f: impl Fn(L, L) -> L) {
    match column {
        Column::Scalar(arg) => lanes.iter_mut().for_each(|lane| *lane = f(*lane, *arg)),
        Column::Array(args) => lanes
            .iter_mut()
            .zip(args)
            .for_each(|(lane, arg)| *lane = f(*lane, *arg)),
    }
}

fn single<L>(args: &[Column<L>]) -> Result<&Column<L>, FastPathError> {
    match args {
        [column] => Ok(column),
        _ => Err(FastPathError::Operation(format!(
            "expected one operand column, got {}",
            args.len()
        ))),
    }
}

impl Operation for Xor {
    const NAME: &'static str = "xor";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        block ^ args[0]
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| a ^ b);
        Ok(())
    }
}

impl Operation for Add {
    const NAME: &'static str = "add";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        block.wrapping_add(args[0])
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| a.wrapping_add(&b));
        Ok(())
    }
}

impl Operation for Sub {
    const NAME: &'static str = "sub";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        block.wrapping_sub(args[0])
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| a.wrapping_sub(&b));
        Ok(())
    }
}

impl Operation for Mul {
    const NAME: &'static str = "mul";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        block.wrapping_mul(args[0])
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| a.wrapping_mul(&b));
        Ok(())
    }
}

impl Operation for Shl {
    const NAME: &'static str = "shl";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        match u32::try_from(args[0]) {
            Ok(shift) if shift < u128::BITS => block << shift,
            _ => 0,
        }
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| match b.to_u32() {
            Some(shift) if shift < L::BITS => a << shift as usize,
            _ => L::zero(),
        });
        Ok(())
    }
}

impl Operation for Shr {
    const NAME: &'static str = "shr";
    const ARITY: usize = 1;

    fn operate(&self, block: u128, args: &[u128]) -> u128 {
        match u32::try_from(args[0]) {
            Ok(shift) if shift < u128::BITS => block >> shift,
            _ => 0,
        }
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], args: &[Column<L>]) -> Result<(), FastPathError> {
        zip_lanes(lanes, single(args)?, |a, b| match b.to_u32() {
            Some(shift) if shift < L::BITS => a >> shift as usize,
            _ => L::zero(),
        });
        Ok(())
    }
}

impl Operation for Neg {
    const NAME: &'static str = "neg";
    const ARITY: usize = 0;

    fn operate(&self, block: u128, _args: &[u128]) -> u128 {
        !block
    }

    fn inplace<L: Lane>(&self, lanes: &mut [L], _args: &[Column<L>]) -> Result<(), FastPathError> {
        lanes.iter_mut().for_each(|lane| *lane = !*lane);
        Ok(())
    }
}

fn block_config(args: &mut Args) -> Result<BlockConfig> {
    Ok(BlockConfig::new(
        args.take_size("blocksize", 1)?,
        args.take_flag("bigendian")?,
    ))
}

/// Factory for binary operations: `argument`, `blocksize`, `bigendian`.
pub(crate) fn binary<O>(args: &mut Args) -> Result<Box<dyn Unit>>
where
    O: Operation + Default + 'static,
{
    let config = block_config(args)?;
    let operand: SeqExpr = args
        .take_seq("argument")?
        .ok_or_else(|| Error::invalid_argument("argument", format!("{} requires an operand", O::NAME)))?;
    Ok(Box::new(ArithmeticUnit::binary(O::default(), config, operand)?))
}

/// Factory for unary operations: `blocksize`, `bigendian`.
pub(crate) fn unary<O>(args: &mut Args) -> Result<Box<dyn Unit>>
where
    O: Operation + Default + 'static,
{
    let config = block_config(args)?;
    Ok(Box::new(ArithmeticUnit::unary(O::default(), config)?))
}
