//!
//! Units shipped with the crate.
//!

mod chop;
mod hex;
mod iff;
mod ops;
mod put;

pub use chop::Chop;
pub use hex::Hex;
pub use iff::Iff;
pub use ops::{Add, Mul, Neg, Shl, Shr, Sub, Xor};
pub use put::{Put, PutValue};

use crate::blocks::Operation;
use crate::unit::Registry;

pub(crate) fn register(registry: &mut Registry) {
    registry
        .register(Xor::NAME, ops::binary::<Xor>)
        .register(Add::NAME, ops::binary::<Add>)
        .register(Sub::NAME, ops::binary::<Sub>)
        .register(Mul::NAME, ops::binary::<Mul>)
        .register(Shl::NAME, ops::binary::<Shl>)
        .register(Shr::NAME, ops::binary::<Shr>)
        .register(Neg::NAME, ops::unary::<Neg>)
        .register(Put::NAME, Put::from_args)
        .register(Chop::NAME, Chop::from_args)
        .register(Iff::NAME, Iff::from_args)
        .register(Hex::NAME, Hex::from_args);
}

#[cfg(test)]
#[path = "tests/units_tests.rs"]
mod tests;
