//!
//! Typed unit constructor arguments.
//!
//! A front-end hands a unit factory an [`Args`] map of already-typed values.
//! Factories consume the parameters they declare with the `take_*` methods;
//! whatever is left over afterwards was not understood by the unit and is
//! reported by [`Args::finish`].
//!
//! Numeric sequence parameters are given as [`SeqExpr`] values and bound to a
//! unit as an [`Argument`], which resolves static expressions immediately and
//! defers the rest until a chunk is processed.
//!

mod expr;

pub use expr::{Argument, Cyclic, Operand, SeqExpr};

use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;

/// A single typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Flag(bool),
    Number(i128),
    Bytes(Bytes),
    Text(String),
    Seq(SeqExpr),
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Flag(v)
    }
}

impl From<i128> for ArgValue {
    fn from(v: i128) -> Self {
        ArgValue::Number(v)
    }
}

impl From<usize> for ArgValue {
    fn from(v: usize) -> Self {
        ArgValue::Number(v as i128)
    }
}

impl From<Bytes> for ArgValue {
    fn from(v: Bytes) -> Self {
        ArgValue::Bytes(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Text(v.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Text(v)
    }
}

impl From<SeqExpr> for ArgValue {
    fn from(v: SeqExpr) -> Self {
        ArgValue::Seq(v)
    }
}

/// Named constructor arguments for a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Adds an argument.
    ///
    /// ## Errors
    ///
    /// Returns `Error::DuplicateArgument` if `name` was already given.
    ///
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Result<()> {
        let name = name.into();
        if self.values.contains_key(&name) {
            return Err(Error::DuplicateArgument(name));
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Builder form of [`Args::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn take(&mut self, name: &str) -> Option<ArgValue> {
        self.values.remove(name)
    }

    /// Takes a switch. Absent switches are off.
    pub fn take_flag(&mut self, name: &str) -> Result<bool> {
        match self.take(name) {
            None => Ok(false),
            Some(ArgValue::Flag(v)) => Ok(v),
            Some(other) => Err(mismatch(name, "a flag", &other)),
        }
    }

    pub fn take_number(&mut self, name: &str) -> Result<Option<i128>> {
        match self.take(name) {
            None => Ok(None),
            Some(ArgValue::Number(v)) => Ok(Some(v)),
            Some(ArgValue::Seq(SeqExpr::Scalar(v))) => i128::try_from(v)
                .map(Some)
                .map_err(|_| Error::invalid_argument(name, "number out of range")),
            Some(other) => Err(mismatch(name, "a number", &other)),
        }
    }

    /// Takes a non-negative size, falling back to `default` when absent.
    pub fn take_size(&mut self, name: &str, default: usize) -> Result<usize> {
        match self.take_number(name)? {
            None => Ok(default),
            Some(v) => usize::try_from(v)
                .map_err(|_| Error::invalid_argument(name, format!("{v} is not a valid size"))),
        }
    }

    pub fn take_text(&mut self, name: &str) -> Result<Option<String>> {
        match self.take(name) {
            None => Ok(None),
            Some(ArgValue::Text(v)) => Ok(Some(v)),
            Some(ArgValue::Bytes(v)) => String::from_utf8(v.to_vec())
                .map(Some)
                .map_err(|_| Error::invalid_argument(name, "not valid UTF-8")),
            Some(other) => Err(mismatch(name, "a string", &other)),
        }
    }

    pub fn take_bytes(&mut self, name: &str) -> Result<Option<Bytes>> {
        match self.take(name) {
            None => Ok(None),
            Some(ArgValue::Bytes(v)) => Ok(Some(v)),
            Some(ArgValue::Text(v)) => Ok(Some(Bytes::from(v))),
            Some(other) => Err(mismatch(name, "a byte string", &other)),
        }
    }

    /// Takes a numeric sequence. Numbers and byte strings are promoted to literal expressions.
    pub fn take_seq(&mut self, name: &str) -> Result<Option<SeqExpr>> {
        match self.take(name) {
            None => Ok(None),
            Some(ArgValue::Seq(v)) => Ok(Some(v)),
            Some(ArgValue::Number(v)) => Ok(Some(SeqExpr::Scalar(v as u128))),
            Some(ArgValue::Bytes(v)) => Ok(Some(SeqExpr::Bytes(v))),
            Some(other) => Err(mismatch(name, "a numeric sequence", &other)),
        }
    }

    ///
    /// Checks that every argument was consumed.
    ///
    /// ## Errors
    ///
    /// Returns `Error::UnknownArgument` naming the first unconsumed argument.
    ///
    pub fn finish(self, unit: &str) -> Result<()> {
        match self.values.into_keys().next() {
            None => Ok(()),
            Some(name) => Err(Error::UnknownArgument {
                name,
                unit: unit.to_owned(),
            }),
        }
    }
}

fn mismatch(name: &str, expected: &str, got: &ArgValue) -> Error {
    Error::invalid_argument(name, format!("expected {expected}, got {got:?}"))
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
