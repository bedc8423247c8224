use crate::blocks::BlockCodec;
use crate::chunk::{Chunk, Value};
use crate::error::{Error, Result};
use crate::oracle::{Field, MetaOracle};
use bytes::Bytes;
use std::borrow::Cow;
use std::sync::Arc;

///
/// A numeric sequence expression.
///
/// Literal expressions are resolved once, when the unit is constructed.
/// Expressions that reference a meta variable or an oracle field are deferred
/// and resolved against each chunk right before it is processed.
///
#[derive(Debug, Clone, PartialEq)]
pub enum SeqExpr {
    /// A single integer.
    Scalar(u128),
    /// A literal list of integers, repeated cyclically.
    Values(Vec<u128>),
    /// Literal bytes, reinterpreted as blocks of the unit's block size.
    Bytes(Bytes),
    /// The value of a meta variable of the processed chunk.
    Var(String),
    /// A computed property of the processed chunk.
    Field(Field),
    /// Turns a scalar into an infinite repetition of that scalar.
    Repeat(Box<SeqExpr>),
}

impl SeqExpr {
    pub fn var(name: impl Into<String>) -> Self {
        SeqExpr::Var(name.into())
    }

    pub fn repeat(inner: SeqExpr) -> Self {
        SeqExpr::Repeat(Box::new(inner))
    }

    /// Whether the expression can be resolved without a chunk.
    pub fn is_static(&self) -> bool {
        match self {
            SeqExpr::Scalar(_) | SeqExpr::Values(_) | SeqExpr::Bytes(_) => true,
            SeqExpr::Var(_) | SeqExpr::Field(_) => false,
            SeqExpr::Repeat(inner) => inner.is_static(),
        }
    }

    ///
    /// Resolves the expression against `chunk`. The chunk is only read.
    ///
    /// ## Errors
    ///
    /// * `Error::MissingMetaVariable` if a referenced variable is absent.
    /// * `Error::InvalidArgument` if the value cannot be read as integers or
    ///   yields an empty sequence.
    ///
    pub fn resolve(&self, chunk: &Chunk, unit: &str, codec: &BlockCodec) -> Result<Operand> {
        self.evaluate(Some(chunk), unit, codec)
    }

    /// Resolves a static expression. Returns `None` for deferred expressions.
    pub fn resolve_static(&self, unit: &str, codec: &BlockCodec) -> Result<Option<Operand>> {
        if !self.is_static() {
            return Ok(None);
        }
        self.evaluate(None, unit, codec).map(Some)
    }

    fn evaluate(&self, chunk: Option<&Chunk>, unit: &str, codec: &BlockCodec) -> Result<Operand> {
        let mask = codec.mask();
        match self {
            SeqExpr::Scalar(v) => Ok(Operand::Scalar(v & mask)),
            SeqExpr::Values(values) => Operand::cycle(unit, values.iter().map(|v| v & mask)),
            SeqExpr::Bytes(data) => Operand::cycle(unit, codec.chunk(data)),
            SeqExpr::Var(key) => {
                let chunk = chunk.ok_or_else(|| deferred(unit))?;
                let value = chunk
                    .get_meta(key)
                    .map_err(|_| Error::MissingMetaVariable {
                        key: key.clone(),
                        unit: unit.to_owned(),
                    })?;
                from_value(value, unit, codec)
            }
            SeqExpr::Field(field) => {
                let chunk = chunk.ok_or_else(|| deferred(unit))?;
                let mut oracle = MetaOracle::new(chunk);
                from_value(oracle.get_or_compute(*field), unit, codec)
            }
            SeqExpr::Repeat(inner) => match inner.evaluate(chunk, unit, codec)? {
                Operand::Scalar(v) => Ok(Operand::Cycle(Arc::from([v]))),
                cycle => Ok(cycle),
            },
        }
    }
}

impl From<u128> for SeqExpr {
    fn from(v: u128) -> Self {
        SeqExpr::Scalar(v)
    }
}

impl From<Vec<u128>> for SeqExpr {
    fn from(v: Vec<u128>) -> Self {
        SeqExpr::Values(v)
    }
}

impl From<Bytes> for SeqExpr {
    fn from(v: Bytes) -> Self {
        SeqExpr::Bytes(v)
    }
}

impl From<Field> for SeqExpr {
    fn from(v: Field) -> Self {
        SeqExpr::Field(v)
    }
}

fn deferred(unit: &str) -> Error {
    Error::invalid_argument(unit, "expression must be resolved against a chunk")
}

fn from_value(value: &Value, unit: &str, codec: &BlockCodec) -> Result<Operand> {
    if let Some(data) = value.as_bytes() {
        return Operand::cycle(unit, codec.chunk(data));
    }
    match value.as_int() {
        Some(v) => Ok(Operand::Scalar(v as u128 & codec.mask())),
        None => Err(Error::invalid_argument(
            unit,
            format!("value {value} cannot be used as an integer sequence"),
        )),
    }
}

/// A resolved operand: one integer for every block, or a sequence cycled over the blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Scalar(u128),
    Cycle(Arc<[u128]>),
}

impl Operand {
    fn cycle(unit: &str, values: impl Iterator<Item = u128>) -> Result<Self> {
        let values: Arc<[u128]> = values.collect();
        if values.is_empty() {
            return Err(Error::invalid_argument(unit, "sequence is empty"));
        }
        Ok(Operand::Cycle(values))
    }

    /// An infinite iterator yielding the operand value for each consecutive block.
    pub fn iter(&self) -> Cyclic<'_> {
        let values: &[u128] = match self {
            Operand::Scalar(v) => std::slice::from_ref(v),
            Operand::Cycle(values) => &values[..],
        };
        Cyclic { values, pos: 0 }
    }

    /// The value for the first block.
    pub fn first(&self) -> u128 {
        match self {
            Operand::Scalar(v) => *v,
            Operand::Cycle(values) => values[0],
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Operand::Scalar(_))
    }
}

/// Cycles over a non-empty slice indefinitely.
#[derive(Debug, Clone)]
pub struct Cyclic<'a> {
    values: &'a [u128],
    pos: usize,
}

impl Iterator for Cyclic<'_> {
    type Item = u128;

    #[inline]
    fn next(&mut self) -> Option<u128> {
        let value = *self.values.get(self.pos)?;
        self.pos += 1;
        if self.pos == self.values.len() {
            self.pos = 0;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// An argument bound to a unit: static expressions are resolved once and cached.
#[derive(Debug, Clone)]
pub struct Argument {
    expr: SeqExpr,
    cached: Option<Operand>,
}

impl Argument {
    pub fn bind(expr: SeqExpr, unit: &str, codec: &BlockCodec) -> Result<Self> {
        let cached = expr.resolve_static(unit, codec)?;
        Ok(Self { expr, cached })
    }

    pub fn expr(&self) -> &SeqExpr {
        &self.expr
    }

    pub fn is_deferred(&self) -> bool {
        self.cached.is_none()
    }

    pub fn resolve(&self, chunk: &Chunk, unit: &str, codec: &BlockCodec) -> Result<Cow<'_, Operand>> {
        match &self.cached {
            Some(operand) => Ok(Cow::Borrowed(operand)),
            None => self.expr.resolve(chunk, unit, codec).map(Cow::Owned),
        }
    }
}
