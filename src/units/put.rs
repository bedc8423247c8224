use crate::args::{ArgValue, Args, SeqExpr};
use crate::blocks::{BlockCodec, MAX_BLOCK_SIZE};
use crate::chunk::{Chunk, Value};
use crate::error::{Error, Result};
use crate::oracle::MetaOracle;
use crate::unit::{self, ChunkStream, Mode, Outputs, Unit};

/// What `put` stores.
#[derive(Debug, Clone, PartialEq)]
pub enum PutValue {
    /// The chunk body.
    Body,
    /// A fixed value.
    Literal(Value),
    /// A value computed from the chunk. Sequences store their first element.
    Expr(SeqExpr),
}

/// Stores a meta variable on every visible chunk. Bodies are left untouched.
#[derive(Debug, Clone)]
pub struct Put {
    name: String,
    value: PutValue,
    codec: BlockCodec,
}

impl Put {
    pub const NAME: &'static str = "put";

    pub fn new(name: impl Into<String>, value: PutValue) -> Self {
        Self {
            name: name.into(),
            value,
            codec: BlockCodec::new(MAX_BLOCK_SIZE, false),
        }
    }

    pub(crate) fn from_args(args: &mut Args) -> Result<Box<dyn Unit>> {
        let name = args
            .take_text("name")?
            .ok_or_else(|| Error::invalid_argument("name", "put requires a variable name"))?;
        let value = match args.take("value") {
            None => PutValue::Body,
            Some(ArgValue::Seq(expr)) => PutValue::Expr(expr),
            Some(ArgValue::Number(v)) => PutValue::Literal(Value::Int(v)),
            Some(ArgValue::Bytes(v)) => PutValue::Literal(Value::Bytes(v)),
            Some(ArgValue::Text(v)) => PutValue::Literal(Value::Str(v)),
            Some(ArgValue::Flag(v)) => PutValue::Literal(Value::Bool(v)),
        };
        Ok(Box::new(Self::new(name, value)))
    }

    /// The value stored for `chunk`.
    pub fn evaluate(&self, chunk: &Chunk) -> Result<Value> {
        match &self.value {
            PutValue::Body => Ok(Value::Bytes(chunk.body.clone())),
            PutValue::Literal(value) => Ok(value.clone()),
            PutValue::Expr(SeqExpr::Var(key)) => {
                chunk
                    .get_meta(key)
                    .cloned()
                    .map_err(|_| Error::MissingMetaVariable {
                        key: key.clone(),
                        unit: Self::NAME.to_owned(),
                    })
            }
            PutValue::Expr(SeqExpr::Field(field)) => {
                Ok(MetaOracle::new(chunk).get_or_compute(*field).clone())
            }
            PutValue::Expr(expr) => {
                let first = expr.resolve(chunk, Self::NAME, &self.codec)?.first();
                i128::try_from(first)
                    .map(Value::Int)
                    .map_err(|_| Error::invalid_argument(&self.name, "value exceeds the integer range"))
            }
        }
    }
}

impl Unit for Put {
    fn name(&self) -> &str {
        Self::NAME
    }

    // Unused: `filter` annotates chunks in place.
    fn process(&self, _chunk: &Chunk) -> Result<Outputs> {
        Ok(unit::none())
    }

    fn filter<'a>(&'a self, chunks: ChunkStream<'a>, mode: Mode) -> ChunkStream<'a> {
        unit::map_chunks(self, chunks, mode, move |chunk| {
            let value = self.evaluate(chunk)?;
            chunk.set_meta(self.name.as_str(), value);
            Ok(true)
        })
    }
}
