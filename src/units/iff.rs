use crate::args::Args;
use crate::chunk::{Chunk, Value};
use crate::error::{Error, Result};
use crate::unit::{self, ChunkStream, Mode, Outputs, Unit};

/// Hides chunks whose meta variable is missing or falsy. With `negate`, hides the others.
#[derive(Debug, Clone)]
pub struct Iff {
    name: String,
    negate: bool,
}

impl Iff {
    pub const NAME: &'static str = "iff";

    pub fn new(name: impl Into<String>, negate: bool) -> Self {
        Self {
            name: name.into(),
            negate,
        }
    }

    pub(crate) fn from_args(args: &mut Args) -> Result<Box<dyn Unit>> {
        let name = args
            .take_text("name")?
            .ok_or_else(|| Error::invalid_argument("name", "iff requires a variable name"))?;
        let negate = args.take_flag("negate")?;
        Ok(Box::new(Self::new(name, negate)))
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        chunk
            .get_meta(&self.name)
            .map(Value::is_truthy)
            .unwrap_or(false)
            != self.negate
    }
}

impl Unit for Iff {
    fn name(&self) -> &str {
        Self::NAME
    }

    // Unused: `filter` annotates chunks in place.
    fn process(&self, _chunk: &Chunk) -> Result<Outputs> {
        Ok(unit::none())
    }

    fn filter<'a>(&'a self, chunks: ChunkStream<'a>, mode: Mode) -> ChunkStream<'a> {
        unit::map_chunks(self, chunks, mode, move |chunk| {
            chunk.visible = self.matches(chunk);
            Ok(true)
        })
    }
}
