use crate::args::Args;
use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::unit::{self, Outputs, Unit};
use bytes::Bytes;

/// Decodes hexadecimal text; the reverse direction encodes.
/// ASCII whitespace in the input is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hex;

impl Hex {
    pub const NAME: &'static str = "hex";

    pub(crate) fn from_args(_args: &mut Args) -> Result<Box<dyn Unit>> {
        Ok(Box::new(Self))
    }
}

impl Unit for Hex {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, chunk: &Chunk) -> Result<Outputs> {
        let digits: Vec<u8> = chunk
            .body
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let decoded = ::hex::decode(digits).map_err(|e| Error::unit(Self::NAME, e.to_string()))?;
        Ok(unit::once(decoded))
    }

    fn reverse(&self, chunk: &Chunk) -> Result<Bytes> {
        Ok(Bytes::from(::hex::encode(&chunk.body)))
    }
}
