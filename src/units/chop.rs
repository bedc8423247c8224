use crate::args::Args;
use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::unit::{Outputs, Unit};

/// Splits every chunk into pieces of `size` bytes, each in a new frame.
/// The last piece may be shorter.
#[derive(Debug, Clone)]
pub struct Chop {
    size: usize,
}

impl Chop {
    pub const NAME: &'static str = "chop";

    ///
    /// Constructs a new `Chop` unit.
    ///
    /// ## Errors
    ///
    /// Returns `Error::InvalidArgument` if `size` is zero.
    ///
    pub fn try_new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_argument("size", "must be at least 1"));
        }
        Ok(Self { size })
    }

    pub(crate) fn from_args(args: &mut Args) -> Result<Box<dyn Unit>> {
        let size = args.take_size("size", 0)?;
        Ok(Box::new(Self::try_new(size)?))
    }
}

impl Unit for Chop {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, chunk: &Chunk) -> Result<Outputs> {
        let body = chunk.body.clone();
        let size = self.size;
        Ok(Box::new((0..body.len()).step_by(size).map(move |start| {
            let end = (start + size).min(body.len());
            Ok(body.slice(start..end))
        })))
    }

    fn opens_frame(&self) -> bool {
        true
    }
}
