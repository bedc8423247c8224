//!
//! Pipeline composition.
//!
//! A [`Pipeline`] is a list of steps applied to a chunk stream in order. Every
//! unit step wraps the stream produced by the previous step with the unit's
//! filter, so nothing happens until the consumer pulls from the final stream,
//! and each pull moves at most one chunk through every stage.
//!
//! Units reporting [`Unit::opens_frame`] are driven one input chunk at a time
//! and their outputs are placed in a fresh frame. A close step leaves the
//! innermost frame again:
//!
//! ```rust
//! use refinery::pipeline::Pipeline;
//! use refinery::units::{Chop, Put, PutValue};
//! use refinery::chunk::{Chunk, Value};
//!
//! let pipeline = Pipeline::new()
//!     .unit(Chop::try_new(2).unwrap())
//!     .unit(Put::new("inner", PutValue::Literal(Value::Int(1))))
//!     .close_joined();
//!
//! let out: Vec<Chunk> = pipeline
//!     .run([Chunk::new(&b"abcdef"[..])])
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].body.as_ref(), b"abcdef");
//! assert!(!out[0].has_meta("inner"));
//! ```
//!

mod frame;
mod source;
#[cfg(feature = "async")]
mod stream;

pub use crate::unit::Mode;
pub use source::read_source;
#[cfg(feature = "async")]
pub use stream::PipelineStream;

use crate::chunk::Chunk;
use crate::error::Result;
use crate::unit::{ChunkStream, Unit};
use frame::{FrameCloser, FrameCounter, FrameOpener};
use std::io::Read;
use tracing::debug;

/// One step of a pipeline.
pub enum Step {
    Unit(Box<dyn Unit>),
    /// Leaves the innermost frame, concatenating the frame's chunks if `join` is set.
    Close { join: bool },
}

/// An ordered list of units and frame closing steps.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Step>,
    mode: Mode,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Runs every unit in reverse direction.
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.mode.reverse = reverse;
        self
    }

    /// Terminates the stream on the first unit failure.
    pub fn strict(mut self, strict: bool) -> Self {
        self.mode.strict = strict;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn unit(mut self, unit: impl Unit + 'static) -> Self {
        self.push(Box::new(unit));
        self
    }

    pub fn push(&mut self, unit: Box<dyn Unit>) {
        self.steps.push(Step::Unit(unit));
    }

    /// Leaves the innermost frame, keeping its chunks separate.
    pub fn close(mut self) -> Self {
        self.steps.push(Step::Close { join: false });
        self
    }

    /// Leaves the innermost frame, joining its chunks into one.
    pub fn close_joined(mut self) -> Self {
        self.steps.push(Step::Close { join: true });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    ///
    /// Builds the lazy output stream for `source`.
    ///
    /// Chunks are pulled from `source` only as the returned stream is consumed.
    ///
    pub fn run<'a, I>(&'a self, source: I) -> ChunkStream<'a>
    where
        I: IntoIterator<Item = Chunk>,
        I::IntoIter: 'a,
    {
        debug!(steps = self.steps.len(), mode = ?self.mode, "running pipeline");

        let counter = FrameCounter::default();
        let mut stream: ChunkStream<'a> = Box::new(source.into_iter().map(Ok));

        for step in &self.steps {
            stream = match step {
                Step::Unit(unit) => stage(&**unit, stream, self.mode, &counter),
                Step::Close { join } => Box::new(FrameCloser::new(stream, *join)),
            };
        }

        stream
    }

    /// Reads `reader` into a single chunk and runs the pipeline on it.
    pub fn run_reader<R: Read>(&self, reader: R) -> Result<ChunkStream<'_>> {
        let chunk = read_source(reader)?;
        Ok(self.run([chunk]))
    }
}

fn stage<'a>(unit: &'a dyn Unit, input: ChunkStream<'a>, mode: Mode, counter: &FrameCounter) -> ChunkStream<'a> {
    if unit.opens_frame() {
        Box::new(FrameOpener::new(unit, input, mode, counter.clone()))
    } else {
        unit.filter(input, mode)
    }
}

/// Chains `units` over `source` in forward, lenient mode.
pub fn run<'a, I>(units: &'a [Box<dyn Unit>], source: I) -> ChunkStream<'a>
where
    I: IntoIterator<Item = Chunk>,
    I::IntoIter: 'a,
{
    let counter = FrameCounter::default();
    units.iter().fold(
        Box::new(source.into_iter().map(Ok)) as ChunkStream<'a>,
        |stream, unit| stage(&**unit, stream, Mode::default(), &counter),
    )
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
