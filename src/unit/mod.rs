//!
//! The processing stage contract.
//!
//! A [`Unit`] transforms chunk bodies through [`Unit::process`] (and, if it is
//! invertible, [`Unit::reverse`]). Its [`Unit::filter`] turns an input chunk
//! stream into an output chunk stream. The default filter runs every visible
//! chunk through `process` or `reverse` and passes invisible chunks through
//! untouched. Units that add, drop or annotate chunks override `filter`.
//!
//! Failures inside `process` and `reverse` are isolated to the failing chunk:
//! it is dropped and a warning is logged. If the unit or the pipeline is
//! strict, the error is yielded downstream and the stream ends.
//!

mod registry;

pub use registry::{Factory, Registry};

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::mem;
use tracing::warn;

/// A lazy stream of chunks.
pub type ChunkStream<'a> = Box<dyn Iterator<Item = Result<Chunk>> + 'a>;

/// The lazily produced output bodies of a single `process` call.
pub type Outputs = Box<dyn Iterator<Item = Result<Bytes>>>;

/// Outputs consisting of exactly one body.
pub fn once(body: impl Into<Bytes>) -> Outputs {
    Box::new(std::iter::once(Ok(body.into())))
}

/// Outputs dropping the chunk.
pub fn none() -> Outputs {
    Box::new(std::iter::empty())
}

/// How a pipeline drives its units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Call `reverse` instead of `process`.
    pub reverse: bool,
    /// Propagate the first unit failure and terminate the stream.
    pub strict: bool,
}

/// A pipeline stage.
pub trait Unit {
    fn name(&self) -> &str;

    /// Transforms one chunk into zero or more output bodies.
    fn process(&self, chunk: &Chunk) -> Result<Outputs>;

    /// Inverts `process`. Units without an inverse fail with `Error::NotInvertible`.
    fn reverse(&self, chunk: &Chunk) -> Result<Bytes> {
        let _ = chunk;
        Err(Error::NotInvertible(self.name().to_owned()))
    }

    /// Strict units terminate the stream on failure even in a lenient pipeline.
    fn is_strict(&self) -> bool {
        false
    }

    /// Whether every input chunk opens a new frame for the chunks emitted from it.
    fn opens_frame(&self) -> bool {
        false
    }

    fn filter<'a>(&'a self, chunks: ChunkStream<'a>, mode: Mode) -> ChunkStream<'a> {
        Box::new(Filter::new(self, chunks, mode))
    }
}

impl<U: Unit + ?Sized> Unit for Box<U> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&self, chunk: &Chunk) -> Result<Outputs> {
        (**self).process(chunk)
    }

    fn reverse(&self, chunk: &Chunk) -> Result<Bytes> {
        (**self).reverse(chunk)
    }

    fn is_strict(&self) -> bool {
        (**self).is_strict()
    }

    fn opens_frame(&self) -> bool {
        (**self).opens_frame()
    }

    fn filter<'a>(&'a self, chunks: ChunkStream<'a>, mode: Mode) -> ChunkStream<'a> {
        (**self).filter(chunks, mode)
    }
}

/// Logs and swallows `error` unless the unit or the mode is strict.
fn recover<U: Unit + ?Sized>(unit: &U, mode: Mode, error: Error) -> Option<Error> {
    if mode.strict || unit.is_strict() {
        return Some(error);
    }
    warn!(unit = unit.name(), error = %error, "dropping chunk");
    None
}

enum State {
    Idle,
    Emitting { template: Chunk, outputs: Outputs },
    Done,
}

/// The default filter: processes visible chunks one at a time.
pub struct Filter<'a, U: ?Sized> {
    unit: &'a U,
    input: ChunkStream<'a>,
    mode: Mode,
    state: State,
}

impl<'a, U: Unit + ?Sized> Filter<'a, U> {
    pub fn new(unit: &'a U, input: ChunkStream<'a>, mode: Mode) -> Self {
        Self {
            unit,
            input,
            mode,
            state: State::Idle,
        }
    }

    fn fail(&mut self, error: Error) -> Option<Result<Chunk>> {
        let error = recover(self.unit, self.mode, error)?;
        self.state = State::Done;
        Some(Err(error))
    }
}

impl<U: Unit + ?Sized> Iterator for Filter<'_, U> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.state, State::Idle) {
                State::Done => {
                    self.state = State::Done;
                    return None;
                }

                State::Emitting {
                    template,
                    mut outputs,
                } => match outputs.next() {
                    Some(Ok(body)) => {
                        let chunk = template.derive(body);
                        self.state = State::Emitting { template, outputs };
                        return Some(Ok(chunk));
                    }
                    Some(Err(e)) => {
                        if let Some(item) = self.fail(e) {
                            return Some(item);
                        }
                    }
                    None => {}
                },

                State::Idle => {
                    let chunk = match self.input.next() {
                        Some(Ok(chunk)) => chunk,
                        Some(Err(e)) => return Some(Err(e)),
                        None => {
                            self.state = State::Done;
                            return None;
                        }
                    };

                    // Passthrough
                    if !chunk.visible {
                        return Some(Ok(chunk));
                    }

                    if self.mode.reverse {
                        match self.unit.reverse(&chunk) {
                            Ok(body) => return Some(Ok(chunk.with_body(body))),
                            Err(e) => {
                                if let Some(item) = self.fail(e) {
                                    return Some(item);
                                }
                            }
                        }
                    } else {
                        match self.unit.process(&chunk) {
                            Ok(outputs) => {
                                self.state = State::Emitting {
                                    template: chunk,
                                    outputs,
                                }
                            }
                            Err(e) => {
                                if let Some(item) = self.fail(e) {
                                    return Some(item);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A filter for units that annotate, hide or drop chunks instead of transforming bodies.
///
/// `f` is called for every visible chunk and returns whether to keep it.
/// Errors follow the same policy as the default filter.
pub fn map_chunks<'a, U, F>(unit: &'a U, chunks: ChunkStream<'a>, mode: Mode, f: F) -> ChunkStream<'a>
where
    U: Unit + ?Sized,
    F: FnMut(&mut Chunk) -> Result<bool> + 'a,
{
    Box::new(MapChunks {
        unit,
        input: chunks,
        mode,
        f,
        done: false,
    })
}

struct MapChunks<'a, U: ?Sized, F> {
    unit: &'a U,
    input: ChunkStream<'a>,
    mode: Mode,
    f: F,
    done: bool,
}

impl<U, F> Iterator for MapChunks<'_, U, F>
where
    U: Unit + ?Sized,
    F: FnMut(&mut Chunk) -> Result<bool>,
{
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let mut chunk = match self.input.next() {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    return None;
                }
            };

            if !chunk.visible {
                return Some(Ok(chunk));
            }

            match (self.f)(&mut chunk) {
                Ok(true) => return Some(Ok(chunk)),
                Ok(false) => {}
                Err(e) => {
                    if let Some(error) = recover(self.unit, self.mode, e) {
                        self.done = true;
                        return Some(Err(error));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "tests/unit_tests.rs"]
mod tests;
