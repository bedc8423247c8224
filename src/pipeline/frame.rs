use crate::chunk::Chunk;
use crate::error::Result;
use crate::unit::{ChunkStream, Mode, Unit};
use bytes::BytesMut;
use std::cell::Cell;
use std::iter;
use std::rc::Rc;
use tracing::trace;

/// Hands out frame indices that are unique within one pipeline run.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameCounter(Rc<Cell<u64>>);

impl FrameCounter {
    fn next(&self) -> u64 {
        let index = self.0.get() + 1;
        self.0.set(index);
        index
    }
}

/// Runs a frame-opening unit one input chunk at a time. All chunks emitted
/// for one input chunk share a fresh frame index.
pub(crate) struct FrameOpener<'a> {
    unit: &'a dyn Unit,
    input: ChunkStream<'a>,
    mode: Mode,
    counter: FrameCounter,
    round: Option<ChunkStream<'a>>,
    frame: u64,
    position: usize,
    done: bool,
}

impl<'a> FrameOpener<'a> {
    pub(crate) fn new(unit: &'a dyn Unit, input: ChunkStream<'a>, mode: Mode, counter: FrameCounter) -> Self {
        Self {
            unit,
            input,
            mode,
            counter,
            round: None,
            frame: 0,
            position: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for FrameOpener<'a> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if let Some(round) = self.round.as_mut() {
                match round.next() {
                    Some(Ok(mut chunk)) => {
                        chunk.open_frame(self.frame, self.position);
                        self.position += 1;
                        return Some(Ok(chunk));
                    }
                    Some(Err(e)) => {
                        // Only strict failures reach this point.
                        self.done = true;
                        return Some(Err(e));
                    }
                    None => {
                        self.round = None;
                        continue;
                    }
                }
            }

            let mut chunk = match self.input.next() {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    return None;
                }
            };

            self.frame = self.counter.next();
            self.position = 0;

            if !chunk.visible {
                chunk.open_frame(self.frame, 0);
                return Some(Ok(chunk));
            }

            trace!(unit = self.unit.name(), frame = self.frame, "opening frame");
            let source: ChunkStream<'a> = Box::new(iter::once(Ok(chunk)));
            self.round = Some(self.unit.filter(source, self.mode));
        }
        None
    }
}

/// Leaves the innermost frame. Chunks hidden inside the frame are dropped,
/// meta variables set inside the frame are discarded. With `join`, the bodies
/// of consecutive chunks of the same frame are concatenated into one chunk.
pub(crate) struct FrameCloser<'a> {
    input: ChunkStream<'a>,
    join: bool,
    pending: Option<Joined>,
}

struct Joined {
    chunk: Chunk,
    body: BytesMut,
    frame: Option<u64>,
}

impl Joined {
    fn finish(self) -> Chunk {
        self.chunk.with_body(self.body.freeze())
    }
}

impl<'a> FrameCloser<'a> {
    pub(crate) fn new(input: ChunkStream<'a>, join: bool) -> Self {
        Self {
            input,
            join,
            pending: None,
        }
    }

    /// Closes the frame of `chunk`. Returns the index of the closed frame,
    /// or `None` for a chunk that was not inside a frame.
    fn close(chunk: &mut Chunk) -> Option<u64> {
        let frame = chunk.frame_index;
        chunk.close_frame().then(|| {
            trace!(frame, "closing frame");
            frame
        })
    }
}

impl Iterator for FrameCloser<'_> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chunk = match self.input.next() {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Some(Err(e)),
                None => return self.pending.take().map(|joined| Ok(joined.finish())),
            };

            if chunk.hidden_in_frame() {
                continue;
            }

            let frame = Self::close(&mut chunk);

            if !self.join {
                return Some(Ok(chunk));
            }

            if let Some(joined) = self.pending.as_mut() {
                if frame.is_some() && joined.frame == frame {
                    joined.body.extend_from_slice(&chunk.body);
                    continue;
                }
            }

            let body = BytesMut::from(&chunk.body[..]);
            let previous = self.pending.replace(Joined { chunk, body, frame });
            if let Some(joined) = previous {
                return Some(Ok(joined.finish()));
            }
        }
    }
}
