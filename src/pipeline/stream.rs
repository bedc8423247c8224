use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::unit::ChunkStream;
use bytes::BytesMut;
use futures::Stream;
use std::{
    iter,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, ReadBuf};

/// Bytes reserved for each read from the source.
const READ_SIZE: usize = 4096;

impl Pipeline {
    ///
    /// Creates a stream that reads `reader` to its end and then yields the
    /// output chunks of this pipeline for it.
    ///
    /// ## Arguments
    ///
    /// * `reader`: The source to read data from (must implement `AsyncRead`).
    ///
    pub fn as_stream<R>(&self, reader: R) -> PipelineStream<'_, R>
    where
        R: AsyncRead + Unpin,
    {
        PipelineStream {
            pipeline: self,
            reader,
            buf: BytesMut::with_capacity(READ_SIZE),
            eof: false,
            output: None,
        }
    }
}

pub struct PipelineStream<'a, R>
where
    R: AsyncRead + Unpin,
{
    pipeline: &'a Pipeline,
    reader: R,
    buf: BytesMut,
    eof: bool,
    output: Option<ChunkStream<'a>>,
}

impl<'a, R> Stream for PipelineStream<'a, R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<Chunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(output) = this.output.as_mut() {
                // Units are synchronous, the whole source is already in memory.
                return Poll::Ready(output.next());
            }

            if this.eof {
                let body = this.buf.split().freeze();
                this.output = Some(this.pipeline.run(iter::once(Chunk::new(body))));
                continue;
            }

            this.buf.reserve(READ_SIZE);

            let dst = this.buf.spare_capacity_mut();
            let mut read_buf = ReadBuf::uninit(dst);

            match Pin::new(&mut this.reader).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    this.eof = true;
                    this.output = Some(Box::new(iter::empty()));
                    return Poll::Ready(Some(Err(Error::Io(e))));
                }
                Poll::Ready(Ok(())) => {
                    let n = read_buf.filled().len();
                    if n == 0 {
                        this.eof = true;
                    } else {
                        // SAFETY: `read_buf` ensures `n` bytes were initialized/written.
                        unsafe {
                            let new_len = this.buf.len() + n;
                            this.buf.set_len(new_len);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
