use crate::chunk::Chunk;
use crate::error::Result;
use std::io::Read;

/// Initial buffer capacity when reading a source.
const READ_CAPACITY: usize = 4096;

///
/// Reads all of `reader` into a single root chunk.
///
/// ## Errors
///
/// Returns `Error::Io` if reading fails.
///
pub fn read_source<R: Read>(mut reader: R) -> Result<Chunk> {
    let mut data = Vec::with_capacity(READ_CAPACITY);
    reader.read_to_end(&mut data)?;
    Ok(Chunk::new(data))
}
