use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::{self, Write};

/// Default size of the chunks handed to the sink.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Options passed through to the compressor on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Preferred size of emitted compressed chunks
    pub chunk_size: usize,
    /// Hint that the compressor may reuse internal buffers across entries.
    /// Its effect is up to the compressor.
    pub share_memory: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            share_memory: false,
        }
    }
}

/// Push-style compressor.
///
/// Implementations must call `on_chunk` synchronously, in order, with
/// fragments that together form the complete compressed stream for `input`,
/// and must return only after the last fragment was delivered. Empty input
/// is valid and may produce zero or more chunks.
pub trait Compressor {
    fn compress(
        &mut self,
        input: &[u8],
        level: u32,
        options: &CompressOptions,
        on_chunk: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> io::Result<()>;
}

/// Raw deflate (no zlib header), as stored under method 8.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeflateCompressor;

impl Compressor for DeflateCompressor {
    fn compress(
        &mut self,
        input: &[u8],
        level: u32,
        options: &CompressOptions,
        on_chunk: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> io::Result<()> {
        let chunk_size = options.chunk_size.max(1);
        let sink = ChunkWriter::new(on_chunk, chunk_size);
        let mut encoder = DeflateEncoder::new(sink, Compression::new(level.min(9)));

        for piece in input.chunks(chunk_size) {
            encoder.write_all(piece)?;
        }

        let mut sink = encoder.finish()?;
        sink.flush_remaining()
    }
}

/// Re-slices whatever the encoder writes into `chunk_size` pieces.
///
/// After `on_chunk` fails once, every later write fails without calling it
/// again; this includes the writes a dropped `DeflateEncoder` makes while
/// finishing its stream.
struct ChunkWriter<'f> {
    on_chunk: &'f mut dyn FnMut(&[u8]) -> io::Result<()>,
    buf: Vec<u8>,
    chunk_size: usize,
    failed: bool,
}

impl<'f> ChunkWriter<'f> {
    fn new(on_chunk: &'f mut dyn FnMut(&[u8]) -> io::Result<()>, chunk_size: usize) -> Self {
        Self {
            on_chunk,
            buf: Vec::with_capacity(chunk_size),
            chunk_size,
            failed: false,
        }
    }

    fn deliver(&mut self) -> io::Result<()> {
        if self.failed {
            return Err(io::Error::other("chunk sink already failed"));
        }
        if let Err(err) = (self.on_chunk)(&self.buf) {
            self.failed = true;
            return Err(err);
        }
        self.buf.clear();
        Ok(())
    }

    fn flush_remaining(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.deliver()?;
        }
        Ok(())
    }
}

impl Write for ChunkWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.failed {
            return Err(io::Error::other("chunk sink already failed"));
        }
        let mut rest = data;
        while !rest.is_empty() {
            let take = (self.chunk_size - self.buf.len()).min(rest.len());
            self.buf.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.buf.len() == self.chunk_size {
                self.deliver()?;
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
