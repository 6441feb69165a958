mod checksum;
mod compress;

pub use checksum::crc32;
pub use compress::{CompressOptions, Compressor, DEFAULT_CHUNK_SIZE, DeflateCompressor};

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Callback receiving one chunk of archive bytes
pub type DataListener<'a> = Box<dyn FnMut(&[u8]) -> io::Result<()> + 'a>;

/// Callback run once when the archive is complete
pub type EndListener<'a> = Box<dyn FnMut() -> io::Result<()> + 'a>;

/// Ordered observer lists for the two stream events.
///
/// Listeners run synchronously in registration order. The first listener
/// error stops delivery of that event and is returned to the emitter.
#[derive(Default)]
pub struct Emitter<'a> {
    data: Vec<DataListener<'a>>,
    end: Vec<EndListener<'a>>,
}

impl<'a> Emitter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_data<F>(&mut self, listener: F)
    where
        F: FnMut(&[u8]) -> io::Result<()> + 'a,
    {
        self.data.push(Box::new(listener));
    }

    pub fn on_end<F>(&mut self, listener: F)
    where
        F: FnMut() -> io::Result<()> + 'a,
    {
        self.end.push(Box::new(listener));
    }

    /// Forward every chunk into `writer` and flush it at the end.
    pub fn pipe_to<W: Write + 'a>(&mut self, writer: W) {
        let writer = Rc::new(RefCell::new(writer));
        let sink = Rc::clone(&writer);
        self.on_data(move |chunk| sink.borrow_mut().write_all(chunk));
        self.on_end(move || writer.borrow_mut().flush());
    }

    pub fn emit_data(&mut self, chunk: &[u8]) -> io::Result<()> {
        for listener in &mut self.data {
            listener(chunk)?;
        }
        Ok(())
    }

    pub fn emit_end(&mut self) -> io::Result<()> {
        for listener in &mut self.end {
            listener()?;
        }
        Ok(())
    }
}
