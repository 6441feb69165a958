//! Single-pass archive engine.
//!
//! [`ZipWriter`] emits every record through an [`Emitter`] as soon as it is
//! built and never revisits earlier bytes. Sizes and checksums are written
//! after the content in a data descriptor, so the local header can go out
//! before the compressed size is known.
//!
//! ## Byte order of the stream
//!
//! ```text
//! [LFH dir/] [LFH file] [content...] [descriptor] ... [CDFH]* [EOCD]
//! ```
//!
//! Directory entries have no content and no descriptor. The central
//! directory repeats every entry in emission order.

use chrono::{Local, NaiveDateTime};
use log::{debug, trace};
use std::collections::HashSet;
use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::io::{CompressOptions, Compressor, DeflateCompressor, Emitter, crc32};

use super::path;
use super::structures::*;
use super::time::DosDateTime;

/// Default deflate level for entries written without an explicit level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Archive-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipOptions {
    /// Level used when a write passes `None`; 0 stores
    pub level: u32,
    /// Timestamp for every entry; `None` reads the local clock per entry
    pub modified: Option<NaiveDateTime>,
    /// Passed through to the compressor
    pub compress: CompressOptions,
}

impl Default for ZipOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            modified: None,
            compress: CompressOptions::default(),
        }
    }
}

impl ZipOptions {
    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.compress.chunk_size = chunk_size;
        self
    }

    pub fn share_memory(mut self, share_memory: bool) -> Self {
        self.compress.share_memory = share_memory;
        self
    }
}

/// Totals reported by [`ZipWriter::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Central directory records written
    pub entries: usize,
    /// Where the central directory starts
    pub central_directory_offset: u64,
    /// Size of the central directory in bytes
    pub central_directory_size: u64,
    /// Length of the whole archive
    pub total_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Finished,
    Poisoned,
}

/// Streaming ZIP writer.
///
/// Memory use grows with the number of entries, not with their size: only
/// the central directory records and the set of written directory names are
/// kept between calls.
///
/// ## Example
///
/// ```
/// use zipstream::{ZipOptions, ZipWriter};
///
/// let mut archive = Vec::new();
/// {
///     let mut writer = ZipWriter::new(ZipOptions::default());
///     writer.pipe_to(&mut archive);
///     writer.write_path("docs/readme.txt", b"hello", None)?;
///     writer.finish()?;
/// }
/// assert_eq!(&archive[0..4], b"PK\x03\x04");
/// # Ok::<(), zipstream::Error>(())
/// ```
pub struct ZipWriter<'a, C: Compressor = DeflateCompressor> {
    options: ZipOptions,
    compressor: C,
    emitter: Emitter<'a>,
    /// Bytes emitted so far; always the offset of the next record
    offset: u64,
    directories: HashSet<String>,
    central_directory: Vec<CentralDirectoryHeader>,
    state: State,
}

impl<'a> ZipWriter<'a> {
    /// Create a writer using the bundled deflate compressor.
    pub fn new(options: ZipOptions) -> Self {
        Self::with_compressor(options, DeflateCompressor)
    }
}

impl Default for ZipWriter<'_> {
    fn default() -> Self {
        Self::new(ZipOptions::default())
    }
}

impl<'a, C: Compressor> ZipWriter<'a, C> {
    /// Create a writer with a custom compressor.
    pub fn with_compressor(options: ZipOptions, compressor: C) -> Self {
        Self {
            options,
            compressor,
            emitter: Emitter::new(),
            offset: 0,
            directories: HashSet::new(),
            central_directory: Vec::new(),
            state: State::Open,
        }
    }

    /// Register a listener for archive bytes.
    pub fn on_data<F>(&mut self, listener: F)
    where
        F: FnMut(&[u8]) -> io::Result<()> + 'a,
    {
        self.emitter.on_data(listener);
    }

    /// Register a listener run once after the end record.
    pub fn on_end<F>(&mut self, listener: F)
    where
        F: FnMut() -> io::Result<()> + 'a,
    {
        self.emitter.on_end(listener);
    }

    /// Stream the archive into `writer`.
    pub fn pipe_to<W: Write + 'a>(&mut self, writer: W) {
        self.emitter.pipe_to(writer);
    }

    /// Bytes emitted so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Entries recorded for the central directory so far.
    pub fn entry_count(&self) -> usize {
        self.central_directory.len()
    }

    /// Central directory records in emission order.
    pub fn central_directory(&self) -> &[CentralDirectoryHeader] {
        &self.central_directory
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Add a directory entry.
    ///
    /// `path` gets a trailing `/` if it lacks one. Writing a directory that
    /// was already written, explicitly or as a parent of a file, emits
    /// nothing.
    pub fn write_directory(&mut self, path: &str) -> Result<()> {
        self.check_open()?;
        let name = path::directory_name(path)?;

        if self.directories.contains(&name) {
            trace!("directory {name} already written");
            return Ok(());
        }
        let lfh_offset = self.entry_offset()?;
        let stamp = self.timestamp();

        let header = LocalFileHeader {
            compression_method: CompressionMethod::Stored,
            last_mod_time: stamp.time(),
            last_mod_date: stamp.date(),
            file_name: name.as_bytes(),
        };
        let bytes = header.to_bytes()?;
        self.emit(&bytes)?;

        debug!("directory {name} at offset {lfh_offset}");
        self.central_directory.push(CentralDirectoryHeader {
            compression_method: CompressionMethod::Stored,
            last_mod_time: stamp.time(),
            last_mod_date: stamp.date(),
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            lfh_offset,
            file_name: name.clone().into_bytes(),
        });
        self.directories.insert(name);

        Ok(())
    }

    /// Add a file, writing an entry for each missing parent directory first.
    ///
    /// `"a/b/c.txt"` writes `a/` and `a/b/` (unless already present) and then
    /// the file itself.
    pub fn write_path(&mut self, path: &str, content: &[u8], level: Option<u32>) -> Result<()> {
        self.check_open()?;
        let name = path::file_name(path)?;
        self.resolve_level(level)?;
        content_size(name, content.len())?;

        for parent in path::ancestors(path) {
            self.write_directory(parent)?;
        }
        self.write_file(path, content, level)
    }

    /// Add a file entry.
    ///
    /// `level` of `None` uses [`ZipOptions::level`]; `Some(0)` stores the
    /// bytes as-is, `Some(1..=9)` deflates them. Parent directories are not
    /// added; see [`write_path`](Self::write_path).
    pub fn write_file(&mut self, path: &str, content: &[u8], level: Option<u32>) -> Result<()> {
        self.check_open()?;
        let name = path::file_name(path)?;
        let level = self.resolve_level(level)?;
        let uncompressed_size = content_size(name, content.len())?;
        let lfh_offset = self.entry_offset()?;

        let stamp = self.timestamp();
        let method = CompressionMethod::for_level(level);
        let header = LocalFileHeader {
            compression_method: method,
            last_mod_time: stamp.time(),
            last_mod_date: stamp.date(),
            file_name: name.as_bytes(),
        };
        let bytes = header.to_bytes()?;
        self.emit(&bytes)?;

        let compressed_size = match method {
            CompressionMethod::Deflate => self.emit_compressed(content, level)?,
            CompressionMethod::Stored => {
                if !content.is_empty() {
                    self.emit(content)?;
                }
                content.len() as u64
            }
        };
        let compressed_size = match u32::try_from(compressed_size) {
            Ok(size) => size,
            Err(_) => {
                self.state = State::Poisoned;
                return Err(Error::EntryTooLarge {
                    path: name.to_string(),
                    size: compressed_size,
                });
            }
        };

        let descriptor = DataDescriptor {
            crc32: crc32(content),
            compressed_size,
            uncompressed_size,
        };
        let bytes = descriptor.to_bytes()?;
        self.emit(&bytes)?;

        debug!(
            "file {name} at offset {lfh_offset}: {uncompressed_size} -> {compressed_size} bytes ({method:?})"
        );
        self.central_directory.push(CentralDirectoryHeader {
            compression_method: method,
            last_mod_time: stamp.time(),
            last_mod_date: stamp.date(),
            crc32: descriptor.crc32,
            compressed_size,
            uncompressed_size,
            lfh_offset,
            file_name: name.as_bytes().to_vec(),
        });

        Ok(())
    }

    /// Write the central directory and the end record, then signal the end
    /// of the stream. No further writes are accepted afterwards.
    pub fn finish(&mut self) -> Result<ArchiveSummary> {
        self.check_open()?;

        let entries = self.central_directory.len();
        let entry_count = u16::try_from(entries).map_err(|_| Error::TooManyEntries(entries))?;
        let cd_offset = self.offset;
        let cd_size: u64 = self
            .central_directory
            .iter()
            .map(|header| header.encoded_len() as u64)
            .sum();
        let cd_offset_u32 =
            u32::try_from(cd_offset).map_err(|_| Error::ArchiveTooLarge(cd_offset))?;
        let cd_size_u32 = u32::try_from(cd_size).map_err(|_| Error::ArchiveTooLarge(cd_offset))?;

        for index in 0..self.central_directory.len() {
            let bytes = self.central_directory[index].to_bytes()?;
            self.emit(&bytes)?;
        }

        let eocd = EndOfCentralDirectory::new(entry_count, cd_size_u32, cd_offset_u32);
        let bytes = eocd.to_bytes()?;
        self.emit(&bytes)?;

        if let Err(err) = self.emitter.emit_end() {
            self.state = State::Poisoned;
            return Err(err.into());
        }
        self.state = State::Finished;

        debug!("finished archive: {entries} entries, central directory {cd_size} bytes at {cd_offset}");
        Ok(ArchiveSummary {
            entries,
            central_directory_offset: cd_offset,
            central_directory_size: cd_size,
            total_size: self.offset,
        })
    }

    fn check_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Finished => Err(Error::Finished),
            State::Poisoned => Err(Error::Poisoned),
        }
    }

    fn resolve_level(&self, level: Option<u32>) -> Result<u32> {
        let level = level.unwrap_or(self.options.level);
        if level > 9 {
            return Err(Error::InvalidLevel(level));
        }
        Ok(level)
    }

    /// Offset for the next local header, if it still fits in 32 bits.
    fn entry_offset(&self) -> Result<u32> {
        u32::try_from(self.offset).map_err(|_| Error::ArchiveTooLarge(self.offset))
    }

    fn timestamp(&self) -> DosDateTime {
        let now = self
            .options
            .modified
            .unwrap_or_else(|| Local::now().naive_local());
        DosDateTime::from_naive(&now)
    }

    /// Hand one chunk to the listeners and advance the offset by its length.
    fn emit(&mut self, chunk: &[u8]) -> Result<()> {
        if let Err(err) = self.emitter.emit_data(chunk) {
            self.state = State::Poisoned;
            return Err(err.into());
        }
        self.offset += chunk.len() as u64;
        Ok(())
    }

    /// Deflate `content` straight into the listeners; returns the compressed size.
    fn emit_compressed(&mut self, content: &[u8], level: u32) -> Result<u64> {
        let Self {
            options,
            compressor,
            emitter,
            offset,
            ..
        } = self;

        let mut compressed = 0u64;
        let mut failed = false;
        let result = compressor.compress(content, level, &options.compress, &mut |chunk| {
            // a compressor may keep going after a rejected chunk; drop the rest
            if failed {
                return Err(io::Error::other("listener already failed"));
            }
            if let Err(err) = emitter.emit_data(chunk) {
                failed = true;
                return Err(err);
            }
            *offset += chunk.len() as u64;
            compressed += chunk.len() as u64;
            Ok(())
        });

        if let Err(err) = result {
            self.state = State::Poisoned;
            return Err(err.into());
        }
        if failed {
            self.state = State::Poisoned;
            return Err(io::Error::other("compressor ignored a listener error").into());
        }
        Ok(compressed)
    }
}

/// Content length as a 32-bit size field.
fn content_size(name: &str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::EntryTooLarge {
        path: name.to_string(),
        size: len as u64,
    })
}
