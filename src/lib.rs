//! # zipstream
//!
//! A single-pass ZIP writer that emits the archive as a stream of chunks.
//!
//! Entries are encoded and handed to listeners one record at a time, so an
//! archive of any size can be produced while only the central directory is
//! kept in memory. Earlier bytes are never rewritten, which makes the output
//! suitable for pipes, sockets and HTTP response bodies.
//!
//! ## Features
//!
//! - STORED and DEFLATE entries, deflate level 1-9
//! - Automatic parent directory entries with deduplication
//! - Data descriptors (general purpose bit 3) for unknown-size streaming
//! - Pluggable compressor through the [`Compressor`] trait
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use zipstream::{ZipOptions, ZipWriter};
//!
//! fn main() -> anyhow::Result<()> {
//!     let file = File::create("out.zip")?;
//!
//!     let mut writer = ZipWriter::new(ZipOptions::default());
//!     writer.pipe_to(file);
//!
//!     writer.write_path("src/main.rs", b"fn main() {}", None)?;
//!     writer.write_directory("empty")?;
//!     let summary = writer.finish()?;
//!
//!     println!("{} entries, {} bytes", summary.entries, summary.total_size);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{CompressOptions, Compressor, DeflateCompressor, Emitter};
pub use zip::{ArchiveSummary, DosDateTime, ZipOptions, ZipWriter};
