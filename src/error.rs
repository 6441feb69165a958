//! Error types for archive construction.

use thiserror::Error;

/// Errors returned by [`ZipWriter`](crate::ZipWriter) and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A listener or the compressor failed while emitting bytes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry path cannot be stored in the archive.
    #[error("invalid entry path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The encoded entry name does not fit the 16-bit name length field.
    #[error("entry name {path:?} is {len} bytes long (max 65535)")]
    NameTooLong { path: String, len: usize },

    /// The entry is too large for 32-bit size fields (no ZIP64).
    #[error("entry {path:?} exceeds 4 GiB limit ({size} bytes)")]
    EntryTooLarge { path: String, size: u64 },

    /// The central directory would hold more records than the end record can count.
    #[error("too many entries: {0} (max 65535)")]
    TooManyEntries(usize),

    /// A record would start past the 32-bit offset range.
    #[error("archive exceeds 4 GiB limit at offset {0}")]
    ArchiveTooLarge(u64),

    /// Compression levels are 0 (stored) through 9.
    #[error("invalid compression level {0} (expected 0-9)")]
    InvalidLevel(u32),

    /// The archive was already finalized.
    #[error("archive already finished")]
    Finished,

    /// An earlier call failed after bytes were emitted; the output is unusable.
    #[error("archive stream is broken by an earlier error")]
    Poisoned,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
