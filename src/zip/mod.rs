//! ZIP archive construction.
//!
//! This module builds ZIP archives in a single forward pass, emitting bytes
//! as soon as each record is known.
//!
//! ## Architecture
//!
//! - [`structures`]: record layouts (local header, data descriptor, central
//!   directory header, end record) and their encoders
//! - [`time`]: MS-DOS date/time packing
//! - [`path`]: entry name validation and parent directory expansion
//! - [`writer`]: the archive engine tying the records together
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers, content and data descriptors for each entry
//! 2. Central Directory with metadata for all entries
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Every entry sets general purpose bit 3, so the local header carries zero
//! crc32/sizes and the real values follow the content in a data descriptor.
//! That is what allows the header to be emitted before the compressed size
//! is known.
//!
//! ## Supported Features
//!
//! - STORED (no compression) and DEFLATE methods
//! - UTF-8 entry names (bit 11)
//!
//! ## Limitations
//!
//! - No ZIP64: entries, offsets and the central directory must stay below 4 GiB
//! - At most 65535 entries
//! - No encryption, comments or extra fields

mod path;
mod structures;
mod time;
mod writer;

pub use structures::*;
pub use time::DosDateTime;
pub use writer::{ArchiveSummary, DEFAULT_LEVEL, ZipOptions, ZipWriter};
