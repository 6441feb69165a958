use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::Result;

/// Version needed to extract (2.0): deflate and data descriptors.
pub const VERSION_NEEDED: u16 = 20;

/// Version made by; same value, MS-DOS host.
pub const VERSION_MADE_BY: u16 = 20;

/// General purpose flag bit 3: crc32 and sizes follow the data in a descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// General purpose flag bit 11: name is UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// Flags written on every entry.
pub const GENERAL_PURPOSE_FLAGS: u16 = FLAG_DATA_DESCRIPTOR | FLAG_UTF8;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
        }
    }

    /// Method for a compression level: 0 stores, anything else deflates.
    pub fn for_level(level: u32) -> Self {
        if level == 0 {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflate
        }
    }
}

/// Local File Header (LFH) - 30 bytes + name
///
/// Written before the entry content. The crc32 and both sizes are left
/// zero because [`GENERAL_PURPOSE_FLAGS`] defers them to a [`DataDescriptor`].
#[derive(Debug, Clone)]
pub struct LocalFileHeader<'a> {
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub file_name: &'a [u8],
}

impl LocalFileHeader<'_> {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Total encoded length including the name.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        buf.write_u16::<LittleEndian>(GENERAL_PURPOSE_FLAGS)?;
        buf.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.last_mod_time)?;
        buf.write_u16::<LittleEndian>(self.last_mod_date)?;
        // crc32, compressed size, uncompressed size: deferred
        buf.extend_from_slice(&[0u8; 12]);
        buf.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        buf.write_u16::<LittleEndian>(0)?; // extra field length
        buf.extend_from_slice(self.file_name);
        Ok(buf)
    }
}

/// Data Descriptor - 16 bytes, signature included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    pub const SIGNATURE: &'static [u8] = b"PK\x07\x08";
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        Ok(buf)
    }
}

/// Central Directory File Header (CDFH) - 46 bytes + name
///
/// Owns its name so it can be kept until the archive is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub lfh_offset: u32,
    pub file_name: Vec<u8>,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.len()
    }

    pub fn is_directory(&self) -> bool {
        self.file_name.last() == Some(&b'/')
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        buf.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        buf.write_u16::<LittleEndian>(GENERAL_PURPOSE_FLAGS)?;
        buf.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.last_mod_time)?;
        buf.write_u16::<LittleEndian>(self.last_mod_date)?;
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        // extra length, comment length, disk start, internal and external attributes
        buf.extend_from_slice(&[0u8; 12]);
        buf.write_u32::<LittleEndian>(self.lfh_offset)?;
        buf.extend_from_slice(&self.file_name);
        Ok(buf)
    }
}

/// End of Central Directory (EOCD) - 22 bytes, no comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn new(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(0)?; // this disk
        buf.write_u16::<LittleEndian>(0)?; // disk with central directory
        buf.write_u16::<LittleEndian>(self.disk_entries)?;
        buf.write_u16::<LittleEndian>(self.total_entries)?;
        buf.write_u32::<LittleEndian>(self.cd_size)?;
        buf.write_u32::<LittleEndian>(self.cd_offset)?;
        buf.write_u16::<LittleEndian>(0)?; // comment length
        Ok(buf)
    }
}
