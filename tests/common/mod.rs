//! Minimal ZIP reader used to check what the writer produced.
//!
//! Reads the EOCD from the end, then the central directory, then each
//! local header through the offset the central directory points at. It
//! also checks that local entries sit back to back with no gaps.

#![allow(dead_code)]

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::cell::RefCell;
use std::io::{Cursor, Read};
use std::rc::Rc;

use zipstream::zip::{
    CentralDirectoryHeader, CompressionMethod, DataDescriptor, EndOfCentralDirectory,
    LocalFileHeader,
};
use zipstream::{ZipOptions, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eocd {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: CompressionMethod,
    pub time: u16,
    pub date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub lfh_offset: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub offset: u64,
    pub version_needed: u16,
    pub flags: u16,
    pub method: CompressionMethod,
    pub time: u16,
    pub date: u16,
    pub deferred: [u8; 12],
    pub name: String,
    pub data: Vec<u8>,
    /// (crc32, compressed, uncompressed); `None` for directories
    pub descriptor: Option<(u32, u32, u32)>,
    /// Offset right after this entry's last byte
    pub end: u64,
}

#[derive(Debug)]
pub struct ParsedArchive {
    pub eocd: Eocd,
    pub central: Vec<CentralEntry>,
    pub locals: Vec<LocalEntry>,
}

impl ParsedArchive {
    pub fn names(&self) -> Vec<&str> {
        self.central.iter().map(|e| e.name.as_str()).collect()
    }

    /// Uncompressed content of the entry called `name`.
    pub fn contents(&self, name: &str) -> Vec<u8> {
        let local = self
            .locals
            .iter()
            .find(|l| l.name == name)
            .unwrap_or_else(|| panic!("no entry {name}"));
        match local.method {
            CompressionMethod::Stored => local.data.clone(),
            CompressionMethod::Deflate => inflate(&local.data),
        }
    }
}

/// The writer only ever produces methods 0 and 8.
fn read_method(cursor: &mut Cursor<&[u8]>) -> CompressionMethod {
    match cursor.read_u16::<LittleEndian>().unwrap() {
        0 => CompressionMethod::Stored,
        8 => CompressionMethod::Deflate,
        other => panic!("unexpected compression method {other}"),
    }
}

pub fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    DeflateDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

fn read_eocd(data: &[u8]) -> Eocd {
    assert!(data.len() >= EndOfCentralDirectory::SIZE, "archive too short");
    let start = data.len() - EndOfCentralDirectory::SIZE;
    assert_eq!(&data[start..start + 4], EndOfCentralDirectory::SIGNATURE);

    let mut cursor = Cursor::new(&data[start + 4..]);
    Eocd {
        disk_number: cursor.read_u16::<LittleEndian>().unwrap(),
        disk_with_cd: cursor.read_u16::<LittleEndian>().unwrap(),
        disk_entries: cursor.read_u16::<LittleEndian>().unwrap(),
        total_entries: cursor.read_u16::<LittleEndian>().unwrap(),
        cd_size: cursor.read_u32::<LittleEndian>().unwrap(),
        cd_offset: cursor.read_u32::<LittleEndian>().unwrap(),
        comment_len: cursor.read_u16::<LittleEndian>().unwrap(),
    }
}

fn read_cdfh(cursor: &mut Cursor<&[u8]>) -> CentralEntry {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig).unwrap();
    assert_eq!(sig, CentralDirectoryHeader::SIGNATURE);

    let version_made_by = cursor.read_u16::<LittleEndian>().unwrap();
    let version_needed = cursor.read_u16::<LittleEndian>().unwrap();
    let flags = cursor.read_u16::<LittleEndian>().unwrap();
    let method = read_method(cursor);
    let time = cursor.read_u16::<LittleEndian>().unwrap();
    let date = cursor.read_u16::<LittleEndian>().unwrap();
    let crc32 = cursor.read_u32::<LittleEndian>().unwrap();
    let compressed_size = cursor.read_u32::<LittleEndian>().unwrap();
    let uncompressed_size = cursor.read_u32::<LittleEndian>().unwrap();
    let name_len = cursor.read_u16::<LittleEndian>().unwrap();
    let extra_len = cursor.read_u16::<LittleEndian>().unwrap();
    let comment_len = cursor.read_u16::<LittleEndian>().unwrap();
    let disk_start = cursor.read_u16::<LittleEndian>().unwrap();
    let internal_attrs = cursor.read_u16::<LittleEndian>().unwrap();
    let external_attrs = cursor.read_u32::<LittleEndian>().unwrap();
    assert_eq!(
        (extra_len, comment_len, disk_start, internal_attrs, external_attrs),
        (0, 0, 0, 0, 0)
    );
    let lfh_offset = cursor.read_u32::<LittleEndian>().unwrap();

    let mut name = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name).unwrap();

    CentralEntry {
        version_made_by,
        version_needed,
        flags,
        method,
        time,
        date,
        crc32,
        compressed_size,
        uncompressed_size,
        lfh_offset,
        name: String::from_utf8(name).unwrap(),
    }
}

fn read_local(data: &[u8], entry: &CentralEntry) -> LocalEntry {
    let offset = entry.lfh_offset as usize;
    assert_eq!(&data[offset..offset + 4], LocalFileHeader::SIGNATURE);

    let mut cursor = Cursor::new(&data[offset + 4..]);
    let version_needed = cursor.read_u16::<LittleEndian>().unwrap();
    let flags = cursor.read_u16::<LittleEndian>().unwrap();
    let method = read_method(&mut cursor);
    let time = cursor.read_u16::<LittleEndian>().unwrap();
    let date = cursor.read_u16::<LittleEndian>().unwrap();
    let mut deferred = [0u8; 12];
    cursor.read_exact(&mut deferred).unwrap();
    let name_len = cursor.read_u16::<LittleEndian>().unwrap() as usize;
    let extra_len = cursor.read_u16::<LittleEndian>().unwrap();
    assert_eq!(extra_len, 0);
    let mut name = vec![0u8; name_len];
    cursor.read_exact(&mut name).unwrap();
    let name = String::from_utf8(name).unwrap();

    let data_start = offset + LocalFileHeader::SIZE + name_len;
    if name.ends_with('/') {
        return LocalEntry {
            offset: offset as u64,
            version_needed,
            flags,
            method,
            time,
            date,
            deferred,
            name,
            data: Vec::new(),
            descriptor: None,
            end: data_start as u64,
        };
    }

    let data_end = data_start + entry.compressed_size as usize;
    let content = data[data_start..data_end].to_vec();
    let descriptor = &data[data_end..data_end + DataDescriptor::SIZE];
    assert_eq!(&descriptor[0..4], DataDescriptor::SIGNATURE);
    let mut cursor = Cursor::new(&descriptor[4..]);
    let descriptor = (
        cursor.read_u32::<LittleEndian>().unwrap(),
        cursor.read_u32::<LittleEndian>().unwrap(),
        cursor.read_u32::<LittleEndian>().unwrap(),
    );

    LocalEntry {
        offset: offset as u64,
        version_needed,
        flags,
        method,
        time,
        date,
        deferred,
        name,
        data: content,
        descriptor: Some(descriptor),
        end: (data_end + DataDescriptor::SIZE) as u64,
    }
}

/// Parse a complete archive and check its structural invariants.
pub fn parse(data: &[u8]) -> ParsedArchive {
    let eocd = read_eocd(data);
    let cd_start = eocd.cd_offset as usize;
    let cd_end = cd_start + eocd.cd_size as usize;
    assert_eq!(
        cd_end + EndOfCentralDirectory::SIZE,
        data.len(),
        "central directory must end right before the EOCD"
    );

    let mut cursor = Cursor::new(&data[cd_start..cd_end]);
    let central: Vec<CentralEntry> = (0..eocd.total_entries)
        .map(|_| read_cdfh(&mut cursor))
        .collect();
    assert_eq!(cursor.position() as usize, cd_end - cd_start);

    let locals: Vec<LocalEntry> = central.iter().map(|e| read_local(data, e)).collect();

    // local entries are contiguous and in central directory order
    let mut expected = 0u64;
    for local in &locals {
        assert_eq!(local.offset, expected, "gap before {}", local.name);
        expected = local.end;
    }
    assert_eq!(expected, eocd.cd_offset as u64);

    ParsedArchive {
        eocd,
        central,
        locals,
    }
}

/// Run `build` against a fresh writer and return the emitted chunks.
pub fn build_chunks<F>(options: ZipOptions, build: F) -> Vec<Vec<u8>>
where
    F: FnOnce(&mut ZipWriter<'_>),
{
    let chunks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&chunks);

    let mut writer = ZipWriter::new(options);
    writer.on_data(move |chunk| {
        sink.borrow_mut().push(chunk.to_vec());
        Ok(())
    });
    build(&mut writer);
    drop(writer);

    Rc::try_unwrap(chunks).unwrap().into_inner()
}

/// Run `build` and return the archive bytes.
pub fn build(options: ZipOptions, f: impl FnOnce(&mut ZipWriter<'_>)) -> Vec<u8> {
    build_chunks(options, f).concat()
}
