/// CRC-32 (IEEE, reflected 0xEDB88320) of the uncompressed entry bytes.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
