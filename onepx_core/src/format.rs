/// PNG file signature: `\x89PNG\r\n\x1a\n`.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Size of the fixed per-chunk framing in bytes.
///   length:u32 + type[4] + crc:u32 = 12
pub const CHUNK_OVERHEAD: usize = 12;

// ── Chunk types ────────────────────────────────────────────────────────────

pub const IHDR: [u8; 4] = *b"IHDR";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";

// ── Fixed chunks ───────────────────────────────────────────────────────────

/// Complete IHDR chunk for a 1×1 image.
///   length = 13
///   width:u32 = 1, height:u32 = 1
///   bit_depth = 8, color_type = 2 (truecolor)
///   compression = 0, filter = 0, interlace = 0
///   crc = 0x907753de
pub const IHDR_CHUNK: [u8; 25] = [
    0x00, 0x00, 0x00, 0x0d,
    0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x01,
    0x08, 0x02, 0x00, 0x00, 0x00,
    0x90, 0x77, 0x53, 0xde,
];

/// Complete IEND chunk. Empty payload, so the bytes never change.
pub const IEND_CHUNK: [u8; 12] = [
    0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

// ── Pixel payload ──────────────────────────────────────────────────────────

/// Scanline filter type 0 ("None").
pub const FILTER_NONE: u8 = 0;

/// Uncompressed scanline length: filter byte + R + G + B.
pub const RAW_SCANLINE_LEN: usize = 4;

/// Capacity of the compressed-output buffer.
///
/// A zlib stream of 4 input bytes needs at most 2 (header) + 5 (one stored
/// block header) + 4 (data) + 4 (adler32) = 15 bytes, so 50 leaves ample
/// headroom. The encoder still checks the stream finished inside it.
pub const DEFLATE_BOUND: usize = 50;

// ── Helpers ────────────────────────────────────────────────────────────────

/// Big-endian representation of a host-order `u32`, as every PNG integer
/// field (chunk lengths, CRCs, dimensions) is stored.
#[inline]
pub fn be32(n: u32) -> [u8; 4] {
    n.to_be_bytes()
}

/// CRC-32 over `tag ++ payload`, the checksum trailing every PNG chunk.
pub fn chunk_crc(tag: &[u8; 4], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(tag);
    hasher.update(payload);
    hasher.finalize()
}
