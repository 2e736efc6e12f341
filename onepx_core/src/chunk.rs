use std::fmt;
use std::io::{self, Write};

use flate2::{Compress, Compression, FlushCompress, Status};
use tracing::debug;

use crate::color::Rgb;
use crate::format::{
    be32, chunk_crc, DEFLATE_BOUND, FILTER_NONE, IDAT, IEND_CHUNK, IHDR_CHUNK, PNG_SIGNATURE,
    RAW_SCANLINE_LEN,
};

// ── Errors ─────────────────────────────────────────────────────────────────

/// One of the three constant byte sequences framing every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Signature,
    Ihdr,
    Iend,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frame::Signature => "signature",
            Frame::Ihdr => "IHDR",
            Frame::Iend => "IEND",
        })
    }
}

/// The four sub-writes of the IDAT chunk, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdatPart {
    Length,
    Type,
    Data,
    Crc,
}

impl fmt::Display for IdatPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdatPart::Length => "length",
            IdatPart::Type => "type",
            IdatPart::Data => "compressed data",
            IdatPart::Crc => "crc",
        })
    }
}

/// What the output stream reported when a write came up short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCondition {
    /// The stream accepted zero bytes: disk full, closed pipe end, etc.
    Eof,
    Io,
}

impl StreamCondition {
    pub fn of(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WriteZero | io::ErrorKind::UnexpectedEof => StreamCondition::Eof,
            _ => StreamCondition::Io,
        }
    }
}

impl fmt::Display for StreamCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamCondition::Eof => "EOF reached",
            StreamCondition::Io => "I/O error",
        })
    }
}

/// Failure while emitting a chunk. The `Display` text is the diagnostic line.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("failed to write {frame}: {}", StreamCondition::of(.source))]
    Frame {
        frame: Frame,
        #[source]
        source: io::Error,
    },

    #[error("idat write {part} failed: {}", StreamCondition::of(.source))]
    Idat {
        part: IdatPart,
        #[source]
        source: io::Error,
    },

    #[error("idat compression failed: {0}")]
    Compression(String),
}

impl ChunkError {
    /// Stream condition behind a write failure; `None` for compression errors.
    pub fn condition(&self) -> Option<StreamCondition> {
        match self {
            ChunkError::Frame { source, .. } | ChunkError::Idat { source, .. } => {
                Some(StreamCondition::of(source))
            }
            ChunkError::Compression(_) => None,
        }
    }
}

// ── Fixed chunks ───────────────────────────────────────────────────────────

fn write_fixed<W: Write>(out: &mut W, frame: Frame, bytes: &[u8]) -> Result<(), ChunkError> {
    out.write_all(bytes)
        .map_err(|source| ChunkError::Frame { frame, source })?;
    debug!(%frame, len = bytes.len(), "wrote fixed frame");
    Ok(())
}

/// Write the 8-byte PNG signature.
pub fn write_signature<W: Write>(out: &mut W) -> Result<(), ChunkError> {
    write_fixed(out, Frame::Signature, &PNG_SIGNATURE)
}

/// Write the precomputed 1×1 truecolor IHDR chunk.
pub fn write_ihdr<W: Write>(out: &mut W) -> Result<(), ChunkError> {
    write_fixed(out, Frame::Ihdr, &IHDR_CHUNK)
}

/// Write the IEND chunk.
pub fn write_iend<W: Write>(out: &mut W) -> Result<(), ChunkError> {
    write_fixed(out, Frame::Iend, &IEND_CHUNK)
}

// ── Pixel data ─────────────────────────────────────────────────────────────

/// Zlib stream holding the single filtered scanline.
///
/// Backed by a fixed [`DEFLATE_BOUND`]-byte buffer; only the first `len`
/// bytes (the compressor's reported output) are meaningful.
#[derive(Clone, Copy)]
pub struct CompressedPixel {
    buf: [u8; DEFLATE_BOUND],
    len: usize,
}

impl CompressedPixel {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for CompressedPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompressedPixel").field(&self.as_bytes()).finish()
    }
}

/// Compress `[FILTER_NONE, r, g, b]` at level 9 in a single call.
///
/// The whole stream must be finished within [`DEFLATE_BOUND`] bytes;
/// anything else is reported instead of being truncated.
pub fn compress_pixel(color: Rgb) -> Result<CompressedPixel, ChunkError> {
    let [r, g, b] = color.channels();
    let raw: [u8; RAW_SCANLINE_LEN] = [FILTER_NONE, r, g, b];
    let mut buf = [0u8; DEFLATE_BOUND];

    let mut z = Compress::new(Compression::best(), true);
    let status = z
        .compress(&raw, &mut buf, FlushCompress::Finish)
        .map_err(|e| ChunkError::Compression(e.to_string()))?;

    if status != Status::StreamEnd || z.total_in() != RAW_SCANLINE_LEN as u64 {
        return Err(ChunkError::Compression(format!(
            "stream did not finish within {} bytes (consumed {} of {} input bytes)",
            DEFLATE_BOUND,
            z.total_in(),
            RAW_SCANLINE_LEN
        )));
    }

    let len = z.total_out() as usize;
    debug_assert!(len <= DEFLATE_BOUND);
    Ok(CompressedPixel { buf, len })
}

fn idat_err(part: IdatPart) -> impl FnOnce(io::Error) -> ChunkError {
    move |source| ChunkError::Idat { part, source }
}

/// Compress `color` and write the IDAT chunk.
///
/// The length, type, data and CRC writes are checked one by one; the first
/// failure is returned and the rest of the chunk is skipped. A compression
/// failure is raised before any byte is written.
pub fn write_idat<W: Write>(out: &mut W, color: Rgb) -> Result<(), ChunkError> {
    let compressed = compress_pixel(color)?;
    let data = compressed.as_bytes();

    out.write_all(&be32(data.len() as u32))
        .map_err(idat_err(IdatPart::Length))?;
    out.write_all(&IDAT).map_err(idat_err(IdatPart::Type))?;
    out.write_all(data).map_err(idat_err(IdatPart::Data))?;
    out.write_all(&be32(chunk_crc(&IDAT, data)))
        .map_err(idat_err(IdatPart::Crc))?;

    debug!(%color, len = data.len(), "wrote IDAT");
    Ok(())
}
