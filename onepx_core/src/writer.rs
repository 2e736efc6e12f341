use std::io::Write;

use tracing::debug;

use crate::chunk::{write_iend, write_idat, write_ihdr, write_signature, ChunkError};
use crate::color::Rgb;
use crate::format::{CHUNK_OVERHEAD, DEFLATE_BOUND, IEND_CHUNK, IHDR_CHUNK, PNG_SIGNATURE};

/// How chunk failures are propagated while writing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Legacy behaviour. A failed signature/IHDR/IEND write is recorded and
    /// the next chunk is still written; a failed IDAT sub-write abandons the
    /// rest of IDAT, then IEND is still written. Nothing is returned as `Err`.
    #[default]
    Compat,
    /// Stop at the first failure and return it.
    FailFast,
}

impl ErrorPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorPolicy::Compat => "compat",
            ErrorPolicy::FailFast => "fail-fast",
        }
    }
}

/// Failures recorded (not propagated) under [`ErrorPolicy::Compat`], in the
/// order they happened. Always empty under [`ErrorPolicy::FailFast`].
#[derive(Debug, Default)]
pub struct WriteReport {
    pub errors: Vec<ChunkError>,
}

impl WriteReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes a complete 1×1 truecolor PNG to `out`.
///
/// # Layout written
/// ```text
/// [SIGNATURE: 8 bytes]
/// [IHDR: 25 bytes, constant]
/// [IDAT: 12 + n bytes, n = zlib stream length]
/// [IEND: 12 bytes, constant]
/// ```
pub struct PngWriter<W: Write> {
    out: W,
    policy: ErrorPolicy,
}

impl<W: Write> PngWriter<W> {
    pub fn new(out: W, policy: ErrorPolicy) -> Self {
        Self { out, policy }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Write signature, IHDR, IDAT and IEND in that order.
    pub fn write_image(&mut self, color: Rgb) -> Result<WriteReport, ChunkError> {
        let policy = self.policy;
        let mut report = WriteReport::default();

        settle(policy, write_signature(&mut self.out), &mut report)?;
        settle(policy, write_ihdr(&mut self.out), &mut report)?;
        settle(policy, write_idat(&mut self.out, color), &mut report)?;
        settle(policy, write_iend(&mut self.out), &mut report)?;

        Ok(report)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn settle(
    policy: ErrorPolicy,
    result: Result<(), ChunkError>,
    report: &mut WriteReport,
) -> Result<(), ChunkError> {
    match (result, policy) {
        (Ok(()), _) => Ok(()),
        (Err(e), ErrorPolicy::FailFast) => Err(e),
        (Err(e), ErrorPolicy::Compat) => {
            debug!(error = %e, "continuing after chunk failure");
            report.errors.push(e);
            Ok(())
        }
    }
}

/// Largest file this crate can produce.
pub const MAX_FILE_LEN: usize =
    PNG_SIGNATURE.len() + IHDR_CHUNK.len() + CHUNK_OVERHEAD + DEFLATE_BOUND + IEND_CHUNK.len();

/// Encode `color` as a complete PNG file in memory.
pub fn encode_to_vec(color: Rgb) -> Result<Vec<u8>, ChunkError> {
    let mut writer = PngWriter::new(Vec::with_capacity(MAX_FILE_LEN), ErrorPolicy::FailFast);
    writer.write_image(color)?;
    Ok(writer.into_inner())
}
