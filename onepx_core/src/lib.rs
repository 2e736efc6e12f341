pub mod chunk;
pub mod color;
pub mod format;
pub mod writer;

pub use chunk::{ChunkError, CompressedPixel, Frame, IdatPart, StreamCondition};
pub use color::{ParseColorError, Rgb};
pub use format::{IEND_CHUNK, IHDR_CHUNK, PNG_SIGNATURE};
pub use writer::{encode_to_vec, ErrorPolicy, PngWriter, WriteReport};
