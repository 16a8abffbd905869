use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The stream does not start with the 8-byte PNG signature.
    #[error("invalid PNG signature: {0}")]
    InvalidSignature(String),

    #[error("no IHDR chunk found")]
    MissingIhdr,

    #[error("invalid IHDR chunk: {0}")]
    InvalidIhdr(String),

    /// IHDR was present but no IDAT bytes were collected.
    #[error("no image data found (no IDAT chunks)")]
    EmptyPayload,

    /// An RLE record or archive body ends before its declared length.
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    #[error("invalid archive header: {0}")]
    InvalidArchiveHeader(String),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    #[error("CRC mismatch in {chunk} chunk: expected {expected:#010x}, found {found:#010x}")]
    CrcMismatch {
        chunk: String,
        expected: u32,
        found: u32,
    },

    /// Chunk data longer than the 2^31 - 1 bytes a PNG chunk may hold.
    #[error("chunk data of {0} bytes exceeds the PNG chunk limit")]
    ChunkTooLarge(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

