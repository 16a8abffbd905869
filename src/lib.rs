//! # RLE Encoding Scheme
//!
//! The stream is a sequence of records, each starting with a control byte.
//!
//! ```text
//!  ┌──────┬───────┬───────┐
//!  │ 0xFF │ value │ count │        run: `count` copies of `value`
//!  └──────┴───────┴───────┘
//!
//!  ┌──────┬────┬────┬─────┬──────┐
//!  │ N-1  │ b0 │ b1 │ ... │ bN-1 │  literal: N bytes verbatim, 1 <= N <= 255
//!  └──────┴────┴────┴─────┴──────┘
//! ```
//!
//! Literal control bytes range over 0..=254, leaving 0xFF free as the run
//! marker.
//!
//! Runs of 4 or more identical bytes (capped at 255 per record) become run
//! records. Everything else goes into literals, and a literal stops before
//! the third byte of a repeat, so runs of exactly 3 are always literal.
//!
//! The encoding does not include size. A record cut short at the end of the
//! input is an error.
//!
//! # Containers
//!
//! [`png`] reads the IHDR/IDAT/IEND skeleton of a PNG file and writes minimal
//! PNGs back. IDAT contents are treated as an opaque payload. [`archive`]
//! stores that payload, RLE encoded, behind a one-line text header.

#[macro_use]
extern crate log;

pub mod archive;
pub mod chunk;
pub mod container;
pub mod crc;
mod derle;
pub mod error;
pub mod png;
mod rle;

pub use archive::{ArchiveCodec, ArchiveHeader, ArchiveOptions};
pub use container::{ColorType, ImageContainer, ImageInfo};
pub use derle::{decode, DeRle};
pub use error::{Error, Result};
pub use png::ReadOptions;
pub use rle::{encode, Rle};

/// Control byte that starts a run record.
const RUN_MARKER: u8 = 0xFF;
/// Shortest run that is worth a run record.
const MIN_RUN_LENGTH: usize = 4;
/// Longest run or literal a single record can hold.
const MAX_SPAN: usize = 255;
