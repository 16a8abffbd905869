//! `.samet` archives: a text header line followed by the image payload.
//!
//! ```text
//! <width> <height> <channels> <body size>\n
//! <body size bytes>
//! ```
//!
//! With [`ArchiveCodec::Rle`] the body is the RLE encoding of the payload and
//! the size counts encoded bytes. [`ArchiveCodec::Raw`] stores the payload
//! as is, which is the layout older archives use.

use crate::container::{ImageContainer, ImageInfo};
use crate::error::{Error, Result};
use crate::{decode, encode};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ARCHIVE_EXTENSION: &str = "samet";
const ARCHIVE_SUFFIX: &str = ".samet";

/// Longest header line accepted, newline included.
const MAX_HEADER_LENGTH: u64 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveCodec {
    #[default]
    Rle,
    Raw,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    pub codec: ArchiveCodec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    /// Number of body bytes following the header line.
    pub payload_size: u64,
}

impl fmt::Display for ArchiveHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.width, self.height, self.channels, self.payload_size
        )
    }
}

impl FromStr for ArchiveHeader {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        if fields.len() != 4 {
            return Err(Error::InvalidArchiveHeader(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        }
        fn field<T: FromStr>(name: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| Error::InvalidArchiveHeader(format!("bad {name} {value:?}")))
        }
        let header = ArchiveHeader {
            width: field("width", fields[0])?,
            height: field("height", fields[1])?,
            channels: field("channels", fields[2])?,
            payload_size: field("payload size", fields[3])?,
        };
        if !matches!(header.channels, 1 | 3 | 4) {
            return Err(Error::InvalidArchiveHeader(format!(
                "unsupported channel count {}",
                header.channels
            )));
        }
        if header.width == 0 || header.height == 0 {
            return Err(Error::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }
        Ok(header)
    }
}

pub fn write_archive<W: Write>(
    mut writer: W,
    image: &ImageContainer,
    options: &ArchiveOptions,
) -> Result<()> {
    let info = &image.info;
    if info.width == 0 || info.height == 0 {
        return Err(Error::InvalidDimensions {
            width: info.width,
            height: info.height,
        });
    }

    let encoded;
    let body = match options.codec {
        ArchiveCodec::Rle => {
            encoded = encode(&image.payload);
            &encoded[..]
        }
        ArchiveCodec::Raw => &image.payload[..],
    };
    let header = ArchiveHeader {
        width: info.width,
        height: info.height,
        channels: info.channels(),
        payload_size: body.len() as u64,
    };
    debug!(
        "archive header {header}, {:?} body of {} bytes for {} payload bytes",
        options.codec,
        body.len(),
        image.payload.len()
    );
    writeln!(writer, "{header}")?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

pub fn read_archive<R: BufRead>(mut reader: R, options: &ArchiveOptions) -> Result<ImageContainer> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(MAX_HEADER_LENGTH)
        .read_until(b'\n', &mut line)?;
    if line.last() != Some(&b'\n') {
        return Err(Error::InvalidArchiveHeader(if line.is_empty() {
            "empty archive".to_string()
        } else {
            "header line is not terminated".to_string()
        }));
    }
    let line = std::str::from_utf8(&line)
        .map_err(|_| Error::InvalidArchiveHeader("header is not text".to_string()))?;
    let header: ArchiveHeader = line.parse()?;
    debug!("archive header {header}");

    let mut body = Vec::new();
    reader
        .by_ref()
        .take(header.payload_size)
        .read_to_end(&mut body)?;
    if (body.len() as u64) < header.payload_size {
        return Err(Error::TruncatedInput(format!(
            "archive body has {} of {} bytes",
            body.len(),
            header.payload_size
        )));
    }

    let payload = match options.codec {
        ArchiveCodec::Rle => decode(&body)?,
        ArchiveCodec::Raw => body,
    };
    let info = ImageInfo::new(header.width, header.height, header.channels);
    Ok(ImageContainer::new(info, payload))
}

pub fn save_archive<P: AsRef<Path>>(
    path: P,
    image: &ImageContainer,
    options: &ArchiveOptions,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_archive(BufWriter::new(file), image, options)
}

pub fn load_archive<P: AsRef<Path>>(path: P, options: &ArchiveOptions) -> Result<ImageContainer> {
    let file = File::open(path.as_ref())?;
    read_archive(BufReader::new(file), options)
}

/// Appends `.samet` unless the name already ends with it.
pub fn archive_path<P: AsRef<Path>>(stem: P) -> PathBuf {
    let stem = stem.as_ref();
    if has_archive_extension(stem) {
        stem.to_path_buf()
    } else {
        let mut name = stem.as_os_str().to_owned();
        name.push(".");
        name.push(ARCHIVE_EXTENSION);
        PathBuf::from(name)
    }
}

/// `photo.samet` becomes `photo_decompressed.png`.
pub fn decompressed_png_path<P: AsRef<Path>>(archive: P) -> PathBuf {
    let archive = archive.as_ref();
    let name = archive.to_string_lossy();
    let base = name
        .strip_suffix(ARCHIVE_SUFFIX)
        .unwrap_or(&name);
    PathBuf::from(format!("{base}_decompressed.png"))
}

/// Suffix match on the whole name, so a bare `.samet` counts too.
fn has_archive_extension(path: &Path) -> bool {
    path.to_string_lossy().ends_with(ARCHIVE_SUFFIX)
}
