//! Reading and writing whole PNG containers.
//!
//! Only IHDR, IDAT and IEND are interpreted. IDAT contents are kept as an
//! opaque payload (no inflate, no unfiltering), and output files are always
//! the minimal `signature, IHDR, IDAT, IEND` form.

use crate::chunk::{read_fill, write_chunk, Chunk, ChunkType};
use crate::container::{ImageContainer, ImageInfo};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Reject chunks whose stored CRC does not match. Off by default: a bad
    /// CRC is only logged.
    pub verify_crc: bool,
}

pub fn read_container<R: Read>(mut reader: R, options: &ReadOptions) -> Result<ImageContainer> {
    let mut signature = [0u8; 8];
    let read = read_fill(&mut reader, &mut signature)?;
    if read < signature.len() {
        return Err(Error::InvalidSignature(format!(
            "stream too short ({read} bytes)"
        )));
    }
    if signature != SIGNATURE {
        return Err(Error::InvalidSignature(format!(
            "found {}",
            hex::encode(signature)
        )));
    }

    let mut info: Option<ImageInfo> = None;
    let mut payload = Vec::new();
    let mut idat_chunks = 0usize;

    while let Some(chunk) = Chunk::read(&mut reader)? {
        let expected = chunk.expected_crc();
        if expected != chunk.crc {
            if options.verify_crc {
                return Err(Error::CrcMismatch {
                    chunk: chunk.kind.to_string(),
                    expected,
                    found: chunk.crc,
                });
            }
            warn!(
                "{} chunk CRC mismatch: expected {expected:08x}, found {:08x}",
                chunk.kind, chunk.crc
            );
        }

        match chunk.kind {
            ChunkType::IHDR => {
                info = Some(ImageInfo::from_ihdr(&chunk.data)?);
            }
            ChunkType::IDAT => {
                payload.extend_from_slice(&chunk.data);
                idat_chunks += 1;
            }
            ChunkType::IEND => {
                if info.is_some() && !payload.is_empty() {
                    break;
                }
                debug!("IEND before any usable image data, reading on");
            }
            other => trace!("skipping {other} chunk"),
        }
    }

    let info = info.ok_or(Error::MissingIhdr)?;
    if payload.is_empty() {
        return Err(Error::EmptyPayload);
    }
    debug!(
        "read {}x{} {} image, bit depth {}, {} bytes in {idat_chunks} IDAT chunk(s)",
        info.width,
        info.height,
        info.color_type,
        info.bit_depth,
        payload.len()
    );
    Ok(ImageContainer::new(info, payload))
}

pub fn write_container<W: Write>(mut writer: W, info: &ImageInfo, payload: &[u8]) -> Result<()> {
    if info.width == 0 || info.height == 0 {
        return Err(Error::InvalidDimensions {
            width: info.width,
            height: info.height,
        });
    }
    writer.write_all(&SIGNATURE)?;
    write_chunk(&mut writer, ChunkType::IHDR, &info.to_ihdr())?;
    write_chunk(&mut writer, ChunkType::IDAT, payload)?;
    write_chunk(&mut writer, ChunkType::IEND, &[])?;
    writer.flush()?;
    debug!(
        "wrote {}x{} {} image, {} payload bytes",
        info.width,
        info.height,
        info.color_type,
        payload.len()
    );
    Ok(())
}

pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<ImageContainer> {
    let file = File::open(path.as_ref())?;
    read_container(BufReader::new(file), options)
}

pub fn write_file<P: AsRef<Path>>(path: P, image: &ImageContainer) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_container(BufWriter::new(file), &image.info, &image.payload)
}

/// Appends `.png` unless the name already ends with it.
pub fn with_png_extension<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path.to_string_lossy().ends_with(".png") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".png");
        PathBuf::from(name)
    }
}
