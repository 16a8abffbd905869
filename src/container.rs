use crate::error::{Error, Result};
use std::fmt;

pub const IHDR_DATA_LENGTH: usize = 13;

/// Bit depth assumed when the source carries none (archives).
pub const DEFAULT_BIT_DEPTH: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Grayscale,
    Rgb,
    Rgba,
}

impl ColorType {
    /// Maps the IHDR color type byte. Codes other than 0, 2 and 6 (palette,
    /// grey + alpha, invalid values) are read as RGB.
    pub fn from_wire(code: u8) -> Self {
        match code {
            0 => ColorType::Grayscale,
            2 => ColorType::Rgb,
            6 => ColorType::Rgba,
            _ => ColorType::Rgb,
        }
    }

    pub fn wire_code(self) -> u8 {
        match self {
            ColorType::Grayscale => 0,
            ColorType::Rgb => 2,
            ColorType::Rgba => 6,
        }
    }

    /// 1 is greyscale, 3 is RGB, anything else RGBA.
    pub fn from_channels(channels: u8) -> Self {
        match channels {
            1 => ColorType::Grayscale,
            3 => ColorType::Rgb,
            _ => ColorType::Rgba,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            ColorType::Grayscale => 1,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorType::Grayscale => f.write_str("grayscale"),
            ColorType::Rgb => f.write_str("RGB"),
            ColorType::Rgba => f.write_str("RGBA"),
        }
    }
}

/// Everything the IHDR chunk says about an image that this crate keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        ImageInfo {
            width,
            height,
            bit_depth: DEFAULT_BIT_DEPTH,
            color_type: ColorType::from_channels(channels),
        }
    }

    pub fn channels(&self) -> u8 {
        self.color_type.channels()
    }

    pub fn from_ihdr(data: &[u8]) -> Result<Self> {
        if data.len() < IHDR_DATA_LENGTH {
            return Err(Error::InvalidIhdr(format!(
                "expected {IHDR_DATA_LENGTH} bytes, found {}",
                data.len()
            )));
        }
        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        if width == 0 || height == 0 {
            return Err(Error::InvalidIhdr(format!(
                "zero dimension {width}x{height}"
            )));
        }
        let info = ImageInfo {
            width,
            height,
            bit_depth: data[8],
            color_type: ColorType::from_wire(data[9]),
        };
        trace!("IHDR: {info:?}, wire color type {}", data[9]);
        Ok(info)
    }

    /// Compression, filter and interlace method are always written as 0.
    pub fn to_ihdr(&self) -> [u8; IHDR_DATA_LENGTH] {
        let mut data = [0u8; IHDR_DATA_LENGTH];
        data[0..4].copy_from_slice(&self.width.to_be_bytes());
        data[4..8].copy_from_slice(&self.height.to_be_bytes());
        data[8] = self.bit_depth;
        data[9] = self.color_type.wire_code();
        data
    }
}

/// Image metadata plus the opaque IDAT payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContainer {
    pub info: ImageInfo,
    pub payload: Vec<u8>,
}

impl ImageContainer {
    pub fn new(info: ImageInfo, payload: Vec<u8>) -> Self {
        ImageContainer { info, payload }
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn channels(&self) -> u8 {
        self.info.channels()
    }
}
