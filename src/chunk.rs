//! Length / type / data / CRC framing of a single PNG chunk.

use crate::crc::Crc32;
use crate::error::{Error, Result};
use std::fmt::{self, Debug};
use std::io::{self, Read, Write};

/// Largest data length a chunk may declare.
pub const MAX_CHUNK_LENGTH: usize = (1 << 31) - 1;

/// Four ASCII bytes packed big-endian.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkType(pub u32);

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(0x4948_4452);
    pub const IDAT: ChunkType = ChunkType(0x4944_4154);
    pub const IEND: ChunkType = ChunkType(0x4945_4E44);

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        ChunkType(u32::from_be_bytes(bytes))
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

pub struct Chunk {
    pub kind: ChunkType,
    pub data: Vec<u8>,
    /// CRC as found in the stream, or as computed by [`Chunk::new`].
    pub crc: u32,
}

impl Chunk {
    pub fn new(kind: ChunkType, data: Vec<u8>) -> Self {
        let crc = checksum(kind, &data);
        Chunk { kind, data, crc }
    }

    /// CRC over type and data as it should be, regardless of the stored one.
    pub fn expected_crc(&self) -> u32 {
        checksum(self.kind, &self.data)
    }

    /// Reads the next chunk.
    ///
    /// Returns `None` when fewer than 4 bytes remain for the length field, or
    /// when the stream ends partway through the chunk. A partial chunk is
    /// dropped, never returned.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Chunk>> {
        let mut length = [0u8; 4];
        if read_fill(reader, &mut length)? < length.len() {
            trace!("end of chunk stream");
            return Ok(None);
        }
        let length = u32::from_be_bytes(length);

        let mut kind = [0u8; 4];
        if read_fill(reader, &mut kind)? < kind.len() {
            warn!("chunk stream ends inside a chunk type, dropping it");
            return Ok(None);
        }
        let kind = ChunkType::from_bytes(kind);

        // `take` keeps an untrusted length from driving a huge allocation
        let mut data = Vec::new();
        reader.by_ref().take(length as u64).read_to_end(&mut data)?;
        if data.len() < length as usize {
            warn!(
                "{kind} chunk declares {length} bytes but only {} remain, dropping it",
                data.len()
            );
            return Ok(None);
        }

        let mut crc = [0u8; 4];
        if read_fill(reader, &mut crc)? < crc.len() {
            warn!("{kind} chunk has no CRC, dropping it");
            return Ok(None);
        }
        let crc = u32::from_be_bytes(crc);

        trace!("read {kind} chunk, length={length}, crc={crc:08x}");
        Ok(Some(Chunk { kind, data, crc }))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_chunk(writer, self.kind, &self.data)
    }
}

impl Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("kind", &self.kind)
            .field("length", &self.data.len())
            .field("crc", &format!("{:08x}", self.crc))
            .finish()
    }
}

/// Frames `data` as a chunk without copying it into a [`Chunk`] first.
pub fn write_chunk<W: Write>(writer: &mut W, kind: ChunkType, data: &[u8]) -> Result<()> {
    if data.len() > MAX_CHUNK_LENGTH {
        return Err(Error::ChunkTooLarge(data.len()));
    }
    let crc = checksum(kind, data);
    trace!("write {kind} chunk, length={}, crc={crc:08x}", data.len());
    writer.write_all(&(data.len() as u32).to_be_bytes())?;
    writer.write_all(&kind.to_bytes())?;
    writer.write_all(data)?;
    writer.write_all(&crc.to_be_bytes())?;
    Ok(())
}

fn checksum(kind: ChunkType, data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(&kind.to_bytes());
    crc.update(data);
    crc.finalize()
}

/// Like `read_exact`, but reports how much was read instead of failing at EOF.
pub(crate) fn read_fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::{Chunk, ChunkType};
    use crate::test_utils::setup;
    use std::io::Cursor;

    #[test]
    fn test_chunk_type() {
        assert_eq!(ChunkType::from_bytes(*b"IHDR"), ChunkType::IHDR);
        assert_eq!(ChunkType::from_bytes(*b"IDAT"), ChunkType::IDAT);
        assert_eq!(ChunkType::IEND.to_bytes(), *b"IEND");
        assert_eq!(ChunkType::from_bytes(*b"tEXt").to_string(), "tEXt");
        assert_eq!(ChunkType(0x0A00_4142).to_string(), "\\x0a\\x00AB");
    }

    #[test]
    fn test_write_iend() {
        setup();
        let mut out = vec![];
        Chunk::new(ChunkType::IEND, vec![]).write(&mut out).unwrap();
        assert_eq!(hex::encode(out), "0000000049454e44ae426082");
    }

    #[test]
    fn test_read_write() {
        setup();
        let mut out = vec![];
        let chunk = Chunk::new(ChunkType::IDAT, vec![1, 2, 3]);
        chunk.write(&mut out).unwrap();
        assert_eq!(out.len(), 4 + 4 + 3 + 4);

        let mut cursor = Cursor::new(out);
        let read = Chunk::read(&mut cursor).unwrap().unwrap();
        assert_eq!(read.kind, ChunkType::IDAT);
        assert_eq!(read.data, vec![1, 2, 3]);
        assert_eq!(read.crc, chunk.crc);
        assert_eq!(read.crc, read.expected_crc());
        assert!(Chunk::read(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_read_partial() {
        setup();
        // fewer than 4 bytes for the length
        let mut cursor = Cursor::new(vec![0, 0, 0]);
        assert!(Chunk::read(&mut cursor).unwrap().is_none());

        // declared length longer than the stream
        let mut cursor = Cursor::new(hex::decode("000000ff4944415401020304").unwrap());
        assert!(Chunk::read(&mut cursor).unwrap().is_none());

        // CRC cut short
        let mut cursor = Cursor::new(hex::decode("000000014944415401aabb").unwrap());
        assert!(Chunk::read(&mut cursor).unwrap().is_none());
    }
}
