use crate::error::{Error, Result};
use crate::RUN_MARKER;
use std::io;

/// Streaming decoder. Records may be split across `write` calls at any byte.
pub struct DeRle<W> {
    status: DeRleStatus,
    writer: W,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DeRleStatus {
    /// Expecting a control byte.
    Control,
    RunValue,
    RunCount { value: u8 },
    Literal { remaining: usize },
}

impl<W: io::Write> DeRle<W> {
    pub fn new(writer: W) -> DeRle<W> {
        DeRle {
            status: DeRleStatus::Control,
            writer,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        self.feed(&[byte])
    }

    /// Consumes all of `buf`, copying literal spans in one go.
    fn feed(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while let Some((&byte, rest)) = buf.split_first() {
            match self.status {
                DeRleStatus::Control => {
                    self.status = if byte == RUN_MARKER {
                        DeRleStatus::RunValue
                    } else {
                        DeRleStatus::Literal {
                            remaining: byte as usize + 1,
                        }
                    };
                    buf = rest;
                }
                DeRleStatus::RunValue => {
                    self.status = DeRleStatus::RunCount { value: byte };
                    buf = rest;
                }
                DeRleStatus::RunCount { value } => {
                    trace!("decode run: value=0x{value:02X}, count={byte}");
                    self.writer.write_all(&[value].repeat(byte as usize))?;
                    self.status = DeRleStatus::Control;
                    buf = rest;
                }
                DeRleStatus::Literal { remaining } => {
                    let take = remaining.min(buf.len());
                    self.writer.write_all(&buf[..take])?;
                    self.status = if take == remaining {
                        DeRleStatus::Control
                    } else {
                        DeRleStatus::Literal {
                            remaining: remaining - take,
                        }
                    };
                    buf = &buf[take..];
                }
            }
        }
        Ok(())
    }

    /// Fails with [`Error::TruncatedInput`] if the input stopped inside a
    /// record.
    pub fn finalize(mut self) -> Result<()> {
        let missing = match self.status {
            DeRleStatus::Control => None,
            DeRleStatus::RunValue => Some("run record is missing its value and count".to_string()),
            DeRleStatus::RunCount { value } => {
                Some(format!("run record of 0x{value:02X} is missing its count"))
            }
            DeRleStatus::Literal { remaining } => {
                Some(format!("literal record is missing {remaining} byte(s)"))
            }
        };
        if let Some(reason) = missing {
            return Err(Error::TruncatedInput(reason));
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: io::Write> io::Write for DeRle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// One-shot decoding of a whole buffer.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 2);
    let mut derle = DeRle::new(&mut out);
    derle.feed(input)?;
    derle.finalize()?;
    Ok(out)
}
