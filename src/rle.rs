use crate::{MAX_SPAN, MIN_RUN_LENGTH, RUN_MARKER};
use std::io;

/// Streaming encoder. Bytes are held back until enough lookahead is
/// available to decide the next record exactly as a one-shot encoding of
/// the whole input would.
pub struct Rle<W> {
    pending: Vec<u8>,
    writer: W,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Record {
    Run { value: u8, count: usize },
    Literal { len: usize },
}

impl<W: io::Write> Rle<W> {
    pub fn new(writer: W) -> Self {
        Rle {
            pending: Vec::with_capacity(2 * MAX_SPAN),
            writer,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        self.pending.push(byte);
        self.drain(false)
    }

    /// Emits records while the window is long enough, or until nothing is
    /// left when `all` is set.
    fn drain(&mut self, all: bool) -> io::Result<()> {
        let mut start = 0;
        while self.pending.len() - start >= MAX_SPAN || (all && start < self.pending.len()) {
            let window = &self.pending[start..];
            let record = Record::scan(window);
            trace!("record {record:?} at pending offset {start}");
            record.encode(window, &mut self.writer)?;
            start += record.consumed();
        }
        if start > 0 {
            self.pending.drain(..start);
        }
        Ok(())
    }

    pub fn finalize(mut self) -> io::Result<()> {
        trace!("last {} pending bytes", self.pending.len());
        self.drain(true)?;
        self.writer.flush()
    }
}

impl Record {
    /// Decides the record starting at `window[0]`. Never looks past index
    /// `MAX_SPAN - 1`.
    #[inline(always)]
    fn scan(window: &[u8]) -> Record {
        debug_assert!(!window.is_empty());
        let value = window[0];
        let mut count = 1;
        while count < window.len() && count < MAX_SPAN && window[count] == value {
            count += 1;
        }
        if count >= MIN_RUN_LENGTH {
            return Record::Run { value, count };
        }

        // stop before the third byte of a repeat so no literal holds one
        let mut len = 1;
        while len < window.len()
            && len < MAX_SPAN
            && (len < 3 || window[len] != window[len - 1] || window[len] != window[len - 2])
        {
            len += 1;
        }
        Record::Literal { len }
    }

    fn consumed(self) -> usize {
        match self {
            Record::Run { count, .. } => count,
            Record::Literal { len } => len,
        }
    }

    #[inline(always)]
    fn encode<W: io::Write>(self, window: &[u8], writer: &mut W) -> io::Result<()> {
        match self {
            Record::Run { value, count } => {
                debug_assert!(count <= MAX_SPAN);
                writer.write_all(&[RUN_MARKER, value, count as u8])
            }
            Record::Literal { len } => {
                debug_assert!((1..=MAX_SPAN).contains(&len));
                let control = (len - 1) as u8;
                debug_assert!(control != RUN_MARKER);
                writer.write_all(&[control])?;
                writer.write_all(&window[..len])
            }
        }
    }
}

impl<W: io::Write> io::Write for Rle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.drain(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One-shot encoding of a whole buffer.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_SPAN + 1);
    let mut rle = Rle::new(&mut out);
    io::Write::write_all(&mut rle, input)
        .and_then(|()| rle.finalize())
        .expect("Vec writer");
    out
}

#[cfg(test)]
mod tests {
    use super::{encode, Rle};
    use crate::test_utils::{noise, setup};
    use std::io::Write;

    const TEST_VECTOR: [(&str, &str); 16] = [
        ("", ""),
        ("41", "0041"),
        ("070707", "02070707"),
        ("07070707", "ff0704"),
        ("0102020203", "02010202010203"),
        ("0102030405", "040102030405"),
        ("0102050505050505", "0301020505ff0504"),
        ("090909090901", "ff09050001"),
        ("aaaaaa", "02aaaaaa"),
        ("0000000000000000", "ff0008"),
        ("01010201010201", "0601010201010201"),
        ("ff", "00ff"),
        ("ffffffff", "ffff04"),
        ("fefefefefe", "fffe05"),
        ("010203030303030303040506", "0301020303ff030502040506"),
        ("0a0b0b0b0b0c0c0c0d", "020a0b0b030b0b0c0c010c0d"),
    ];

    #[test]
    fn test_rle_encode() {
        setup();
        for (input, expected) in TEST_VECTOR.into_iter() {
            let input = hex::decode(input).unwrap();
            let expected = hex::decode(expected).unwrap();
            let mut out = vec![];
            let mut rle = Rle::new(&mut out);
            rle.write_all(&input).unwrap();
            rle.finalize().unwrap();
            assert_eq!(expected, out, "input {}", hex::encode(&input));
        }
    }

    #[test]
    fn test_run_cap() {
        setup();
        let out = encode(&[0xAA; 300]);
        assert_eq!(hex::encode(out), "ffaaffffaa2d");
    }

    #[test]
    fn test_literal_cap() {
        setup();
        let input: Vec<u8> = (0..=255).collect();
        let out = encode(&input);
        assert_eq!(out.len(), 258);
        assert_eq!(out[0], 0xFE);
        assert_eq!(&out[1..256], &input[..255]);
        assert_eq!(&out[256..], &[0x00, 0xFF]);
    }

    #[test]
    fn test_three_run_is_literal() {
        setup();
        for input in [
            &[9u8, 9, 9][..],
            &[1, 9, 9, 9][..],
            &[9, 9, 9, 1][..],
            &[1, 2, 9, 9, 9, 3, 4][..],
        ] {
            let out = encode(input);
            assert!(
                !out.contains(&0xFF),
                "{} used a run record",
                hex::encode(input)
            );
        }
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        setup();
        let input = noise(5000);
        let expected = encode(&input);
        for piece in [1, 2, 7, 254, 255, 256, 1000] {
            let mut out = vec![];
            let mut rle = Rle::new(&mut out);
            for part in input.chunks(piece) {
                rle.write_all(part).unwrap();
            }
            rle.finalize().unwrap();
            assert_eq!(expected, out, "piece size {piece}");
        }

        let mut out = vec![];
        let mut rle = Rle::new(&mut out);
        for byte in &input {
            rle.update(*byte).unwrap();
        }
        rle.finalize().unwrap();
        assert_eq!(expected, out);
    }
}
