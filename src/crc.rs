//! CRC-32 (IEEE 802.3) as used by PNG chunk trailers.

const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 == 1 {
                POLYNOMIAL ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Incremental CRC-32, so a chunk's type and data can be fed separately.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    c: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 { c: 0xFFFF_FFFF }
    }

    #[inline(always)]
    pub fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            let index = (self.c ^ *byte as u32) & 0xFF;
            self.c = TABLE[index as usize] ^ (self.c >> 8);
        }
    }

    pub fn finalize(&self) -> u32 {
        self.c ^ 0xFFFF_FFFF
    }

    pub fn reset(&mut self) {
        self.c = 0xFFFF_FFFF;
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(bytes);
    crc.finalize()
}

#[cfg(test)]
mod tests {
    use super::{crc32, Crc32};

    #[test]
    fn test_empty() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn test_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_iend_trailer() {
        // every PNG ends with this CRC
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn test_incremental() {
        let mut crc = Crc32::new();
        crc.update(b"IHDR");
        crc.update(&hex::decode("00000001000000010802000000").unwrap());
        let whole = crc32(&hex::decode("4948445200000001000000010802000000").unwrap());
        assert_eq!(crc.finalize(), whole);

        crc.reset();
        assert_eq!(crc.finalize(), 0);
    }
}
