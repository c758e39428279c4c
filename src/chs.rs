/*
    dmkfox

    Copyright 2025

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/chs.rs

    Sector identity: the (cylinder, head, sector, size_code) tuple stamped
    into every ID address mark.
*/
use std::fmt::{Display, Formatter};

/// A sector's logical identity as encoded in its ID address mark.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
pub struct SectorId {
    pub cylinder: u8,
    pub head: u8,
    pub sector: u8,
    pub size_code: u8,
}

impl SectorId {
    pub fn new(cylinder: u8, head: u8, sector: u8, size_code: u8) -> Self {
        Self {
            cylinder,
            head,
            sector,
            size_code,
        }
    }

    /// Payload length in bytes: `128 << size_code`.
    pub fn size(&self) -> usize {
        size_code_to_len(self.size_code)
    }
}

impl Display for SectorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[c:{} h:{} s:{} n:{}]",
            self.cylinder, self.head, self.sector, self.size_code
        )
    }
}

/// `128 << size_code`, clamped to the four values the DMK format recognizes.
pub fn size_code_to_len(size_code: u8) -> usize {
    128usize << (size_code & 0x03)
}

/// Inverse of [`size_code_to_len`]; returns `None` if `len` is not one of
/// 128, 256, 512, or 1024.
pub fn len_to_size_code(len: usize) -> Option<u8> {
    match len {
        128 => Some(0),
        256 => Some(1),
        512 => Some(2),
        1024 => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_code_roundtrips() {
        for code in 0..4u8 {
            let len = size_code_to_len(code);
            assert_eq!(len_to_size_code(len), Some(code));
        }
    }

    #[test]
    fn size_code_is_masked_to_two_bits() {
        assert_eq!(size_code_to_len(0), 128);
        assert_eq!(size_code_to_len(3), 1024);
        // Out-of-range codes (not representable on real media) wrap via the mask
        // rather than panicking or overflowing.
        assert_eq!(size_code_to_len(4), 128);
    }

    #[test]
    fn unrecognized_length_has_no_size_code() {
        assert_eq!(len_to_size_code(100), None);
    }
}
