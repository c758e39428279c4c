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

    src/crc.rs

    CRC-16/CCITT (IBM 3740), the protected-field checksum used by every
    IDAM and data field on an IBM-compatible track. Polynomial 0x1021,
    initial value 0xFFFF, MSB-first, no reflection, no final XOR.
*/

const POLY: u16 = 0x1021;

/// Running CRC-16/CCITT accumulator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crc16(u16);

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc16 {
    pub fn new() -> Self {
        Crc16(0xFFFF)
    }

    pub fn state(&self) -> u16 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0xFFFF;
    }

    /// Feed a single byte into the accumulator.
    pub fn update(&mut self, byte: u8) {
        let mut crc = self.0;
        let mut d2 = (byte as u16) << 8;
        for _ in 0..8 {
            crc = (crc << 1) ^ if (crc ^ d2) & 0x8000 != 0 { POLY } else { 0 };
            d2 <<= 1;
        }
        self.0 = crc;
    }

    pub fn update_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.update(b);
        }
    }

    /// The two CRC bytes as stored on the wire (high byte first).
    pub fn bytes(&self) -> [u8; 2] {
        [(self.0 >> 8) as u8, (self.0 & 0xff) as u8]
    }
}

/// Convenience one-shot CRC over a byte slice, matching `fluxfox::util::crc_ibm_3740`.
pub fn crc_ibm_3740(data: &[u8], start: Option<u16>) -> u16 {
    let mut crc = Crc16(start.unwrap_or(0xFFFF));
    crc.update_all(data);
    crc.state()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_of_empty_is_init_value() {
        assert_eq!(crc_ibm_3740(&[], None), 0xFFFF);
    }

    #[test]
    fn crc_closure_holds_for_arbitrary_data() {
        // feeding a buffer followed by its own CRC bytes must fold to zero.
        let data = b"the quick brown fox jumps over the lazy dog";
        let crc = crc_ibm_3740(data, None);
        let mut full = data.to_vec();
        full.push((crc >> 8) as u8);
        full.push((crc & 0xff) as u8);
        assert_eq!(crc_ibm_3740(&full, None), 0);
    }

    #[test]
    fn known_vector_standard_ccitt() {
        // "123456789" -> 0x29B1 is the standard CRC-16/CCITT-FALSE test vector,
        // which uses the same poly/init/no-reflection parameters as IBM 3740.
        assert_eq!(crc_ibm_3740(b"123456789", None), 0x29B1);
    }

    #[test]
    fn mfm_sync_bytes_change_the_crc_domain() {
        let fm_crc = crc_ibm_3740(&[0xFE, 0, 0, 1, 0], None);
        let mfm_crc = crc_ibm_3740(&[0xA1, 0xA1, 0xA1, 0xFE, 0, 0, 1, 0], None);
        assert_ne!(fm_crc, mfm_crc);
    }

    #[test]
    fn incremental_update_matches_one_shot() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut crc = Crc16::new();
        crc.update_all(&data);
        assert_eq!(crc.state(), crc_ibm_3740(&data, None));
    }
}
