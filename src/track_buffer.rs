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

    src/track_buffer.rs

    Per-track state and the byte-stream cursor that models the FM
    byte-doubling rule on double-density media.
*/
use crate::error::{DmkError, DmkResult};
use crate::header::MAX_SECTORS_PER_TRACK;
use crate::mode::TrackEncoding;

/// The resident, possibly-dirty in-memory image of one track.
#[derive(Clone, Debug)]
pub struct TrackState {
    pub resident: bool,
    pub dirty: bool,
    pub idam_pointer: [u16; MAX_SECTORS_PER_TRACK],
    pub mfm_sector: [bool; MAX_SECTORS_PER_TRACK],
    pub buf: Vec<u8>,
}

impl TrackState {
    pub fn empty() -> Self {
        Self {
            resident: false,
            dirty: false,
            idam_pointer: [0; MAX_SECTORS_PER_TRACK],
            mfm_sector: [false; MAX_SECTORS_PER_TRACK],
            buf: Vec::new(),
        }
    }

    /// A freshly-materialized track for a brand new image: filled with
    /// 0xFF (gap-5 fill), empty IDAM table.
    pub fn new_virgin(track_length: u16) -> Self {
        Self {
            resident: true,
            dirty: false,
            idam_pointer: [0; MAX_SECTORS_PER_TRACK],
            mfm_sector: [false; MAX_SECTORS_PER_TRACK],
            buf: vec![0xff; track_length as usize],
        }
    }
}

/// Cursor over a track's raw byte buffer. Advances by one physical byte per
/// logical byte normally, or by two when the image is double-density and
/// the current mode is FM (each logical FM byte is doubled on DD media).
pub struct Cursor<'t> {
    buf: &'t mut [u8],
    pos: usize,
    double_step: bool,
}

impl<'t> Cursor<'t> {
    pub fn new(buf: &'t mut [u8], dd_image: bool, mode: TrackEncoding) -> Self {
        Self {
            buf,
            pos: 0,
            double_step: dd_image && matches!(mode, TrackEncoding::Fm | TrackEncoding::Rx02),
        }
    }

    pub fn at(buf: &'t mut [u8], pos: usize, dd_image: bool, mode: TrackEncoding) -> Self {
        let mut c = Self::new(buf, dd_image, mode);
        c.pos = pos;
        c
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Remaining *logical* bytes before the cursor runs off the end of the
    /// buffer: physical bytes remaining divided by the step size, so
    /// callers filling the tail of a track don't have to know whether
    /// double-stepping is in effect.
    pub fn remaining_logical(&self) -> usize {
        let step = if self.double_step { 2 } else { 1 };
        (self.buf.len() - self.pos) / step
    }

    fn advance(&mut self) -> DmkResult<()> {
        self.pos += if self.double_step { 2 } else { 1 };
        if self.pos > self.buf.len() {
            return Err(DmkError::CursorOverflow);
        }
        Ok(())
    }

    /// Read `out.len()` logical bytes, feeding each into `crc` as it is consumed.
    pub fn read_bytes(&mut self, out: &mut [u8], crc: &mut crate::crc::Crc16) -> DmkResult<()> {
        for slot in out.iter_mut() {
            if self.pos >= self.buf.len() {
                return Err(DmkError::CursorOverflow);
            }
            let b = self.buf[self.pos];
            self.advance()?;
            crc.update(b);
            *slot = b;
        }
        Ok(())
    }

    pub fn read_byte(&mut self, crc: &mut crate::crc::Crc16) -> DmkResult<u8> {
        let mut b = [0u8];
        self.read_bytes(&mut b, crc)?;
        Ok(b[0])
    }

    /// Write `data`, doubling each byte into the following physical slot when
    /// in DD+FM mode, and feeding each logical byte into `crc`.
    pub fn write_bytes(&mut self, data: &[u8], crc: &mut crate::crc::Crc16) -> DmkResult<()> {
        for &b in data {
            if self.pos >= self.buf.len() {
                return Err(DmkError::CursorOverflow);
            }
            crc.update(b);
            self.buf[self.pos] = b;
            if self.double_step {
                let next = self.pos + 1;
                if next >= self.buf.len() {
                    return Err(DmkError::CursorOverflow);
                }
                self.buf[next] = b;
            }
            self.advance()?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, b: u8, crc: &mut crate::crc::Crc16) -> DmkResult<()> {
        self.write_bytes(&[b], crc)
    }

    /// Write `val` repeated `count` times.
    pub fn write_fill(&mut self, count: usize, val: u8, crc: &mut crate::crc::Crc16) -> DmkResult<()> {
        for _ in 0..count {
            self.write_byte(val, crc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::Crc16;

    #[test]
    fn single_density_cursor_advances_by_one() {
        let mut buf = vec![0u8; 8];
        let mut crc = Crc16::new();
        let mut cur = Cursor::new(&mut buf, false, TrackEncoding::Fm);
        cur.write_bytes(&[1, 2, 3], &mut crc).unwrap();
        assert_eq!(cur.position(), 3);
        assert_eq!(&buf[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn dd_fm_cursor_doubles_every_logical_byte() {
        let mut buf = vec![0u8; 8];
        let mut crc = Crc16::new();
        let mut cur = Cursor::new(&mut buf, true, TrackEncoding::Fm);
        cur.write_bytes(&[0xAA, 0xBB], &mut crc).unwrap();
        assert_eq!(cur.position(), 4);
        assert_eq!(&buf[..4], &[0xAA, 0xAA, 0xBB, 0xBB]);
        for p in 0..2 {
            assert_eq!(buf[2 * p], buf[2 * p + 1]);
        }
    }

    #[test]
    fn dd_mfm_cursor_does_not_double() {
        let mut buf = vec![0u8; 8];
        let mut crc = Crc16::new();
        let mut cur = Cursor::new(&mut buf, true, TrackEncoding::Mfm);
        cur.write_bytes(&[1, 2, 3, 4], &mut crc).unwrap();
        assert_eq!(cur.position(), 4);
    }

    #[test]
    fn cursor_overflow_is_a_hard_error_not_a_wrap() {
        let mut buf = vec![0u8; 2];
        let mut crc = Crc16::new();
        let mut cur = Cursor::new(&mut buf, false, TrackEncoding::Fm);
        cur.write_bytes(&[1, 2], &mut crc).unwrap();
        let err = cur.write_byte(3, &mut crc).unwrap_err();
        assert!(matches!(err, DmkError::CursorOverflow));
    }

    #[test]
    fn read_and_write_feed_the_same_crc() {
        let mut buf = vec![0u8; 4];
        let mut crc_w = Crc16::new();
        {
            let mut cur = Cursor::new(&mut buf, false, TrackEncoding::Fm);
            cur.write_bytes(&[1, 2, 3, 4], &mut crc_w).unwrap();
        }
        let mut crc_r = Crc16::new();
        let mut out = [0u8; 4];
        {
            let mut cur = Cursor::new(&mut buf, false, TrackEncoding::Fm);
            cur.read_bytes(&mut out, &mut crc_r).unwrap();
        }
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(crc_w.state(), crc_r.state());
    }
}
