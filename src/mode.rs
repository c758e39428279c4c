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

    src/mode.rs

    Track encoding mode, dispatched by match rather than virtual method
    per the re-architecture notes.
*/
use strum::EnumIter;

#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter)]
pub enum TrackEncoding {
    /// IBM 3740 single-density.
    Fm,
    /// IBM System/34 double-density.
    Mfm,
    /// DEC RX02 hybrid: FM-encoded IDAMs on a double-density track.
    Rx02,
    /// Intel double-density (modified FM).
    M2fm,
}

impl TrackEncoding {
    /// Whether this encoding requires the image to be marked double-density.
    pub fn requires_double_density(self) -> bool {
        !matches!(self, TrackEncoding::Fm)
    }

    /// Whether the on-disk IDAM pointer for this encoding sets the MFM high bit.
    pub fn is_mfm_flagged(self) -> bool {
        matches!(self, TrackEncoding::Mfm)
    }
}
