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
*/

//! `dmkfox` reads, writes, and synthesizes DMK-format floppy disk images:
//! the sector-level container format that preserves the low-level track
//! layout (index marks, ID address marks, CRC-16, data fields, gap bytes)
//! of vintage IBM 3740 (FM) and System/34 (MFM) soft-sectored floppies.
//!
//! The [`image`] module is the primary entry point: [`image::DiskImage`]
//! opens or creates a `.dmk` file and exposes `seek`/`format_track`/
//! `read_id`/`read_sector`/`write_sector`. The [`codec`] module implements
//! the track-level FM and MFM layouts those operations are built from.

pub mod chs;
pub mod codec;
pub mod crc;
pub mod error;
pub mod geometry;
pub mod header;
pub mod image;
pub mod mode;
pub mod track_buffer;

pub use chs::SectorId;
pub use codec::{SectorCrcs, SectorSpec};
pub use error::{DmkError, DmkResult};
pub use geometry::{DataRate, Geometry, Rpm};
pub use image::DiskImage;
pub use mode::TrackEncoding;
