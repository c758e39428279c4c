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

    src/geometry.rs

    Disk geometry: sides, cylinder count, density, rotation speed, and the
    data rate that together determine a DMK image's track length.
*/
use crate::error::{DmkError, DmkResult};

/// Spindle speed in revolutions per minute.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rpm {
    Rpm300,
    Rpm360,
}

impl Rpm {
    pub fn as_u32(self) -> u32 {
        match self {
            Rpm::Rpm300 => 300,
            Rpm::Rpm360 => 360,
        }
    }
}

impl TryFrom<u32> for Rpm {
    type Error = DmkError;
    fn try_from(value: u32) -> DmkResult<Self> {
        match value {
            300 => Ok(Rpm::Rpm300),
            360 => Ok(Rpm::Rpm360),
            other => Err(DmkError::Geometry(format!("unsupported rpm: {other}"))),
        }
    }
}

/// Data transfer rate in Kbps.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DataRate {
    K125,
    K250,
    K300,
    K500,
}

impl DataRate {
    pub fn as_u32(self) -> u32 {
        match self {
            DataRate::K125 => 125,
            DataRate::K250 => 250,
            DataRate::K300 => 300,
            DataRate::K500 => 500,
        }
    }
}

impl TryFrom<u32> for DataRate {
    type Error = DmkError;
    fn try_from(value: u32) -> DmkResult<Self> {
        match value {
            125 => Ok(DataRate::K125),
            250 => Ok(DataRate::K250),
            300 => Ok(DataRate::K300),
            500 => Ok(DataRate::K500),
            other => Err(DmkError::Geometry(format!("unsupported data rate: {other} Kbps"))),
        }
    }
}

/// `track_length = (rate_kbps * 7500) / rpm`, per `spec.md` invariant 4.
pub fn track_length_from_rate(rate: DataRate, rpm: Rpm) -> u16 {
    ((rate.as_u32() as u64 * 7500) / rpm.as_u32() as u64) as u16
}

/// Full disk geometry, as supplied to `DiskImage::create` or derived from an
/// on-disk header by `DiskImage::open`.
#[derive(Copy, Clone, Debug)]
pub struct Geometry {
    pub double_sided: bool,
    pub cylinders: u8,
    pub double_density: bool,
    pub rpm: Rpm,
    pub rate: DataRate,
    pub track_length: u16,
}

impl Geometry {
    pub fn new(double_sided: bool, cylinders: u8, double_density: bool, rpm: Rpm, rate: DataRate) -> Self {
        Self {
            double_sided,
            cylinders,
            double_density,
            rpm,
            rate,
            track_length: track_length_from_rate(rate, rpm),
        }
    }

    pub fn sides(&self) -> u8 {
        if self.double_sided {
            2
        } else {
            1
        }
    }

    pub fn track_slot_index(&self, cylinder: u8, head: u8) -> usize {
        self.sides() as usize * cylinder as usize + head as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_length_matches_8_inch_sd() {
        // DMK_TRACK_LENGTH_8I_SD from the reference dmk.h
        assert_eq!(track_length_from_rate(DataRate::K250, Rpm::Rpm360), 5208);
    }

    #[test]
    fn track_length_matches_8_inch_dd() {
        // DMK_TRACK_LENGTH_8I_DD from the reference dmk.h
        assert_eq!(track_length_from_rate(DataRate::K500, Rpm::Rpm360), 10416);
    }

    #[test]
    fn rejects_unsupported_rpm() {
        assert!(Rpm::try_from(45).is_err());
    }
}
