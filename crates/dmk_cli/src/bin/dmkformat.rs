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

    Creates a fixed-geometry blank DMK image: 77 cylinders, double-sided,
    FM, 26 sectors of 128 bytes per track, filled with 0xE5. Matches the
    reference tool's hardcoded 8" SSSD/IBM-3740-compatible layout.
*/
use anyhow::{Context, Result};
use bpaf::Parser;
use std::path::PathBuf;

use dmk_cli::standard_rpm_rate;
use dmkfox::{DiskImage, SectorId, SectorSpec, TrackEncoding};

const CYLINDERS: u8 = 77;
const SECTORS_PER_TRACK: u8 = 26;
const FILL_BYTE: u8 = 0xe5;

fn image_path() -> impl Parser<PathBuf> {
    bpaf::positional::<PathBuf>("IMAGE").help("Path of the DMK image to create")
}

fn main() -> Result<()> {
    env_logger::init();
    let path = image_path().to_options().descr("dmkformat: create a blank DMK image").run();

    let (rpm, rate) = standard_rpm_rate();
    let mut image =
        DiskImage::create(&path, true, CYLINDERS, false, rpm, rate).with_context(|| format!("creating {}", path.display()))?;

    let sectors: Vec<SectorSpec> = (1..=SECTORS_PER_TRACK)
        .map(|s| SectorSpec::new(SectorId::new(0, 0, s, 0), TrackEncoding::Fm, true, FILL_BYTE))
        .collect();

    for cylinder in 0..CYLINDERS {
        for head in 0..2u8 {
            image.seek(cylinder, head)?;
            let track_sectors: Vec<SectorSpec> = sectors
                .iter()
                .map(|s| SectorSpec::new(SectorId::new(cylinder, head, s.id.sector, s.id.size_code), s.mode, s.write_data, s.data_value))
                .collect();
            image.format_track(TrackEncoding::Fm, &track_sectors)?;
        }
    }

    image.close()?;
    log::info!("wrote {}", path.display());
    Ok(())
}
