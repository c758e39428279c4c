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

    Flattens a DMK image to a raw sector dump: logical sector order per
    track, regardless of the physical interleave the image was formatted
    with. Interleave is recovered with `read_id`, the same mechanism a
    real controller uses to locate sectors without assuming they are
    laid out in ascending order.
*/
use anyhow::{bail, Context, Result};
use bpaf::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use dmk_cli::standard_rpm_rate;
use dmkfox::{DiskImage, TrackEncoding};

fn args() -> impl Parser<(PathBuf, PathBuf)> {
    let image = bpaf::positional::<PathBuf>("IMAGE").help("Path of the DMK image to read");
    let out = bpaf::positional::<PathBuf>("OUT").help("Path of the raw sector dump to write");
    bpaf::construct!(image, out)
}

fn main() -> Result<()> {
    env_logger::init();
    let (in_path, out_path) = args().to_options().descr("dmk2raw: flatten a DMK image to raw sectors").run();

    let (rpm, rate) = standard_rpm_rate();
    let mut image = DiskImage::open(&in_path, false, rpm, rate).with_context(|| format!("opening {}", in_path.display()))?;
    let mut out = File::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?;

    let cylinders = image.cylinders();
    let sides = if image.double_sided() { 2 } else { 1 };

    for cylinder in 0..cylinders {
        for head in 0..sides {
            image.seek(cylinder, head)?;

            let first = image.read_id()?;
            let mut ids = vec![first];
            loop {
                let id = image.read_id()?;
                if id == first {
                    break;
                }
                ids.push(id);
            }
            ids.sort_by_key(|id| id.sector);

            for id in &ids {
                let data = image
                    .read_sector(id, TrackEncoding::Fm)
                    .with_context(|| format!("reading sector {id} at cylinder {cylinder} head {head}"))?;
                out.write_all(&data)?;
            }
        }
    }

    if cylinders == 0 {
        bail!("image has no tracks");
    }
    log::info!("wrote {}", out_path.display());
    Ok(())
}
