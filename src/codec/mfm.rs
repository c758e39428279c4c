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

    src/codec/mfm.rs

    IBM System/34 (MFM / double-density) track layout. The three leading
    0xA1 sync bytes (clock bit missing between bits 4 and 5 on the medium)
    are part of the CRC domain for both the ID and data fields.
*/
use super::{gaps, SectorSpec, DAM_MARK, DDAM_MARK, IDAM_MARK};
use crate::crc::Crc16;
use crate::error::DmkResult;
use crate::mode::TrackEncoding;
use crate::track_buffer::{Cursor, TrackState};

const SYNC: [u8; 3] = [0xA1, 0xA1, 0xA1];

pub fn format_track(track: &mut TrackState, dd_image: bool, sectors: &[SectorSpec]) -> DmkResult<()> {
    track.idam_pointer = [0; crate::header::MAX_SECTORS_PER_TRACK];
    track.mfm_sector = [false; crate::header::MAX_SECTORS_PER_TRACK];

    let mode = TrackEncoding::Mfm;
    let mut cur = Cursor::new(&mut track.buf, dd_image, mode);
    let mut crc = Crc16::new();

    cur.write_fill(gaps::MFM_PRE_INDEX_GAP, 0x4e, &mut crc)?;
    cur.write_fill(gaps::MFM_PRE_INDEX_SYNC, 0x00, &mut crc)?;
    cur.write_fill(3, 0xc2, &mut crc)?; // index sync, missing clock between bits 3-4
    cur.write_byte(0xfc, &mut crc)?; // index mark
    cur.write_fill(gaps::MFM_POST_INDEX_GAP, 0x4e, &mut crc)?;

    for (i, sector) in sectors.iter().enumerate() {
        cur.write_fill(gaps::MFM_ID_SYNC, 0x00, &mut crc)?;

        crc.reset();
        cur.write_bytes(&SYNC, &mut crc)?;

        track.idam_pointer[i] = cur.position() as u16;
        track.mfm_sector[i] = TrackEncoding::Mfm.is_mfm_flagged();

        cur.write_byte(IDAM_MARK, &mut crc)?;
        cur.write_byte(sector.id.cylinder, &mut crc)?;
        cur.write_byte(sector.id.head, &mut crc)?;
        cur.write_byte(sector.id.sector, &mut crc)?;
        cur.write_byte(sector.id.size_code, &mut crc)?;
        let crc_bytes = crc.bytes();
        cur.write_bytes(&crc_bytes, &mut Crc16::new())?;

        if sector.write_data {
            cur.write_fill(gaps::MFM_POST_ID_GAP, 0x4e, &mut crc)?;
            cur.write_fill(gaps::MFM_DATA_SYNC, 0x00, &mut crc)?;

            crc.reset();
            cur.write_bytes(&SYNC, &mut crc)?;
            cur.write_byte(DAM_MARK, &mut crc)?;
            cur.write_fill(sector.id.size(), sector.data_value, &mut crc)?;
            let crc_bytes = crc.bytes();
            cur.write_bytes(&crc_bytes, &mut Crc16::new())?;
            cur.write_fill(gaps::MFM_POST_DATA_GAP, 0x4e, &mut crc)?;
        } else {
            cur.write_fill(gaps::MFM_NO_DATA_GAP + sector.id.size(), 0x4e, &mut crc)?;
        }
    }

    let remaining = cur.remaining_logical();
    let mut tail_crc = Crc16::new();
    cur.write_fill(remaining, 0x4e, &mut tail_crc)?;

    track.dirty = true;
    track.resident = true;
    Ok(())
}

/// Consume and classify a data field's address mark: `Ok(true)` for a
/// deleted-data mark (0xF8), `Ok(false)` for a normal data mark (0xFB),
/// `Err` for anything else.
fn read_marker(cur: &mut Cursor, crc: &mut Crc16) -> DmkResult<bool> {
    match cur.read_byte(crc)? {
        DAM_MARK => Ok(false),
        DDAM_MARK => Ok(true),
        _ => Err(crate::error::DmkError::IdNotFound),
    }
}

/// Returns whether the field was marked deleted (DDAM, 0xF8) rather than
/// normal (DAM, 0xFB).
pub fn read_data_field(track: &mut TrackState, dd_image: bool, after_id: usize, size: usize, out: &mut Vec<u8>) -> DmkResult<bool> {
    let mut cur = Cursor::at(&mut track.buf, after_id, dd_image, TrackEncoding::Mfm);

    let mut gap_crc = Crc16::new();
    let mut gap = vec![0u8; gaps::MFM_POST_ID_GAP + gaps::MFM_DATA_SYNC];
    cur.read_bytes(&mut gap, &mut gap_crc)?;

    let mut crc = Crc16::new();
    let mut sync = [0u8; 3];
    cur.read_bytes(&mut sync, &mut crc)?;

    let deleted = read_marker(&mut cur, &mut crc)?;
    out.resize(size, 0);
    cur.read_bytes(out, &mut crc)?;
    let mut crc_bytes = [0u8; 2];
    cur.read_bytes(&mut crc_bytes, &mut crc)?;
    if crc.state() != 0 {
        return Err(crate::error::DmkError::CrcMismatch);
    }
    Ok(deleted)
}

/// As [`read_data_field`], but returns the data field's residual CRC state
/// instead of erroring on mismatch.
pub fn read_data_field_with_crc(
    track: &mut TrackState,
    dd_image: bool,
    after_id: usize,
    size: usize,
    out: &mut Vec<u8>,
) -> DmkResult<(bool, u16)> {
    let mut cur = Cursor::at(&mut track.buf, after_id, dd_image, TrackEncoding::Mfm);

    let mut gap_crc = Crc16::new();
    let mut gap = vec![0u8; gaps::MFM_POST_ID_GAP + gaps::MFM_DATA_SYNC];
    cur.read_bytes(&mut gap, &mut gap_crc)?;

    let mut crc = Crc16::new();
    let mut sync = [0u8; 3];
    cur.read_bytes(&mut sync, &mut crc)?;

    let deleted = read_marker(&mut cur, &mut crc)?;
    out.resize(size, 0);
    cur.read_bytes(out, &mut crc)?;
    let mut crc_bytes = [0u8; 2];
    cur.read_bytes(&mut crc_bytes, &mut crc)?;
    Ok((deleted, crc.state()))
}

pub fn write_data_field(track: &mut TrackState, dd_image: bool, after_id: usize, data: &[u8]) -> DmkResult<()> {
    let mut cur = Cursor::at(&mut track.buf, after_id, dd_image, TrackEncoding::Mfm);
    let mut gap_crc = Crc16::new();
    cur.write_fill(gaps::MFM_POST_ID_GAP, 0x4e, &mut gap_crc)?;
    cur.write_fill(gaps::MFM_DATA_SYNC, 0x00, &mut gap_crc)?;

    let mut crc = Crc16::new();
    cur.write_bytes(&SYNC, &mut crc)?;
    cur.write_byte(DAM_MARK, &mut crc)?;
    cur.write_bytes(data, &mut crc)?;
    let crc_bytes = crc.bytes();
    cur.write_bytes(&crc_bytes, &mut Crc16::new())?;
    track.dirty = true;
    Ok(())
}
