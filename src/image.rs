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

    src/image.rs

    The image manager: opens/creates/closes DMK files, maps (cylinder,
    head) to an on-disk track slot, and exposes the sector-addressed
    operations that compose the CRC engine, track buffer, and track codec.
*/
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::{BinRead, BinWrite};

use crate::chs::SectorId;
use crate::codec;
use crate::codec::{SectorCrcs, SectorSpec};
use crate::error::{DmkError, DmkResult};
use crate::geometry::{DataRate, Geometry, Rpm};
use crate::header::{decode_idam_entry, encode_idam_entry, DmkHeader, HEADER_LENGTH, MAX_SECTORS_PER_TRACK};
use crate::mode::TrackEncoding;
use crate::track_buffer::TrackState;

/// An open DMK disk image: the handle of `spec.md` §3.
pub struct DiskImage {
    file: File,
    writable: bool,
    newly_created: bool,
    geometry: Geometry,
    tracks: Vec<TrackState>,
    cur_cylinder: i16,
    cur_head: i16,
    cur_mode: TrackEncoding,
    /// Per-track cursor into the IDAM table for sequential `read_id` calls.
    cur_id_slot: usize,
}

impl DiskImage {
    /// `create_image(path, ds, cylinders, dd, rpm, rate) -> handle`.
    pub fn create<P: AsRef<Path>>(
        path: P,
        double_sided: bool,
        cylinders: u8,
        double_density: bool,
        rpm: Rpm,
        rate: DataRate,
    ) -> DmkResult<Self> {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let geometry = Geometry::new(double_sided, cylinders, double_density, rpm, rate);
        let slots = geometry.sides() as usize * cylinders as usize;

        log::debug!(
            "create_image: {} cyl, {} side(s), dd={}, track_length={}",
            cylinders,
            geometry.sides(),
            double_density,
            geometry.track_length
        );

        Ok(Self {
            file,
            writable: true,
            newly_created: true,
            geometry,
            tracks: vec![TrackState::empty(); slots],
            cur_cylinder: -1,
            cur_head: -1,
            cur_mode: TrackEncoding::Fm,
            cur_id_slot: 0,
        })
    }

    /// `open_image(path, writable) -> (handle, ds, cylinders, dd)`.
    pub fn open<P: AsRef<Path>>(path: P, writable: bool, rpm: Rpm, rate: DataRate) -> DmkResult<Self> {
        let mut file = OpenOptions::new().read(true).write(writable).open(path)?;
        file.seek(SeekFrom::Start(0))?;
        let header = DmkHeader::read_le(&mut file)?;
        let geometry = header.geometry(rpm, rate);
        let slots = geometry.sides() as usize * geometry.cylinders as usize;

        log::debug!(
            "open_image: {} cyl, {} side(s), dd={}, track_length={}",
            geometry.cylinders,
            geometry.sides(),
            geometry.double_density,
            geometry.track_length
        );

        Ok(Self {
            file,
            writable,
            newly_created: false,
            geometry,
            tracks: vec![TrackState::empty(); slots],
            cur_cylinder: -1,
            cur_head: -1,
            cur_mode: TrackEncoding::Fm,
            cur_id_slot: 0,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn double_sided(&self) -> bool {
        self.geometry.double_sided
    }

    pub fn cylinders(&self) -> u8 {
        self.geometry.cylinders
    }

    pub fn double_density(&self) -> bool {
        self.geometry.double_density
    }

    fn track_slot_offset(&self, cylinder: u8, head: u8) -> u64 {
        let slot = self.geometry.track_slot_index(cylinder, head);
        HEADER_LENGTH as u64 + slot as u64 * (2 * MAX_SECTORS_PER_TRACK as u64 + self.geometry.track_length as u64)
    }

    /// `seek(cylinder, head)`. Rejects out-of-range coordinates and is a
    /// no-op if already positioned there; materializes the TrackState on
    /// first visit.
    pub fn seek(&mut self, cylinder: u8, head: u8) -> DmkResult<()> {
        // Corrected per `spec.md` §9: the reference implementation rejected
        // only `cylinder > cylinders`, one off from the valid range.
        if cylinder >= self.geometry.cylinders {
            return Err(DmkError::Geometry(format!(
                "cylinder {cylinder} out of range (0..{})",
                self.geometry.cylinders
            )));
        }
        if head > 0 && !self.geometry.double_sided {
            return Err(DmkError::Geometry("head 1 requested on a single-sided image".into()));
        }

        if self.cur_cylinder == cylinder as i16 && self.cur_head == head as i16 {
            return Ok(()); // already there
        }

        let slot = self.geometry.track_slot_index(cylinder, head);
        if !self.tracks[slot].resident {
            if self.newly_created {
                self.tracks[slot] = TrackState::new_virgin(self.geometry.track_length);
            } else {
                let offset = self.track_slot_offset(cylinder, head);
                self.file.seek(SeekFrom::Start(offset))?;

                let mut idam_raw = [0u8; 2 * MAX_SECTORS_PER_TRACK];
                self.file.read_exact(&mut idam_raw)?;

                let mut track = TrackState::empty();
                for i in 0..MAX_SECTORS_PER_TRACK {
                    let raw = u16::from_le_bytes([idam_raw[2 * i], idam_raw[2 * i + 1]]);
                    let (ptr, is_mfm) = decode_idam_entry(raw);
                    track.idam_pointer[i] = ptr;
                    track.mfm_sector[i] = is_mfm;
                }

                let mut buf = vec![0u8; self.geometry.track_length as usize];
                self.file.read_exact(&mut buf)?;
                track.buf = buf;
                track.resident = true;
                self.tracks[slot] = track;
            }
        }

        self.cur_cylinder = cylinder as i16;
        self.cur_head = head as i16;
        self.cur_id_slot = 0;
        Ok(())
    }

    fn current_slot(&self) -> DmkResult<usize> {
        if self.cur_cylinder < 0 || self.cur_head < 0 {
            return Err(DmkError::NoCurrentTrack);
        }
        Ok(self
            .geometry
            .track_slot_index(self.cur_cylinder as u8, self.cur_head as u8))
    }

    /// `format_track(mode, sector_count, sector_info[])`.
    pub fn format_track(&mut self, mode: TrackEncoding, sectors: &[SectorSpec]) -> DmkResult<()> {
        let slot = self.current_slot()?;
        if mode.requires_double_density() && !self.geometry.double_density {
            return Err(DmkError::Geometry(
                "double-density track encoding requested on a single-density image".into(),
            ));
        }
        self.cur_mode = mode;
        let track = &mut self.tracks[slot];

        match mode {
            TrackEncoding::Fm | TrackEncoding::Rx02 => {
                codec::fm::format_track(track, self.geometry.double_density, sectors)?
            }
            TrackEncoding::Mfm => codec::mfm::format_track(track, self.geometry.double_density, sectors)?,
            TrackEncoding::M2fm => return Err(DmkError::UnsupportedEncoding),
        }
        self.cur_id_slot = 0;
        Ok(())
    }

    /// `read_id(handle, &out_sector_info)`. Sequentially advances through
    /// the current track's IDAM table, emulating a floppy controller's
    /// "read ID" command; wraps to slot 0 once every populated slot has
    /// been visited.
    pub fn read_id(&mut self) -> DmkResult<SectorId> {
        let slot = self.current_slot()?;
        let track = &mut self.tracks[slot];

        for _ in 0..MAX_SECTORS_PER_TRACK {
            let try_slot = self.cur_id_slot;
            self.cur_id_slot = (self.cur_id_slot + 1) % MAX_SECTORS_PER_TRACK;
            // The track's encoding isn't tracked handle-wide: a freshly
            // `open()`-ed image has never run `format_track`, so `cur_mode`
            // would still be the `Fm` default even on an MFM track. Each
            // slot's own `mfm_sector` flag is authoritative instead.
            let mode = if track.mfm_sector[try_slot] {
                TrackEncoding::Mfm
            } else {
                TrackEncoding::Fm
            };
            if let Ok(id) = codec::read_id_at_slot(track, self.geometry.double_density, mode, try_slot) {
                return Ok(id);
            }
        }
        Err(DmkError::IdNotFound)
    }

    /// `read_sector(handle, sector_info, &out_payload)`.
    pub fn read_sector(&mut self, id: &SectorId, mode: TrackEncoding) -> DmkResult<Vec<u8>> {
        let slot = self.current_slot()?;
        let dd = self.geometry.double_density;
        let track = &mut self.tracks[slot];

        let after_id = codec::find_address_mark(track, dd, id, mode)?;
        let mut out = Vec::new();
        let deleted = match mode {
            TrackEncoding::Fm | TrackEncoding::Rx02 => {
                codec::fm::read_data_field(track, dd, after_id, id.size(), &mut out)?
            }
            TrackEncoding::Mfm => codec::mfm::read_data_field(track, dd, after_id, id.size(), &mut out)?,
            TrackEncoding::M2fm => return Err(DmkError::UnsupportedEncoding),
        };
        if deleted {
            log::debug!("read_sector: {id} carries a deleted-data address mark");
        }
        Ok(out)
    }

    /// As [`DiskImage::read_sector`], but surfaces the residual ID and data
    /// CRC state instead of failing the call on a CRC mismatch, per
    /// `spec.md`'s "Bad CRC" edge case note that CRC values "may be exposed
    /// via the `_with_crcs` variant".
    pub fn read_sector_with_crcs(&mut self, id: &SectorId, mode: TrackEncoding) -> DmkResult<(Vec<u8>, SectorCrcs)> {
        let slot = self.current_slot()?;
        let dd = self.geometry.double_density;
        let track = &mut self.tracks[slot];

        let (after_id, id_crc) = codec::find_address_mark_with_crc(track, dd, id, mode)?;
        let mut out = Vec::new();
        let (_deleted, data_crc) = match mode {
            TrackEncoding::Fm | TrackEncoding::Rx02 => {
                codec::fm::read_data_field_with_crc(track, dd, after_id, id.size(), &mut out)?
            }
            TrackEncoding::Mfm => codec::mfm::read_data_field_with_crc(track, dd, after_id, id.size(), &mut out)?,
            TrackEncoding::M2fm => return Err(DmkError::UnsupportedEncoding),
        };
        Ok((out, SectorCrcs { id_crc, data_crc }))
    }

    /// `write_sector(handle, sector_info, payload)`. Per `spec.md` §5, this
    /// does not verify that the ID field's cylinder matches the physical
    /// cylinder; that is the physical-floppy driver's concern.
    pub fn write_sector(&mut self, id: &SectorId, mode: TrackEncoding, data: &[u8]) -> DmkResult<()> {
        if !self.writable {
            return Err(DmkError::WriteProtected);
        }
        let slot = self.current_slot()?;
        let dd = self.geometry.double_density;
        let track = &mut self.tracks[slot];

        // Corrected per `spec.md` §9: a stray semicolon after this guard in
        // one reference revision made the early return unreachable.
        let after_id = codec::find_address_mark(track, dd, id, mode)?;
        match mode {
            TrackEncoding::Fm | TrackEncoding::Rx02 => codec::fm::write_data_field(track, dd, after_id, data)?,
            TrackEncoding::Mfm => codec::mfm::write_data_field(track, dd, after_id, data)?,
            TrackEncoding::M2fm => return Err(DmkError::UnsupportedEncoding),
        }
        Ok(())
    }

    /// `close(handle)`. Flushes dirty resident tracks and, for a newly
    /// created image, the header, then releases the backing file.
    pub fn close(mut self) -> DmkResult<()> {
        self.flush()
    }

    fn flush(&mut self) -> DmkResult<()> {
        if !self.writable {
            return Ok(());
        }

        if self.newly_created {
            let header = DmkHeader::from_geometry(&self.geometry, self.geometry.cylinders, false);
            self.file.seek(SeekFrom::Start(0))?;
            header.write_le(&mut self.file)?;
        }

        for cylinder in 0..self.geometry.cylinders {
            for head in 0..self.geometry.sides() {
                let slot = self.geometry.track_slot_index(cylinder, head);
                if !(self.tracks[slot].resident && self.tracks[slot].dirty) {
                    continue;
                }
                let offset = self.track_slot_offset(cylinder, head);
                self.file.seek(SeekFrom::Start(offset))?;

                let mut idam_raw = [0u8; 2 * MAX_SECTORS_PER_TRACK];
                for i in 0..MAX_SECTORS_PER_TRACK {
                    let raw = encode_idam_entry(self.tracks[slot].idam_pointer[i], self.tracks[slot].mfm_sector[i]);
                    let bytes = raw.to_le_bytes();
                    idam_raw[2 * i] = bytes[0];
                    idam_raw[2 * i + 1] = bytes[1];
                }
                self.file.write_all(&idam_raw)?;
                self.file.write_all(&self.tracks[slot].buf)?;
                self.tracks[slot].dirty = false;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SectorSpec;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn create_seek_format_and_read_back_one_sector() {
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.dmk");

        let mut image = DiskImage::create(&path, false, 2, false, Rpm::Rpm360, DataRate::K250).unwrap();
        image.seek(0, 0).unwrap();

        let sectors: Vec<SectorSpec> = (1..=26)
            .map(|s| SectorSpec::new(SectorId::new(0, 0, s, 0), TrackEncoding::Fm, true, 0xE5))
            .collect();
        image.format_track(TrackEncoding::Fm, &sectors).unwrap();

        let data = image.read_sector(&SectorId::new(0, 0, 13, 0), TrackEncoding::Fm).unwrap();
        assert_eq!(data.len(), 128);
        assert!(data.iter().all(|&b| b == 0xE5));

        image.close().unwrap();
    }

    #[test]
    fn geometry_reject_rejects_mfm_on_single_density_image() {
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.dmk");
        let mut image = DiskImage::create(&path, false, 2, false, Rpm::Rpm360, DataRate::K250).unwrap();
        image.seek(0, 0).unwrap();
        let sectors = vec![SectorSpec::new(SectorId::new(0, 0, 1, 0), TrackEncoding::Mfm, true, 0xE5)];
        let err = image.format_track(TrackEncoding::Mfm, &sectors).unwrap_err();
        assert!(matches!(err, DmkError::Geometry(_)));
    }

    #[test]
    fn seek_rejects_cylinder_equal_to_count() {
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.dmk");
        let mut image = DiskImage::create(&path, false, 2, false, Rpm::Rpm360, DataRate::K250).unwrap();
        assert!(image.seek(2, 0).is_err());
        assert!(image.seek(1, 0).is_ok());
    }

    #[test]
    fn seek_is_idempotent() {
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.dmk");
        let mut image = DiskImage::create(&path, false, 2, false, Rpm::Rpm360, DataRate::K250).unwrap();
        image.seek(0, 0).unwrap();
        image.seek(0, 0).unwrap();
        assert_eq!(image.cur_cylinder, 0);
    }

    #[test]
    fn format_track_fills_the_whole_track_on_a_dd_fm_rx02_image() {
        // Regression: the tail-gap fill used to count physical bytes but
        // hand them to write_fill (which counts logical bytes), so on a
        // double-density FM/RX02 track the doubled byte-stepping ran the
        // cursor off the end of the buffer before the tail was filled.
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx02.dmk");
        let mut image = DiskImage::create(&path, false, 1, true, Rpm::Rpm360, DataRate::K500).unwrap();
        image.seek(0, 0).unwrap();

        let sectors: Vec<SectorSpec> = (1..=26)
            .map(|s| SectorSpec::new(SectorId::new(0, 0, s, 0), TrackEncoding::Rx02, true, 0xE5))
            .collect();
        image.format_track(TrackEncoding::Rx02, &sectors).unwrap();

        let data = image.read_sector(&SectorId::new(0, 0, 1, 0), TrackEncoding::Rx02).unwrap();
        assert_eq!(data.len(), 128);
        assert!(data.iter().all(|&b| b == 0xE5));
        image.close().unwrap();
    }

    #[test]
    fn read_id_recognizes_mfm_on_a_freshly_opened_image() {
        // Regression: read_id used handle-wide cur_mode, which defaults to
        // Fm and is only ever set by format_track within the same session.
        // A freshly open()-ed MFM image never fed the sync bytes into the
        // CRC and every slot failed to validate.
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mfm.dmk");

        {
            let mut image = DiskImage::create(&path, false, 1, true, Rpm::Rpm360, DataRate::K500).unwrap();
            image.seek(0, 0).unwrap();
            let sectors = vec![SectorSpec::new(SectorId::new(0, 0, 1, 0), TrackEncoding::Mfm, true, 0xE5)];
            image.format_track(TrackEncoding::Mfm, &sectors).unwrap();
            image.close().unwrap();
        }

        let mut image = DiskImage::open(&path, false, Rpm::Rpm360, DataRate::K500).unwrap();
        image.seek(0, 0).unwrap();
        let id = image.read_id().unwrap();
        assert_eq!(id, SectorId::new(0, 0, 1, 0));
    }
}
