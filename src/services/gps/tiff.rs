//! Minimal TIFF directory reader for the GPS IFD.

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_SRATIONAL: u16 = 10;

/// One 12-byte directory entry: tag, type, count, value-or-offset.
#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    /// Absolute position of the 4-byte value field inside the TIFF data
    value_pos: usize,
}

/// GPS position tags as stored, before interpretation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpsTags {
    pub latitude: Option<Vec<(f64, f64)>>,
    pub latitude_ref: Option<String>,
    pub longitude: Option<Vec<(f64, f64)>>,
    pub longitude_ref: Option<String>,
}

struct TiffReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let order = match data.get(..2)? {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return None,
        };
        let reader = TiffReader { data, order };
        (reader.u16_at(2)? == TIFF_MAGIC).then_some(reader)
    }

    fn u16_at(&self, pos: usize) -> Option<u16> {
        let b: [u8; 2] = self.data.get(pos..pos.checked_add(2)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        })
    }

    fn u32_at(&self, pos: usize) -> Option<u32> {
        let b: [u8; 4] = self.data.get(pos..pos.checked_add(4)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        })
    }

    fn entries(&self, ifd_offset: usize) -> Option<Vec<IfdEntry>> {
        let count = self.u16_at(ifd_offset)? as usize;
        if count > MAX_IFD_ENTRIES {
            return None;
        }
        (0..count)
            .map(|i| {
                let pos = ifd_offset.checked_add(2 + i * 12)?;
                Some(IfdEntry {
                    tag: self.u16_at(pos)?,
                    field_type: self.u16_at(pos.checked_add(2)?)?,
                    count: self.u32_at(pos.checked_add(4)?)?,
                    value_pos: pos.checked_add(8)?,
                })
            })
            .collect()
    }

    /// Where the entry's payload of `size` bytes starts: inline when it fits
    /// in four bytes, otherwise at an offset from the TIFF header. The whole
    /// payload is checked to lie inside the data.
    fn payload_pos(&self, entry: &IfdEntry, size: usize) -> Option<usize> {
        let start = if size <= 4 {
            entry.value_pos
        } else {
            self.u32_at(entry.value_pos)? as usize
        };
        self.data.get(start..start.checked_add(size)?)?;
        Some(start)
    }

    fn ascii(&self, entry: &IfdEntry) -> Option<String> {
        if entry.field_type != TYPE_ASCII {
            return None;
        }
        let size = entry.count as usize;
        let start = self.payload_pos(entry, size)?;
        let raw = &self.data[start..start + size];
        let text = raw.split(|&b| b == 0).next().unwrap_or(raw);
        Some(String::from_utf8_lossy(text).trim().to_string())
    }

    fn rationals(&self, entry: &IfdEntry) -> Option<Vec<(f64, f64)>> {
        if entry.field_type != TYPE_RATIONAL && entry.field_type != TYPE_SRATIONAL {
            return None;
        }
        let count = entry.count as usize;
        if count == 0 || count > 3 {
            return None;
        }
        let start = self.payload_pos(entry, count * 8)?;
        (0..count)
            .map(|i| {
                let num = self.u32_at(start + i * 8)?;
                let den = self.u32_at(start + i * 8 + 4)?;
                Some(if entry.field_type == TYPE_SRATIONAL {
                    (num as i32 as f64, den as i32 as f64)
                } else {
                    (num as f64, den as f64)
                })
            })
            .collect()
    }

    fn gps_ifd_offset(&self) -> Option<usize> {
        let ifd0 = self.u32_at(4)? as usize;
        let pointer = self
            .entries(ifd0)?
            .into_iter()
            .find(|e| e.tag == TAG_GPS_IFD_POINTER)?;
        if pointer.field_type != TYPE_LONG && pointer.field_type != 13 {
            // 13 = IFD, used by some writers instead of LONG
            return None;
        }
        Some(self.u32_at(pointer.value_pos)? as usize)
    }
}

/// Read the GPS position tags from raw TIFF data (the payload following
/// `Exif\0\0` in a JPEG APP1 segment).
pub fn read_gps_tags(tiff: &[u8]) -> Option<GpsTags> {
    let reader = TiffReader::new(tiff)?;
    let gps_ifd = reader.gps_ifd_offset()?;

    let mut tags = GpsTags::default();
    for entry in reader.entries(gps_ifd)? {
        match entry.tag {
            TAG_GPS_LATITUDE_REF => tags.latitude_ref = reader.ascii(&entry),
            TAG_GPS_LATITUDE => tags.latitude = reader.rationals(&entry),
            TAG_GPS_LONGITUDE_REF => tags.longitude_ref = reader.ascii(&entry),
            TAG_GPS_LONGITUDE => tags.longitude = reader.rationals(&entry),
            _ => {}
        }
    }
    Some(tags)
}
