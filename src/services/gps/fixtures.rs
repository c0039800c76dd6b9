//! Synthetic EXIF payloads for tests.

pub struct GpsFixture {
    pub latitude: [(u32, u32); 3],
    pub latitude_ref: &'static str,
    pub longitude: [(u32, u32); 3],
    pub longitude_ref: &'static str,
}

impl GpsFixture {
    /// 51°30'0" N, 0°7'0" W
    pub fn london() -> Self {
        GpsFixture {
            latitude: [(51, 1), (30, 1), (0, 1)],
            latitude_ref: "N",
            longitude: [(0, 1), (7, 1), (0, 1)],
            longitude_ref: "W",
        }
    }
}

/// TIFF data holding IFD0 with a single GPS pointer and a GPS IFD with the
/// four position tags. Rational data follows the GPS IFD, latitude first.
pub fn gps_tiff(fixture: &GpsFixture, little_endian: bool) -> Vec<u8> {
    let u16b = |v: u16| {
        if little_endian {
            v.to_le_bytes()
        } else {
            v.to_be_bytes()
        }
    };
    let u32b = |v: u32| {
        if little_endian {
            v.to_le_bytes()
        } else {
            v.to_be_bytes()
        }
    };

    const IFD0: u32 = 8;
    const GPS_IFD: u32 = IFD0 + 2 + 12 + 4;
    const LAT_DATA: u32 = GPS_IFD + 2 + 4 * 12 + 4;
    const LNG_DATA: u32 = LAT_DATA + 24;

    let mut out = Vec::new();
    out.extend_from_slice(if little_endian { b"II" } else { b"MM" });
    out.extend(u16b(42));
    out.extend(u32b(IFD0));

    // IFD0
    out.extend(u16b(1));
    out.extend(u16b(0x8825));
    out.extend(u16b(4));
    out.extend(u32b(1));
    out.extend(u32b(GPS_IFD));
    out.extend(u32b(0));

    // GPS IFD
    let ascii_entry = |tag: u16, value: &str| {
        let mut entry = Vec::new();
        entry.extend(u16b(tag));
        entry.extend(u16b(2));
        entry.extend(u32b(2));
        let mut inline = [0u8; 4];
        inline[0] = value.as_bytes()[0];
        entry.extend(inline);
        entry
    };
    let rational_entry = |tag: u16, offset: u32| {
        let mut entry = Vec::new();
        entry.extend(u16b(tag));
        entry.extend(u16b(5));
        entry.extend(u32b(3));
        entry.extend(u32b(offset));
        entry
    };
    out.extend(u16b(4));
    out.extend(ascii_entry(0x0001, fixture.latitude_ref));
    out.extend(rational_entry(0x0002, LAT_DATA));
    out.extend(ascii_entry(0x0003, fixture.longitude_ref));
    out.extend(rational_entry(0x0004, LNG_DATA));
    out.extend(u32b(0));

    for (num, den) in fixture.latitude.iter().chain(fixture.longitude.iter()) {
        out.extend(u32b(*num));
        out.extend(u32b(*den));
    }
    debug_assert_eq!(out.len() as u32, LNG_DATA + 24);
    out
}

/// Minimal JPEG: SOI, one APP1 EXIF segment, EOI. No image data.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}
