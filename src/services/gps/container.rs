//! Container sniffing and segment walking. Only enough of each format is
//! understood to find embedded EXIF and XMP payloads.

use crate::constants::{EXIF_HEADER, JPEG_SOI};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Tiff,
    Png,
    WebP,
    Heif,
    Unknown,
}

impl ImageKind {
    /// Identify the container from its magic bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        if is_jpeg(bytes) {
            ImageKind::Jpeg
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            ImageKind::Tiff
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            ImageKind::Png
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            ImageKind::WebP
        } else if bytes.len() >= 12
            && &bytes[4..8] == b"ftyp"
            && matches!(&bytes[8..12], b"heic" | b"heix" | b"mif1" | b"msf1" | b"avif")
        {
            ImageKind::Heif
        } else {
            ImageKind::Unknown
        }
    }

    /// The kind a declared MIME type claims.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => ImageKind::Jpeg,
            "image/tiff" => ImageKind::Tiff,
            "image/png" => ImageKind::Png,
            "image/webp" => ImageKind::WebP,
            "image/heic" | "image/heif" | "image/avif" => ImageKind::Heif,
            _ => ImageKind::Unknown,
        }
    }
}

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SOI)
}

pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Iterate `(marker, payload)` over the JPEG header segments, stopping at
/// start-of-scan, end-of-image, or the first malformed segment.
pub struct JpegSegments<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> JpegSegments<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let pos = if is_jpeg(bytes) { 2 } else { bytes.len() };
        JpegSegments { bytes, pos }
    }
}

impl<'a> Iterator for JpegSegments<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bytes = self.bytes;
            if self.pos + 2 > bytes.len() || bytes[self.pos] != 0xFF {
                self.pos = bytes.len();
                return None;
            }
            let marker = bytes[self.pos + 1];
            match marker {
                // Fill byte before a marker
                0xFF => {
                    self.pos += 1;
                    continue;
                }
                // Standalone markers carry no length
                0x01 | 0xD0..=0xD7 => {
                    self.pos += 2;
                    continue;
                }
                // Start of scan / end of image: no more metadata
                0xDA | 0xD9 => {
                    self.pos = bytes.len();
                    return None;
                }
                _ => {}
            }

            if self.pos + 4 > bytes.len() {
                self.pos = bytes.len();
                return None;
            }
            let length = u16::from_be_bytes([bytes[self.pos + 2], bytes[self.pos + 3]]) as usize;
            let start = self.pos + 4;
            let end = self.pos + 2 + length;
            if length < 2 || end > bytes.len() {
                self.pos = bytes.len();
                return None;
            }
            self.pos = end;
            return Some((marker, &bytes[start..end]));
        }
    }
}

/// TIFF payload of the first APP1 EXIF segment of a JPEG.
pub fn jpeg_exif_tiff(bytes: &[u8]) -> Option<&[u8]> {
    JpegSegments::new(bytes)
        .filter(|&(marker, _)| marker == 0xE1)
        .find_map(|(_, payload)| {
            (payload.len() > EXIF_HEADER.len() + 1 && payload.starts_with(EXIF_HEADER))
                .then(|| &payload[EXIF_HEADER.len() + 1..])
        })
}

/// TIFF payload to hand to a raw TIFF parser: the EXIF segment for JPEGs,
/// the whole buffer for bare TIFFs.
pub fn locate_tiff(bytes: &[u8]) -> Option<&[u8]> {
    match ImageKind::sniff(bytes) {
        ImageKind::Jpeg => jpeg_exif_tiff(bytes),
        ImageKind::Tiff => Some(bytes),
        _ => None,
    }
}

/// The serialized XMP packet (`<x:xmpmeta ...> ... </x:xmpmeta>`) wherever
/// it is embedded. XMP is stored uncompressed in every container we accept.
pub fn find_xmp_packet(bytes: &[u8]) -> Option<String> {
    let start = find_subslice(bytes, b"<x:xmpmeta")?;
    let close = b"</x:xmpmeta>";
    let end = find_subslice(&bytes[start..], close)? + start + close.len();
    Some(String::from_utf8_lossy(&bytes[start..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn sniff_magic_numbers() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageKind::Jpeg);
        assert_eq!(ImageKind::sniff(b"II*\0\x08\0\0\0"), ImageKind::Tiff);
        assert_eq!(ImageKind::sniff(b"MM\0*\0\0\0\x08"), ImageKind::Tiff);
        assert_eq!(ImageKind::sniff(b"\x89PNG\r\n\x1a\n...."), ImageKind::Png);
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), ImageKind::WebP);
        assert_eq!(ImageKind::sniff(b"\0\0\0\x18ftypheic\0\0"), ImageKind::Heif);
        assert_eq!(ImageKind::sniff(b"GIF89a"), ImageKind::Unknown);
        assert_eq!(ImageKind::sniff(&[]), ImageKind::Unknown);
    }

    #[test]
    fn mime_hint_parsing() {
        assert_eq!(ImageKind::from_mime("image/JPEG"), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_mime("image/heic; q=1"), ImageKind::Heif);
        assert_eq!(ImageKind::from_mime("application/octet-stream"), ImageKind::Unknown);
    }

    #[test]
    fn walks_segments_until_scan() {
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend(segment(0xE0, b"JFIF\0\x01\x02"));
        jpeg.extend([0xFF, 0xFF]); // fill byte
        jpeg.extend(segment(0xE1, b"Exif\0\0MM\0*\0\0\0\x08"));
        jpeg.extend(segment(0xDA, b"\0\0"));
        jpeg.extend(segment(0xE2, b"after scan"));

        let markers: Vec<u8> = JpegSegments::new(&jpeg).map(|(m, _)| m).collect();
        assert_eq!(markers, vec![0xE0, 0xE1]);
        assert_eq!(jpeg_exif_tiff(&jpeg), Some(&b"MM\0*\0\0\0\x08"[..]));
    }

    #[test]
    fn skips_xmp_app1_and_finds_exif() {
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend(segment(0xE1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>"));
        jpeg.extend(segment(0xE1, b"Exif\0\0II*\0\x08\0\0\0"));
        assert_eq!(jpeg_exif_tiff(&jpeg), Some(&b"II*\0\x08\0\0\0"[..]));
    }

    #[test]
    fn truncated_segment_stops_walk() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x40, 0x00];
        jpeg.extend_from_slice(b"Exif\0\0");
        assert_eq!(JpegSegments::new(&jpeg).count(), 0);
        assert_eq!(jpeg_exif_tiff(&jpeg), None);
    }

    #[test]
    fn non_jpeg_has_no_segments() {
        assert_eq!(JpegSegments::new(b"not an image").count(), 0);
        assert_eq!(locate_tiff(b"not an image"), None);
    }

    #[test]
    fn xmp_packet_extraction() {
        let data = b"junk<x:xmpmeta xmlns:x='adobe:ns:meta/'><rdf:RDF/></x:xmpmeta>trailer";
        let packet = find_xmp_packet(data).unwrap();
        assert!(packet.starts_with("<x:xmpmeta"));
        assert!(packet.ends_with("</x:xmpmeta>"));
        assert_eq!(find_xmp_packet(b"<x:xmpmeta unterminated"), None);
    }
}
