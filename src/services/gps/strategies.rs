//! The individual extraction strategies. Each one is a plain function from
//! the input buffer to an optional coordinate and knows nothing about the
//! others.

use super::container::{find_xmp_packet, is_jpeg, jpeg_exif_tiff, locate_tiff};
use super::reconcile::{parse_iso6709, RawCoordinate};
use super::tiff::read_gps_tags;
use super::xmp::coordinates_from_xmp;
use super::{GpsFields, ImageInput};
use crate::constants::*;
use crate::models::GeoCoordinate;
use exif::{Context, In, Reader, Tag, Value};
use std::io::Cursor;

fn raw_from_exif_value(value: &Value) -> Option<RawCoordinate> {
    match value {
        Value::Rational(parts) => Some(RawCoordinate::Dms(
            parts
                .iter()
                .map(|r| RawCoordinate::rational(r.num, r.denom))
                .collect(),
        )),
        Value::SRational(parts) => Some(RawCoordinate::Dms(
            parts
                .iter()
                .map(|r| RawCoordinate::rational(r.num, r.denom))
                .collect(),
        )),
        Value::Double(parts) => Some(RawCoordinate::Dms(
            parts.iter().map(|v| RawCoordinate::Decimal(*v)).collect(),
        )),
        Value::Float(parts) => Some(RawCoordinate::Dms(
            parts
                .iter()
                .map(|v| RawCoordinate::Decimal(f64::from(*v)))
                .collect(),
        )),
        Value::Ascii(_) => ascii_from_exif_value(value).map(RawCoordinate::Text),
        _ => None,
    }
}

fn ascii_from_exif_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(lines) => lines
            .first()
            .map(|line| String::from_utf8_lossy(line).into_owned()),
        _ => None,
    }
}

/// Fill GPS fields from `(tag number, value)` pairs of the GPS context.
fn collect_exif_fields<'a>(fields: impl Iterator<Item = (u16, &'a Value)>) -> GpsFields {
    let mut gps = GpsFields::default();
    for (number, value) in fields {
        match number {
            TAG_GPS_LATITUDE_REF => gps.latitude_ref = ascii_from_exif_value(value),
            TAG_GPS_LATITUDE => gps.latitude = raw_from_exif_value(value),
            TAG_GPS_LONGITUDE_REF => gps.longitude_ref = ascii_from_exif_value(value),
            TAG_GPS_LONGITUDE => gps.longitude = raw_from_exif_value(value),
            _ => {}
        }
    }
    gps
}

fn scan_gps_context(exif: &exif::Exif) -> Option<GeoCoordinate> {
    collect_exif_fields(
        exif.fields()
            .filter(|f| f.tag.context() == Context::Gps)
            .map(|f| (f.tag.number(), &f.value)),
    )
    .resolve()
}

fn read_container(bytes: &[u8]) -> Option<exif::Exif> {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(exif),
        Err(e) => {
            tracing::trace!("EXIF container read failed: {}", e);
            None
        }
    }
}

/// General-purpose reader on the container, primary image GPS tags only.
pub fn container(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    let exif = read_container(input.bytes)?;
    let tags = [
        Tag::GPSLatitudeRef,
        Tag::GPSLatitude,
        Tag::GPSLongitudeRef,
        Tag::GPSLongitude,
    ];
    collect_exif_fields(
        tags.into_iter()
            .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
            .map(|f| (f.tag.number(), &f.value)),
    )
    .resolve()
}

/// Same reader, but any GPS-context field in any IFD counts. Catches files
/// whose GPS directory hangs off the thumbnail IFD.
pub fn gps_tag_scan(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    scan_gps_context(&read_container(input.bytes)?)
}

/// Locate the TIFF structure ourselves and feed it to the raw TIFF parser,
/// bypassing the reader's container detection.
pub fn structured_tiff(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    let tiff = locate_tiff(input.bytes)?;
    match Reader::new().read_raw(tiff.to_vec()) {
        Ok(exif) => scan_gps_context(&exif),
        Err(e) => {
            tracing::trace!("Raw TIFF parse failed: {}", e);
            None
        }
    }
}

/// Search the embedded XMP packet, if any.
pub fn xmp_search(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    coordinates_from_xmp(&find_xmp_packet(input.bytes)?)
}

fn raw_from_rexif_value(value: &::rexif::TagValue) -> Option<RawCoordinate> {
    use ::rexif::TagValue;
    match value {
        TagValue::URational(parts) => Some(RawCoordinate::Dms(
            parts
                .iter()
                .map(|r| RawCoordinate::rational(r.numerator, r.denominator))
                .collect(),
        )),
        TagValue::IRational(parts) => Some(RawCoordinate::Dms(
            parts
                .iter()
                .map(|r| RawCoordinate::rational(r.numerator, r.denominator))
                .collect(),
        )),
        TagValue::Ascii(text) => Some(RawCoordinate::Text(text.clone())),
        _ => None,
    }
}

/// Independent second library.
pub fn rexif(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    use ::rexif::{ExifTag, TagValue};

    let (result, warnings) = ::rexif::parse_buffer_quiet(input.bytes);
    for warning in &warnings {
        tracing::trace!("rexif: {}", warning);
    }
    let data = result.ok()?;

    let ascii = |value: &TagValue| match value {
        TagValue::Ascii(text) => Some(text.clone()),
        _ => None,
    };

    let mut gps = GpsFields::default();
    for entry in &data.entries {
        match entry.tag {
            ExifTag::GPSLatitudeRef => gps.latitude_ref = ascii(&entry.value),
            ExifTag::GPSLatitude => gps.latitude = raw_from_rexif_value(&entry.value),
            ExifTag::GPSLongitudeRef => gps.longitude_ref = ascii(&entry.value),
            ExifTag::GPSLongitude => gps.longitude = raw_from_rexif_value(&entry.value),
            _ => {}
        }
    }
    gps.resolve()
}

/// Third library, JPEG only. It reports the position as an ISO 6709 string.
pub fn nom_exif(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    use ::nom_exif::{ExifIter, MediaParser, MediaSource};

    if !is_jpeg(input.bytes) {
        return None;
    }
    let source = MediaSource::seekable(Cursor::new(input.bytes.to_vec())).ok()?;
    let mut parser = MediaParser::new();
    let iter: ExifIter = parser.parse(source).ok()?;
    let info = iter.parse_gps_info().ok()??;
    parse_iso6709(&info.format_iso6709())
}

/// Walk the JPEG segments and the TIFF directories by hand.
pub fn hand_rolled(input: &ImageInput<'_>) -> Option<GeoCoordinate> {
    if !is_jpeg(input.bytes) {
        return None;
    }
    let tags = read_gps_tags(jpeg_exif_tiff(input.bytes)?)?;
    GpsFields {
        latitude: tags.latitude.map(|v| RawCoordinate::from_rationals(&v)),
        latitude_ref: tags.latitude_ref,
        longitude: tags.longitude.map(|v| RawCoordinate::from_rationals(&v)),
        longitude_ref: tags.longitude_ref,
    }
    .resolve()
}
