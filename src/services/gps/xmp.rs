//! GPS lookup inside an XMP packet, tolerant of attribute and element
//! serializations and of vendor namespaces.

use super::reconcile::{parse_iso6709, reconcile, RawCoordinate};
use crate::models::GeoCoordinate;

const LATITUDE_KEYS: &[&str] = &["exif:GPSLatitude", "drone-dji:GpsLatitude"];
// DJI firmware has shipped both spellings
const LONGITUDE_KEYS: &[&str] = &[
    "exif:GPSLongitude",
    "drone-dji:GpsLongitude",
    "drone-dji:GpsLongtitude",
];

/// Value of `key` written either as `key="value"` or `<key>value</key>`.
fn property<'a>(xmp: &'a str, key: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(found) = xmp[search_from..].find(key) {
        let after = search_from + found + key.len();
        search_from = after;

        // Reject longer names sharing the prefix, e.g. GPSLatitudeRef
        let rest = &xmp[after..];
        if rest
            .chars()
            .next()
            .map_or(true, |c| c.is_alphanumeric() || c == '_')
        {
            continue;
        }

        let trimmed = rest.trim_start();
        if let Some(value) = trimmed.strip_prefix('=') {
            let value = value.trim_start();
            let quote = value.chars().next()?;
            if quote != '"' && quote != '\'' {
                continue;
            }
            let body = &value[1..];
            if let Some(end) = body.find(quote) {
                return Some(&body[..end]);
            }
        } else if let Some(body) = rest.strip_prefix('>') {
            if let Some(end) = body.find('<') {
                return Some(body[..end].trim());
            }
        }
    }
    None
}

fn first_property<'a>(xmp: &'a str, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| property(xmp, key))
}

fn separate_properties(xmp: &str) -> Option<GeoCoordinate> {
    let lat = first_property(xmp, LATITUDE_KEYS)?;
    let lng = first_property(xmp, LONGITUDE_KEYS)?;
    reconcile(
        &RawCoordinate::Text(lat.to_string()),
        None,
        &RawCoordinate::Text(lng.to_string()),
        None,
    )
}

/// Coordinates from an XMP packet. XMP GPS values embed their hemisphere
/// letter (`51,30.0N`); vendor decimal fields are signed. Packets carrying
/// only a combined location (any `...ISO6709` property) are read too.
pub fn coordinates_from_xmp(xmp: &str) -> Option<GeoCoordinate> {
    separate_properties(xmp).or_else(|| property(xmp, "ISO6709").and_then(parse_iso6709))
}
