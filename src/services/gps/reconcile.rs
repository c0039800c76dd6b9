//! Normalization of the many shapes a GPS coordinate takes in image metadata
//! into decimal degrees.

use crate::models::GeoCoordinate;

/// A coordinate value as pulled out of some metadata source, before any
/// interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCoordinate {
    Decimal(f64),
    Rational { numerator: f64, denominator: f64 },
    /// Degrees, minutes, seconds; trailing components may be missing.
    Dms(Vec<RawCoordinate>),
    Text(String),
}

impl RawCoordinate {
    pub fn rational(numerator: impl Into<f64>, denominator: impl Into<f64>) -> Self {
        RawCoordinate::Rational {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    /// Build a DMS value from EXIF-style `(numerator, denominator)` pairs.
    pub fn from_rationals<N: Into<f64> + Copy, D: Into<f64> + Copy>(parts: &[(N, D)]) -> Self {
        RawCoordinate::Dms(
            parts
                .iter()
                .map(|&(n, d)| RawCoordinate::rational(n, d))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Parse a reference tag value such as `"S"`, `"s\0"` or `"West"`.
    pub fn parse(s: &str) -> Option<Self> {
        s.trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .chars()
            .next()
            .and_then(Self::from_char)
    }

    fn belongs_to(self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (Hemisphere::North | Hemisphere::South, Axis::Latitude)
                | (Hemisphere::East | Hemisphere::West, Axis::Longitude)
        )
    }

    fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

/// Resolve a scalar (non-DMS) component to a number.
fn scalar(raw: &RawCoordinate) -> Option<f64> {
    let value = match raw {
        RawCoordinate::Decimal(v) => *v,
        RawCoordinate::Rational {
            numerator,
            denominator,
        } => {
            if *denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        RawCoordinate::Text(s) => s.trim().parse::<f64>().ok()?,
        RawCoordinate::Dms(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// `|deg| + min/60 + sec/3600`, together with the sign carried by `deg`.
fn combine_dms(degrees: f64, minutes: f64, seconds: f64) -> Option<(f64, bool)> {
    if minutes < 0.0 || seconds < 0.0 {
        return None;
    }
    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    magnitude
        .is_finite()
        .then_some((magnitude, degrees.is_sign_negative() && degrees != 0.0))
}

fn dms_parts(parts: &[RawCoordinate]) -> Option<(f64, bool)> {
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut values = [0.0; 3];
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = scalar(part)?;
    }
    combine_dms(values[0], values[1], values[2])
}

/// Parse free text: plain decimal (`"-33.86"`), DMS with symbols or spaces
/// (`51°30'12.5"N`, `51 30 12.5 N`), or the XMP `DD,MM.mmk` form
/// (`"51,30.0N"`). A hemisphere letter found in the text is returned
/// alongside the magnitude.
fn parse_text(text: &str) -> Option<(f64, bool, Option<Hemisphere>)> {
    let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if text.is_empty() {
        return None;
    }

    let mut hemisphere = None;
    let mut body = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(h) = Hemisphere::from_char(c) {
            if hemisphere.is_some() {
                return None;
            }
            hemisphere = Some(h);
            body.push(' ');
        } else {
            body.push(c);
        }
    }

    let body = body.trim();
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.strip_prefix('+').unwrap_or(body)),
    };

    let numbers: Vec<f64> = body
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    if numbers.is_empty() || numbers.len() > 3 {
        return None;
    }

    let (magnitude, _) = combine_dms(
        numbers[0],
        numbers.get(1).copied().unwrap_or(0.0),
        numbers.get(2).copied().unwrap_or(0.0),
    )?;
    Some((magnitude, negative, hemisphere))
}

/// Convert a raw value for one axis into signed decimal degrees.
///
/// An explicit `reference` decides the sign (`S`/`W` negative). Without one,
/// a hemisphere letter embedded in text is used, and failing that the value
/// keeps its own sign. References from the wrong axis are ignored.
pub fn to_decimal(raw: &RawCoordinate, axis: Axis, reference: Option<Hemisphere>) -> Option<f64> {
    let (magnitude, negative, embedded) = match raw {
        RawCoordinate::Dms(parts) => {
            let (m, n) = dms_parts(parts)?;
            (m, n, None)
        }
        RawCoordinate::Text(s) => parse_text(s)?,
        other => {
            let v = scalar(other)?;
            (v.abs(), v < 0.0, None)
        }
    };

    let reference = reference
        .filter(|h| h.belongs_to(axis))
        .or_else(|| embedded.filter(|h| h.belongs_to(axis)));

    let negative = match reference {
        Some(h) => h.is_negative(),
        None => negative,
    };

    let value = if negative { -magnitude } else { magnitude };
    (value.abs() <= axis.limit()).then_some(value)
}

/// Combine both axes into a validated coordinate.
pub fn reconcile(
    latitude: &RawCoordinate,
    latitude_ref: Option<&str>,
    longitude: &RawCoordinate,
    longitude_ref: Option<&str>,
) -> Option<GeoCoordinate> {
    let lat = to_decimal(
        latitude,
        Axis::Latitude,
        latitude_ref.and_then(Hemisphere::parse),
    )?;
    let lng = to_decimal(
        longitude,
        Axis::Longitude,
        longitude_ref.and_then(Hemisphere::parse),
    )?;
    GeoCoordinate::new(lat, lng).ok()
}

/// Parse one ISO 6709 component. The number of integer digits selects the
/// layout: `DD[.d]`, `DDMM[.m]`, `DDMMSS[.s]` for latitude and the same with
/// a three-digit degree field for longitude.
fn iso6709_component(token: &str, axis: Axis) -> Option<f64> {
    let (sign, digits) = match token.as_bytes().first()? {
        b'+' => (1.0, &token[1..]),
        b'-' => (-1.0, &token[1..]),
        _ => return None,
    };
    let int_len = digits.find('.').unwrap_or(digits.len());
    if int_len == 0 || !digits[..int_len].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let fraction: f64 = if int_len < digits.len() {
        format!("0{}", &digits[int_len..]).parse().ok()?
    } else {
        0.0
    };

    let degree_digits = match axis {
        Axis::Latitude => 2,
        Axis::Longitude => 3,
    };
    let field = |range: std::ops::Range<usize>| digits[range].parse::<f64>().ok();

    let magnitude = match int_len.checked_sub(degree_digits)? {
        0 => field(0..degree_digits)? + fraction,
        2 => {
            let minutes = field(degree_digits..int_len)? + fraction;
            combine_dms(field(0..degree_digits)?, minutes, 0.0)?.0
        }
        4 => {
            let seconds = field(degree_digits + 2..int_len)? + fraction;
            combine_dms(
                field(0..degree_digits)?,
                field(degree_digits..degree_digits + 2)?,
                seconds,
            )?
            .0
        }
        _ => return None,
    };

    let value = sign * magnitude;
    (value.abs() <= axis.limit()).then_some(value)
}

/// Parse an ISO 6709 point such as `+51.5000-000.1167/`,
/// `+5130-00007/` or `+43.29013+084.22713+1595.950CRSWGS_84/`.
/// Altitude and CRS suffixes are ignored.
pub fn parse_iso6709(text: &str) -> Option<GeoCoordinate> {
    let text = text.trim();
    let mut boundaries = text
        .char_indices()
        .filter(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i);

    if boundaries.next()? != 0 {
        return None;
    }
    let lng_start = boundaries.next()?;
    let lng_end = text[lng_start + 1..]
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|i| lng_start + 1 + i)
        .unwrap_or(text.len());

    let lat = iso6709_component(&text[..lng_start], Axis::Latitude)?;
    let lng = iso6709_component(&text[lng_start..lng_end], Axis::Longitude)?;
    GeoCoordinate::new(lat, lng).ok()
}
