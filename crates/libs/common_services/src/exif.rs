use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use common_types::{ExifRecord, ExifWarning};
use exif::{Exif, Field, In, Tag, Value};
use std::io::Cursor;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("Could not read EXIF data: {0}")]
    Parse(#[from] exif::Error),
}

/// Reads capture time and GPS position from an image's EXIF segment.
///
/// Missing or malformed fields are left empty and reported in [`ExifRecord::warnings`].
/// Only fails when the bytes contain no readable EXIF segment at all.
pub fn extract_exif(bytes: &[u8]) -> Result<ExifRecord, ExifError> {
    let exif = exif::Reader::new().read_from_container(&mut Cursor::new(bytes))?;
    let mut record = ExifRecord::default();

    match capture_time(&exif) {
        Ok(Some(time)) => record.capture_time = Some(time),
        Ok(None) => record.warnings.push(ExifWarning::MissingCaptureTime),
        Err(reason) => record
            .warnings
            .push(ExifWarning::MalformedCaptureTime(reason)),
    }

    match coordinates(&exif) {
        Ok(Some((lat, lon))) => {
            record.gps_latitude = Some(lat);
            record.gps_longitude = Some(lon);
        }
        Ok(None) => record.warnings.push(ExifWarning::MissingGps),
        Err(reason) => record.warnings.push(ExifWarning::MalformedGps(reason)),
    }

    for warning in &record.warnings {
        warn!("EXIF: {warning:?}");
    }
    Ok(record)
}

fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn ascii(field: &Field) -> Option<&[u8]> {
    match &field.value {
        Value::Ascii(values) => values.first().map(Vec::as_slice),
        _ => None,
    }
}

fn capture_time(exif: &Exif) -> Result<Option<DateTime<Utc>>, String> {
    let Some(raw) = field(exif, Tag::DateTimeOriginal).or_else(|| field(exif, Tag::DateTime))
    else {
        return Ok(None);
    };
    let text = ascii(raw).ok_or_else(|| format!("{} is not ASCII", raw.tag))?;
    let mut parsed = exif::DateTime::from_ascii(text).map_err(|e| e.to_string())?;
    if let Some(offset) = field(exif, Tag::OffsetTimeOriginal).and_then(ascii) {
        parsed.parse_offset(offset).map_err(|e| e.to_string())?;
    }

    let naive = NaiveDate::from_ymd_opt(
        i32::from(parsed.year),
        u32::from(parsed.month),
        u32::from(parsed.day),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(parsed.hour),
            u32::from(parsed.minute),
            u32::from(parsed.second),
        )
    })
    .ok_or_else(|| format!("{parsed} is not a valid date"))?;

    match parsed.offset {
        None => Ok(Some(naive.and_utc())),
        Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)
            .and_then(|tz| naive.and_local_timezone(tz).single())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .ok_or_else(|| format!("invalid UTC offset of {minutes} minutes")),
    }
}

fn coordinates(exif: &Exif) -> Result<Option<(f64, f64)>, String> {
    let lat = field(exif, Tag::GPSLatitude);
    let lon = field(exif, Tag::GPSLongitude);
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Ok(None);
    };

    let lat = signed_degrees(lat, field(exif, Tag::GPSLatitudeRef), b'S', 90.0)?;
    let lon = signed_degrees(lon, field(exif, Tag::GPSLongitudeRef), b'W', 180.0)?;
    Ok(Some((lat, lon)))
}

/// Combines degree/minute/second rationals with the hemisphere reference tag.
fn signed_degrees(
    value: &Field,
    reference: Option<&Field>,
    negative: u8,
    max: f64,
) -> Result<f64, String> {
    let Value::Rational(parts) = &value.value else {
        return Err(format!("{} is not a rational", value.tag));
    };
    if parts.len() < 3 || parts.iter().take(3).any(|p| p.denom == 0) {
        return Err(format!("{} is not degrees/minutes/seconds", value.tag));
    }
    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    if !degrees.is_finite() || degrees > max {
        return Err(format!("{} out of range: {degrees}", value.tag));
    }

    let hemisphere = reference
        .and_then(ascii)
        .and_then(|r| r.first().copied())
        .ok_or_else(|| format!("{} has no reference direction", value.tag))?;
    Ok(if hemisphere.eq_ignore_ascii_case(&negative) {
        -degrees
    } else {
        degrees
    })
}
