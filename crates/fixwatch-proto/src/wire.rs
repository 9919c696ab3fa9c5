use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Iso8601;
use time::OffsetDateTime;

/// One accepted geographic fix.
///
/// Horizontal accuracy is always a real number here: records whose accuracy
/// came in as the NaN sentinel never become a `PositionFix`. Altitude and
/// vertical accuracy travel together; if the feed could not vouch for the
/// vertical error, the altitude is dropped from the fix even when it parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub timestamp: OffsetDateTime,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: Option<f64>,
}

impl PositionFix {
    /// Clone with the timestamp advanced by `step`. Coordinates untouched.
    pub fn advanced_by(&self, step: std::time::Duration) -> Self {
        let mut fix = self.clone();
        fix.timestamp = self.timestamp + step;
        fix
    }
}

/// A classified feed line, borrowing the payload after the record tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLine<'a> {
    Position(&'a str),
    Status(&'a str),
    Permission(&'a str),
    Unknown(&'a str),
    Empty,
}

/// Split a raw feed line into record kind and payload.
pub fn classify(line: &str) -> FeedLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        FeedLine::Empty
    } else if let Some(rest) = line.strip_prefix("Position;") {
        FeedLine::Position(rest)
    } else if let Some(rest) = line.strip_prefix("Status;") {
        FeedLine::Status(rest)
    } else if let Some(rest) = line.strip_prefix("Permission;") {
        FeedLine::Permission(rest)
    } else {
        FeedLine::Unknown(line)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The feed reported a non-Ready status; the underlying source is closed.
    #[error("position feed closed (status '{0}')")]
    FeedClosed(String),
    #[error("malformed position record: {0}")]
    Malformed(String),
}

/// Parse the payload of a `Position;` record.
///
/// Field order: status, ISO-8601 UTC timestamp, latitude, longitude,
/// altitude, horizontal accuracy, vertical accuracy. A single trailing `;`
/// is tolerated.
///
/// Returns `Ok(None)` when the record is well-formed but the horizontal
/// accuracy is the NaN sentinel: an unknown accuracy is not actionable, and
/// is not an error either.
pub fn parse_position(payload: &str) -> Result<Option<PositionFix>, WireError> {
    let payload = payload.strip_suffix(';').unwrap_or(payload);
    let mut fields = payload.split(';');

    let status = fields.next().unwrap_or_default();
    if status != "Ready" {
        return Err(WireError::FeedClosed(status.to_string()));
    }

    let rest: Vec<&str> = fields.collect();
    if rest.len() != 6 {
        return Err(WireError::Malformed(format!(
            "expected 6 fields after status, got {}",
            rest.len()
        )));
    }

    let timestamp = OffsetDateTime::parse(rest[0], &Iso8601::DEFAULT)
        .map_err(|e| WireError::Malformed(format!("bad timestamp '{}': {}", rest[0], e)))?;

    let number = |name: &str, raw: &str| -> Result<f64, WireError> {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| WireError::Malformed(format!("bad {name} '{raw}'")))
    };
    let latitude = number("latitude", rest[1])?;
    let longitude = number("longitude", rest[2])?;
    let altitude = number("altitude", rest[3])?;
    let h_accuracy = number("horizontal accuracy", rest[4])?;
    let v_accuracy = number("vertical accuracy", rest[5])?;

    if h_accuracy.is_nan() {
        return Ok(None);
    }

    // Altitude without a vertical error bound is not reported.
    let (altitude, vertical_accuracy) = if v_accuracy.is_nan() {
        (None, None)
    } else {
        (Some(altitude), Some(v_accuracy))
    };

    Ok(Some(PositionFix {
        latitude,
        longitude,
        altitude,
        timestamp,
        horizontal_accuracy: h_accuracy,
        vertical_accuracy,
    }))
}
