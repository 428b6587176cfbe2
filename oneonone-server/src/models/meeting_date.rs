//! Meeting date parsing
//!
//! Accepts what browsers and API clients actually send:
//! - RFC 3339 (`2023-02-10T09:00:00Z`)
//! - datetime-local (`2023-02-10T09:00`, optional seconds)
//! - plain date (`2023-02-10`, midnight)
//!
//! Values without an offset are read in the display timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::ValidationError;

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parsed meeting date, normalised to UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingDate(DateTime<Utc>);

impl MeetingDate {
    /// Parse a submitted date in one of the accepted formats.
    pub fn parse(s: &str, tz: &Tz) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "date" });
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        let naive = LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or(ValidationError::InvalidFormat {
                field: "date",
                reason: "expected YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339",
            })?;

        // Ambiguous local times (DST fold) take the earlier instant;
        // nonexistent ones (DST gap) are rejected.
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .ok_or(ValidationError::InvalidFormat {
                field: "date",
                reason: "time does not exist in the display timezone",
            })
    }

    /// The instant in UTC.
    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
