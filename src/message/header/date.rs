use std::time::{Duration, SystemTime};

use httpdate::HttpDate;

use super::{Header, HeaderName};

/// Last second `httpdate` can write, 9999-12-31 23:59:59 UTC
const LAST_SECOND: u64 = 253_402_300_799;

/// Bring `date` into the range a `Date` header can express
///
/// Instants before 1970 become the epoch, instants after year 9999 its
/// last second.
pub(crate) fn clamp(date: SystemTime) -> SystemTime {
    match date.duration_since(SystemTime::UNIX_EPOCH) {
        Err(_) => SystemTime::UNIX_EPOCH,
        Ok(since) if since.as_secs() > LAST_SECOND => {
            SystemTime::UNIX_EPOCH + Duration::from_secs(LAST_SECOND)
        }
        Ok(_) => date,
    }
}

/// `Date` header, always in UTC
///
/// Written like `Tue, 15 Nov 1994 08:12:31 +0000`, see
/// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date(HttpDate);

impl Date {
    /// Header for `date`, clamped to the years 1970 to 9999
    pub fn new(date: SystemTime) -> Self {
        Self(HttpDate::from(clamp(date)))
    }
}

impl Header for Date {
    fn name() -> HeaderName {
        HeaderName::known("Date")
    }

    fn display(&self) -> String {
        // httpdate ends with the obsolete `GMT` zone
        let formatted = self.0.to_string();
        match formatted.strip_suffix("GMT") {
            Some(stamp) => format!("{stamp}+0000"),
            None => formatted,
        }
    }
}
