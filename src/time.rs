use std::fmt;

use hifitime::{Epoch, TimeScale};

use crate::rss_errors::RssError;

/// Calendar date of an observation, stored as the integer `yyyymmdd`.
///
/// Integer ordering of `yyyymmdd` is calendar ordering, which is what the dated
/// calibration lookups rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationDate(u32);

impl ObservationDate {
    /// Build a date from its components, rejecting impossible calendar dates.
    pub fn new(year: u32, month: u8, day: u8) -> Result<Self, RssError> {
        let year_i32 = i32::try_from(year)
            .map_err(|_| RssError::InvalidObservationDate(format!("{year}-{month}-{day}")))?;
        Epoch::maybe_from_gregorian(year_i32, month, day, 0, 0, 0, 0, TimeScale::UTC).map_err(
            |e| RssError::InvalidObservationDate(format!("{year:04}-{month:02}-{day:02}: {e}")),
        )?;
        Ok(ObservationDate(year * 10_000 + month as u32 * 100 + day as u32))
    }

    /// Parse a header date, either `yyyy-mm-dd[...]` or `yyyymmdd[...]`.
    ///
    /// Only the leading eight digits are used, any time part is ignored.
    pub fn from_date_obs(date_obs: &str) -> Result<Self, RssError> {
        let digits: String = date_obs
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .take(8)
            .collect();
        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(RssError::InvalidObservationDate(date_obs.to_string()));
        }
        let invalid = |_| RssError::InvalidObservationDate(date_obs.to_string());
        let year = digits[0..4].parse::<u32>().map_err(invalid)?;
        let month = digits[4..6].parse::<u8>().map_err(invalid)?;
        let day = digits[6..8].parse::<u8>().map_err(invalid)?;
        ObservationDate::new(year, month, day)
    }

    /// Wrap an integer `yyyymmdd` value without calendar validation.
    ///
    /// Calibration files use this form for their labels.
    pub fn from_yyyymmdd(value: u32) -> Self {
        ObservationDate(value)
    }

    pub fn yyyymmdd(&self) -> u32 {
        self.0
    }

    pub fn year(&self) -> u32 {
        self.0 / 10_000
    }
}

impl fmt::Display for ObservationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}
