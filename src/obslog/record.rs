use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    configuration::ConfigurationKey,
    constants::{Degree, ImageNumber, KW_BS_STATE, KW_DATE_OBS},
    rss_errors::RssError,
    time::ObservationDate,
};

/// Role of a frame in the reduction, from its `CCDTYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationRole {
    Arc,
    Flat,
    /// Anything that is neither an arc nor a flat.
    Object,
}

impl ObservationRole {
    pub fn from_ccd_type(ccd_type: &str) -> Self {
        match ccd_type {
            "ARC" => ObservationRole::Arc,
            "FLAT" => ObservationRole::Flat,
            _ => ObservationRole::Object,
        }
    }
}

/// One row of the observation log, typed.
///
/// # Fields
///
/// * `path` - The input file
/// * `date_obs` - `DATE-OBS`, as written in the header
/// * `bs_state` - `BS-STATE`, as written in the header
/// * `grating` - `GRATING`, trimmed
/// * `grating_angle` - `GR-ANGLE` in degrees
/// * `articulation_angle` - `CAMANG` in degrees
/// * `tracker_rho` - `TRKRHO` in degrees, when the log has it
/// * `block_visit` - `BVISITID`, when the log has it
/// * `ccd_type` - `CCDTYPE`, trimmed, when the log has it
/// * `object` - `OBJECT`, untouched, when the log has it
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub path: Utf8PathBuf,
    pub date_obs: String,
    pub bs_state: String,
    pub grating: String,
    pub grating_angle: Degree,
    pub articulation_angle: Degree,
    pub tracker_rho: Option<Degree>,
    pub block_visit: Option<i64>,
    pub ccd_type: Option<String>,
    pub object: Option<String>,
}

impl ObservationRecord {
    /// Sequence number of the exposure, see [`image_number`].
    pub fn image_number(&self) -> Result<ImageNumber, RssError> {
        image_number(&self.path)
    }

    pub fn observation_date(&self) -> Result<ObservationDate, RssError> {
        ObservationDate::from_date_obs(&self.date_obs).map_err(|_| RssError::InvalidHeaderValue {
            keyword: KW_DATE_OBS.to_string(),
            file: self.path.to_string(),
            value: self.date_obs.clone(),
        })
    }

    /// Status digit of the beam splitter: the second character of `BS-STATE`.
    pub fn beam_splitter_status(&self) -> Result<u32, RssError> {
        self.bs_state
            .chars()
            .nth(1)
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| RssError::InvalidHeaderValue {
                keyword: KW_BS_STATE.to_string(),
                file: self.path.to_string(),
                value: self.bs_state.clone(),
            })
    }

    pub fn role(&self) -> ObservationRole {
        self.ccd_type
            .as_deref()
            .map(ObservationRole::from_ccd_type)
            .unwrap_or(ObservationRole::Object)
    }

    /// Old-data arc detection: `OBJECT` is `ARC`, ignoring case and surrounding blanks.
    pub fn is_arc_object(&self) -> bool {
        self.object
            .as_deref()
            .is_some_and(|o| o.trim().eq_ignore_ascii_case("ARC"))
    }

    /// Configuration of the modern path, including the block visit.
    pub fn configuration(&self) -> ConfigurationKey {
        ConfigurationKey::new(
            &self.grating,
            self.grating_angle,
            self.articulation_angle,
            self.block_visit,
        )
    }

    /// Configuration of the legacy path, without the block visit.
    pub fn instrument_configuration(&self) -> ConfigurationKey {
        ConfigurationKey::new(
            &self.grating,
            self.grating_angle,
            self.articulation_angle,
            None,
        )
    }
}

/// Return the sequence number of an image: the last four characters of the file name
/// up to its first `.` (all of it if shorter), as an integer.
///
/// ```
/// use camino::Utf8Path;
/// use rssmap::obslog::record::image_number;
///
/// assert_eq!(image_number(Utf8Path::new("raw/P201205050123.fits")).unwrap(), 123);
/// ```
pub fn image_number(path: &Utf8Path) -> Result<ImageNumber, RssError> {
    let invalid = || RssError::InvalidImageName(path.to_string());
    let stem = path
        .file_name()
        .and_then(|name| name.split('.').next())
        .ok_or_else(invalid)?;
    let start = stem
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    stem[start..].parse::<ImageNumber>().map_err(|_| invalid())
}
