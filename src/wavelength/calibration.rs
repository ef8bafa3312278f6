//! Instrument calibration tables used by the wavelength model.
//!
//! Three plain-text files, all with `#` comments:
//!
//! * `gratings.txt` – `name lines/mm gamma0(deg)`, one grating per line;
//! * `RSSimgalign.txt` – detector alignment. The first two data rows hold the flexure
//!   coefficients in columns 1 and 2; dated rows hold `row0 col0 C0`;
//! * `RSSspecalign.txt` – dated spectrograph alignment, `Grat0 Home0 ArtErr T2Con T3Con`
//!   followed by the camera focal-length polynomial.
use camino::Utf8Path;

use crate::{
    constants::{Degree, RADEG},
    dated::DatedRecordStore,
    rss_errors::RssError,
    time::ObservationDate,
};

pub const GRATING_TABLE: &str = "gratings.txt";
pub const DETECTOR_ALIGNMENT: &str = "RSSimgalign.txt";
pub const SPECTROGRAPH_ALIGNMENT: &str = "RSSspecalign.txt";

/// Leading fixed parameters of a spectrograph alignment record.
const FIXED_TERMS: usize = 5;
/// The focal length derivative uses the coefficients up to degree 5.
const MIN_FCAM_TERMS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Grating {
    pub name: String,
    pub lines_per_mm: f64,
    /// Out-of-plane angle of the incident beam.
    pub gamma0: Degree,
}

/// The grating catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GratingTable {
    gratings: Vec<Grating>,
}

impl GratingTable {
    pub fn parse(source: &str, content: &str) -> Result<Self, RssError> {
        let store = DatedRecordStore::parse(source, content);
        let gratings = store
            .rows()
            .iter()
            .enumerate()
            .map(|(r, fields)| {
                let values = store.row_values(r, &[1, 2])?;
                Ok(Grating {
                    name: fields[0].clone(),
                    lines_per_mm: values[0],
                    gamma0: values[1],
                })
            })
            .collect::<Result<Vec<Grating>, RssError>>()?;
        Ok(GratingTable { gratings })
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self, RssError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path.as_str(), &content)
    }

    /// The first entry named `name`.
    pub fn get(&self, name: &str) -> Result<&Grating, RssError> {
        self.gratings
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| RssError::UnknownGrating(name.to_string()))
    }

    pub fn gratings(&self) -> &[Grating] {
        &self.gratings
    }
}

/// Optic axis on the detector, in unbinned pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticAxis {
    pub row: f64,
    pub col: f64,
    /// Plate scale term carried along with the alignment.
    pub c0: f64,
}

/// Detector alignment history with its rotator flexure model.
#[derive(Debug, Clone)]
pub struct DetectorAlignment {
    store: DatedRecordStore,
    /// `[[row_sin, col_sin], [row_cos, col_cos]]`
    flexure: [[f64; 2]; 2],
}

impl DetectorAlignment {
    pub fn from_store(store: DatedRecordStore) -> Result<Self, RssError> {
        let sin_terms = store.row_values(0, &[1, 2])?;
        let cos_terms = store.row_values(1, &[1, 2])?;
        Ok(DetectorAlignment {
            flexure: [
                [sin_terms[0], sin_terms[1]],
                [cos_terms[0], cos_terms[1]],
            ],
            store,
        })
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self, RssError> {
        Self::from_store(DatedRecordStore::from_file(path)?)
    }

    /// Flexure displacement `(row, col)` of the optic axis at tracker rotation `tracker_rho`.
    pub fn flexure(&self, tracker_rho: Degree) -> (f64, f64) {
        let (s, c) = ((tracker_rho * RADEG).sin(), (tracker_rho * RADEG).cos() - 1.);
        let [sin_terms, cos_terms] = self.flexure;
        (
            sin_terms[0] * s + cos_terms[0] * c,
            sin_terms[1] * s + cos_terms[1] * c,
        )
    }

    /// Optic axis at `date`, corrected for flexure.
    ///
    /// Errors
    /// -----------------
    /// * [`RssError::NoCalibrationRecord`] when no record applies to `date`.
    /// * [`RssError::InvalidCalibrationValue`] when the record has fewer than three values.
    pub fn optic_axis(
        &self,
        date: ObservationDate,
        tracker_rho: Degree,
    ) -> Result<OpticAxis, RssError> {
        let values = self.store.select_values(date)?;
        let &[row0, col0, c0] = values.as_slice() else {
            return Err(RssError::InvalidCalibrationValue {
                file: self.store.source().to_string(),
                reason: format!("expected row0 col0 C0, found {} values", values.len()),
            });
        };
        let (drow, dcol) = self.flexure(tracker_rho);
        Ok(OpticAxis {
            row: row0 - drow,
            col: col0 - dcol,
            c0,
        })
    }
}

/// One spectrograph alignment record.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrographAlignment {
    /// Grating angle zero point (degrees).
    pub grat0: Degree,
    /// Articulation home (degrees).
    pub home0: Degree,
    /// Articulation scale error.
    pub art_err: f64,
    pub t2_con: f64,
    pub t3_con: f64,
    /// Camera focal length (mm) as a polynomial of `lambda/1000 - 4`, ascending powers.
    pub fcam_poly: Vec<f64>,
}

impl SpectrographAlignment {
    pub fn from_values(source: &str, values: &[f64]) -> Result<Self, RssError> {
        if values.len() < FIXED_TERMS + MIN_FCAM_TERMS {
            return Err(RssError::InvalidCalibrationValue {
                file: source.to_string(),
                reason: format!(
                    "spectrograph alignment needs {} values, found {}",
                    FIXED_TERMS + MIN_FCAM_TERMS,
                    values.len()
                ),
            });
        }
        Ok(SpectrographAlignment {
            grat0: values[0],
            home0: values[1],
            art_err: values[2],
            t2_con: values[3],
            t3_con: values[4],
            fcam_poly: values[FIXED_TERMS..].to_vec(),
        })
    }

    /// Camera focal length at `ww`.
    pub fn fcam(&self, ww: f64) -> f64 {
        self.fcam_poly.iter().rev().fold(0., |acc, c| acc * ww + c)
    }

    /// Derivative of the focal length polynomial at `ww`, degrees 1 to 5.
    pub fn fcam_slope(&self, ww: f64) -> f64 {
        (1..MIN_FCAM_TERMS)
            .rev()
            .fold(0., |acc, k| acc * ww + k as f64 * self.fcam_poly[k])
    }
}

/// The calibration tables of a data directory.
#[derive(Debug, Clone)]
pub struct RssCalibration {
    pub gratings: GratingTable,
    pub detector: DetectorAlignment,
    spectrograph: DatedRecordStore,
}

impl RssCalibration {
    pub fn new(
        gratings: GratingTable,
        detector: DetectorAlignment,
        spectrograph: DatedRecordStore,
    ) -> Self {
        RssCalibration {
            gratings,
            detector,
            spectrograph,
        }
    }

    /// Load [`GRATING_TABLE`], [`DETECTOR_ALIGNMENT`] and [`SPECTROGRAPH_ALIGNMENT`] from `dir`.
    pub fn from_dir(dir: &Utf8Path) -> Result<Self, RssError> {
        Ok(RssCalibration {
            gratings: GratingTable::from_file(&dir.join(GRATING_TABLE))?,
            detector: DetectorAlignment::from_file(&dir.join(DETECTOR_ALIGNMENT))?,
            spectrograph: DatedRecordStore::from_file(&dir.join(SPECTROGRAPH_ALIGNMENT))?,
        })
    }

    /// The spectrograph alignment applicable at `date`.
    pub fn spectrograph_alignment(
        &self,
        date: ObservationDate,
    ) -> Result<SpectrographAlignment, RssError> {
        let values = self.spectrograph.select_values(date)?;
        SpectrographAlignment::from_values(self.spectrograph.source(), &values)
    }
}

#[cfg(test)]
mod test_calibration {
    use super::*;
    use approx::assert_relative_eq;

    const IMGALIGN: &str = "\
# flexure, then datever row0 col0 C0
flexsin  2.0  -1.0
flexcos  0.5   3.0
20110501_v01 -10.0 4.0 0.1
20140101_v01 -12.0 5.0 0.2
";

    #[test]
    fn test_grating_table() {
        let table = GratingTable::parse(
            "gratings.txt",
            "# name lmm gam0\nPG0300 300.0 0.\nPG0900  903.2  0.0\n",
        )
        .unwrap();
        assert_eq!(table.gratings().len(), 2);
        assert_eq!(table.get("PG0900").unwrap().lines_per_mm, 903.2);
        assert_eq!(
            table.get("PG2300"),
            Err(RssError::UnknownGrating("PG2300".into()))
        );
    }

    #[test]
    fn test_optic_axis_with_flexure() {
        let detector =
            DetectorAlignment::from_store(DatedRecordStore::parse("img", IMGALIGN)).unwrap();

        let axis = detector
            .optic_axis(ObservationDate::from_yyyymmdd(20120101), 0.)
            .unwrap();
        assert_eq!(axis, OpticAxis { row: -10.0, col: 4.0, c0: 0.1 });

        // rho = 90 deg: sin = 1, cos - 1 = -1
        let axis = detector
            .optic_axis(ObservationDate::from_yyyymmdd(20150101), 90.)
            .unwrap();
        assert_relative_eq!(axis.row, -12.0 - (2.0 - 0.5), epsilon = 1e-12);
        assert_relative_eq!(axis.col, 5.0 - (-1.0 - 3.0), epsilon = 1e-12);

        assert!(matches!(
            detector.optic_axis(ObservationDate::from_yyyymmdd(20100101), 0.),
            Err(RssError::NoCalibrationRecord { date: 20100101, .. })
        ));
    }

    #[test]
    fn test_spectrograph_alignment() {
        let values = [0.1, 0.2, 0.01, 0.5, 0.6, 328.0, 2.0, 1.0, 0.0, 0.0, 0.5];
        let align = SpectrographAlignment::from_values("spec", &values).unwrap();
        assert_eq!(align.fcam_poly.len(), 6);
        // 328 + 2 ww + ww^2 + 0.5 ww^5 at ww = 2
        assert_relative_eq!(align.fcam(2.0), 328.0 + 4.0 + 4.0 + 16.0, epsilon = 1e-12);
        // 2 + 2 ww + 2.5 ww^4
        assert_relative_eq!(align.fcam_slope(2.0), 2.0 + 4.0 + 40.0, epsilon = 1e-12);

        assert!(SpectrographAlignment::from_values("spec", &values[..10]).is_err());
    }
}
