//! # Model wavelengths of the RSS spectrograph
//!
//! A first-guess wavelength for every detector column, computed from the grating
//! equation and the instrument alignment history. Arc line identification starts from
//! this model.
//!
//! ## Model
//! -----------------
//! With `α = GR-ANGLE + Grat0`, `β0 = CAMANG·(1 + ArtErr) + Home0 − 0.015·col0/F0 − α`
//! and the grating density `ρ` (lines/mm):
//!
//! ```text
//! λ0   = 1e7 · cos γ0 · (sin α + sin β0) / ρ
//! disp = (1e7 · cos γ0 · cos β0 / ρ) / (fcam / 0.015)
//! λ(X) = T0 + T1·X + T2·(2X² − 1) + T3·(4X³ − 3X),   X = (i − cols/2)·cbin / 3162
//! ```
//!
//! where `fcam` is the camera focal length at `λ0` and the `T` terms carry the
//! distortion (see [`ModelTerms`]). At the model centre `X = 0`, `λ = T0 − T2 = λ0`.
pub mod calibration;

use nalgebra::{DVector, Vector4};

use crate::{
    constants::{Angstrom, Degree, ANGSTROM_PER_MM, FCAM_NORM, MODEL_CENTER, PIXEL_MM, RADEG},
    obslog::record::ObservationRecord,
    rss_errors::RssError,
    time::ObservationDate,
};
use calibration::RssCalibration;

/// The instrument settings of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrographSetup {
    pub grating: String,
    pub grating_angle: Degree,
    pub articulation_angle: Degree,
    pub tracker_rho: Degree,
}

impl SpectrographSetup {
    /// Setup of an observation log record; `TRKRHO` is required.
    pub fn from_record(record: &ObservationRecord) -> Result<Self, RssError> {
        Ok(SpectrographSetup {
            grating: record.grating.clone(),
            grating_angle: record.grating_angle,
            articulation_angle: record.articulation_angle,
            tracker_rho: record.tracker_rho.ok_or_else(|| {
                RssError::MissingKeyword(crate::constants::KW_TRKRHO.to_string())
            })?,
        })
    }
}

/// Chebyshev-like coefficients of the wavelength solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTerms {
    /// Wavelength at the model centre.
    pub lambda0: Angstrom,
    /// Dispersion at the model centre (Å per unbinned pixel).
    pub dispersion: f64,
    /// `[T0, T1, T2, T3]`
    pub terms: Vector4<f64>,
}

impl ModelTerms {
    /// Wavelength at normalised position `x`.
    pub fn wavelength(&self, x: f64) -> Angstrom {
        let basis = Vector4::new(1., x, 2. * x * x - 1., 4. * x.powi(3) - 3. * x);
        self.terms.dot(&basis)
    }
}

impl RssCalibration {
    /// Model terms for `setup` observed at `date`.
    ///
    /// Errors
    /// -----------------
    /// * [`RssError::UnknownGrating`] when the grating is not in the catalogue.
    /// * [`RssError::NoCalibrationRecord`] when an alignment file has no record for `date`.
    pub fn model_terms(
        &self,
        setup: &SpectrographSetup,
        date: ObservationDate,
    ) -> Result<ModelTerms, RssError> {
        let axis = self.detector.optic_axis(date, setup.tracker_rho)?;
        let align = self.spectrograph_alignment(date)?;
        let grating = self.gratings.get(&setup.grating)?;

        let alpha = (setup.grating_angle + align.grat0) * RADEG;
        let beta0 = (setup.articulation_angle * (1. + align.art_err) + align.home0) * RADEG
            - PIXEL_MM * axis.col / align.fcam_poly[0]
            - alpha;
        let gamma0 = grating.gamma0 * RADEG;
        let scale = ANGSTROM_PER_MM * gamma0.cos() / grating.lines_per_mm;

        let lambda0 = scale * (alpha.sin() + beta0.sin());
        let ww = lambda0 / 1000. - 4.;
        let fcam = align.fcam(ww);
        let dispersion = scale * beta0.cos() / (fcam / PIXEL_MM);
        let dfcam = (MODEL_CENTER / 1000.) * dispersion * align.fcam_slope(ww);

        let t2 = -0.25 * scale * beta0.sin() / (fcam / FCAM_NORM).powi(2)
            + align.t2_con * dispersion * dfcam;
        let t3 = (-1. / 24.) * MODEL_CENTER * dispersion / (fcam / FCAM_NORM).powi(2)
            + align.t3_con * dispersion;
        let t0 = lambda0 + t2;
        let t1 = MODEL_CENTER * dispersion + 3. * t3;

        Ok(ModelTerms {
            lambda0,
            dispersion,
            terms: Vector4::new(t0, t1, t2, t3),
        })
    }

    /// Model wavelength of every column of a `cols`-wide spectrum binned by `cbin`.
    ///
    /// Arguments
    /// -----------------
    /// * `setup`: grating, angles and tracker rotation of the frame.
    /// * `cbin`: column binning.
    /// * `cols`: number of (binned) columns.
    /// * `date`: observation date, selects the alignment records.
    ///
    /// Return
    /// ----------
    /// * One wavelength per column, in Ångström.
    pub fn model_wavelengths(
        &self,
        setup: &SpectrographSetup,
        cbin: u32,
        cols: usize,
        date: ObservationDate,
    ) -> Result<DVector<Angstrom>, RssError> {
        let model = self.model_terms(setup, date)?;
        let centre = (cols / 2) as f64;
        Ok(DVector::from_fn(cols, |i, _| {
            let x = (i as f64 - centre) * f64::from(cbin) / MODEL_CENTER;
            model.wavelength(x)
        }))
    }
}
