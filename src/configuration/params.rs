//! Tunable thresholds of the configuration partitioners.
use std::cmp::Ordering::{Equal, Greater};

use camino::Utf8PathBuf;

use crate::{
    constants::{
        Degree, BS_STATE_NOMINAL, CAMANG_TOLERANCE, GR_ANGLE_TOLERANCE, LEGACY_CUTOFF_YEAR,
        NEW_TRACK_DEG, WAVBLK_TABLE,
    },
    rss_errors::RssError,
};

/// Parameters of [`list_configurations`](crate::configuration::list_configurations).
///
/// Fields
/// -----------------
/// * `legacy_cutoff_year` – frames observed before this year switch the whole run to the
///   legacy partitioner.
/// * `beam_splitter_status` – required status digit (second character of `BS-STATE`).
/// * `new_track_deg` – a `TRKRHO` change larger than this between consecutive frames
///   starts a new track (legacy).
/// * `grating_angle_tolerance`, `articulation_tolerance` – exclusive bounds of the relaxed
///   arc match (modern).
/// * `diagnostics_table` – where to write the legacy block table, if anywhere.
///
/// Defaults
/// -----------------
/// * `legacy_cutoff_year`: 2015
/// * `beam_splitter_status`: 2
/// * `new_track_deg`: 5°
/// * `grating_angle_tolerance`: 0.03°
/// * `articulation_tolerance`: 0.05°
/// * `diagnostics_table`: none
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionParams {
    pub legacy_cutoff_year: u32,
    pub beam_splitter_status: u32,
    pub new_track_deg: Degree,
    pub grating_angle_tolerance: Degree,
    pub articulation_tolerance: Degree,
    pub diagnostics_table: Option<Utf8PathBuf>,
}

impl PartitionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PartitionParamsBuilder {
        PartitionParamsBuilder::new()
    }
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams {
            legacy_cutoff_year: LEGACY_CUTOFF_YEAR,
            beam_splitter_status: BS_STATE_NOMINAL,
            new_track_deg: NEW_TRACK_DEG,
            grating_angle_tolerance: GR_ANGLE_TOLERANCE,
            articulation_tolerance: CAMANG_TOLERANCE,
            diagnostics_table: None,
        }
    }
}

/// Builder for [`PartitionParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct PartitionParamsBuilder {
    params: PartitionParams,
}

impl PartitionParamsBuilder {
    pub fn new() -> Self {
        PartitionParamsBuilder {
            params: PartitionParams::default(),
        }
    }

    pub fn legacy_cutoff_year(mut self, v: u32) -> Self {
        self.params.legacy_cutoff_year = v;
        self
    }
    pub fn beam_splitter_status(mut self, v: u32) -> Self {
        self.params.beam_splitter_status = v;
        self
    }
    pub fn new_track_deg(mut self, v: Degree) -> Self {
        self.params.new_track_deg = v;
        self
    }
    pub fn grating_angle_tolerance(mut self, v: Degree) -> Self {
        self.params.grating_angle_tolerance = v;
        self
    }
    pub fn articulation_tolerance(mut self, v: Degree) -> Self {
        self.params.articulation_tolerance = v;
        self
    }
    pub fn diagnostics_table<P: Into<Utf8PathBuf>>(mut self, path: P) -> Self {
        self.params.diagnostics_table = Some(path.into());
        self
    }
    /// Write the block table as `wavblktbl.txt` in the working directory.
    pub fn write_diagnostics(self) -> Self {
        self.diagnostics_table(WAVBLK_TABLE)
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `beam_splitter_status` is a single decimal digit.
    /// * `new_track_deg >= 0` and finite.
    /// * `grating_angle_tolerance > 0`, `articulation_tolerance > 0`.
    pub fn build(self) -> Result<PartitionParams, RssError> {
        let p = &self.params;

        if p.beam_splitter_status > 9 {
            return Err(RssError::InvalidPartitionParameter(
                "beam_splitter_status must be a single digit".into(),
            ));
        }
        if !Self::ge0(p.new_track_deg) || !p.new_track_deg.is_finite() {
            return Err(RssError::InvalidPartitionParameter(
                "new_track_deg must be finite and non-negative".into(),
            ));
        }
        if !Self::gt0(p.grating_angle_tolerance) || !Self::gt0(p.articulation_tolerance) {
            return Err(RssError::InvalidPartitionParameter(
                "arc fallback tolerances must be > 0".into(),
            ));
        }

        Ok(self.params)
    }
}
