//! # Configurations: grouping raw frames and pairing them with arcs
//!
//! An RSS night produces science frames, flats and arcs taken under a handful of
//! instrument **configurations** (grating, grating angle, camera articulation). Each
//! science frame must be wavelength calibrated with an arc taken in the same
//! configuration. This module builds that pairing.
//!
//! Modules
//! -----------------
//! * [`modern`](crate::configuration::modern) – exact-match grouping on
//!   `(GRATING, GR-ANGLE, CAMANG, BVISITID)` with a relaxed arc fallback.
//! * [`legacy`](crate::configuration::legacy) – data taken before the block visit
//!   identifiers were reliable: segmentation into wavelength-calibration blocks and
//!   nearest-arc assignment.
//! * [`diagnostics`](crate::configuration::diagnostics) – the block table of the legacy path.
//! * [`params`](crate::configuration::params) – tunable thresholds ([`PartitionParams`]).
//!
//! Data Model
//! -----------------
//! * **Key:** [`ConfigurationKey`]; angles compare **exactly**, they are commanded
//!   set-points, not measurements. Tolerances are only used by the arc fallback. On the
//!   legacy path the key also names the arc, one entry per chosen arc.
//! * **Value:** [`RoleBuckets`], the arc / flat / object files of the configuration, in
//!   input order.
//! * **Map:** [`ConfigurationMap`] = `HashMap<ConfigurationKey, RoleBuckets, ahash::RandomState>`;
//!   iteration order is unspecified.
//!
//! Entry point
//! -----------------
//! [`list_configurations`] asks an [`ObservationLogProvider`] for the headers of the
//! input files, drops frames failing the beam-splitter check, and dispatches on the
//! observation dates: if any frame predates [`PartitionParams::legacy_cutoff_year`] the
//! legacy partitioner runs and its result is converted to a [`ConfigurationMap`].
//!
//! ```rust,no_run
//! use camino::{Utf8Path, Utf8PathBuf};
//! use rssmap::configuration::{list_configurations, PartitionParams};
//! use rssmap::notifier::LogNotifier;
//! use rssmap::obslog::csv_reader::CsvObservationLog;
//!
//! # fn run() -> Result<(), rssmap::rss_errors::RssError> {
//! let obslog = CsvObservationLog::from_path(Utf8Path::new("night/obslog.csv"))?;
//! let files: Vec<Utf8PathBuf> = obslog.log().files().to_vec();
//! let params = PartitionParams::builder().diagnostics_table("wavblktbl.txt").build()?;
//!
//! let configs = list_configurations(&files, &obslog, &params, &mut LogNotifier)?;
//! for (key, buckets) in &configs {
//!     println!("{key}: {} arcs, {} objects", buckets.arc.len(), buckets.object.len());
//! }
//! # Ok(()) }
//! ```
pub mod diagnostics;
pub mod legacy;
pub mod modern;
pub mod params;

use std::{collections::HashMap, fmt};

use ahash::RandomState;
use camino::Utf8PathBuf;
use ordered_float::OrderedFloat;

use crate::{
    constants::{Degree, ImageNumber},
    notifier::Notifier,
    obslog::{record::ObservationRecord, ObservationLog, ObservationLogProvider},
    rss_errors::RssError,
};

pub use legacy::{partition_legacy, LegacyPartition};
pub use modern::partition_modern;
pub use params::{PartitionParams, PartitionParamsBuilder};

/// Instrument setup shared by frames that can be calibrated together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationKey {
    pub grating: String,
    pub grating_angle: OrderedFloat<Degree>,
    pub articulation_angle: OrderedFloat<Degree>,
    /// `None` on the legacy path.
    pub block_visit: Option<i64>,
    /// Image number of the arc calibrating the entry; legacy path only.
    pub arc_image: Option<ImageNumber>,
}

impl ConfigurationKey {
    pub fn new(
        grating: &str,
        grating_angle: Degree,
        articulation_angle: Degree,
        block_visit: Option<i64>,
    ) -> Self {
        ConfigurationKey {
            grating: grating.to_string(),
            grating_angle: OrderedFloat(grating_angle),
            articulation_angle: OrderedFloat(articulation_angle),
            block_visit,
            arc_image: None,
        }
    }

    /// The same configuration, restricted to the frames served by arc `image`.
    pub fn with_arc_image(self, image: ImageNumber) -> Self {
        ConfigurationKey {
            arc_image: Some(image),
            ..self
        }
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grating {} Grang {:6.2} Artic {:6.2}",
            self.grating, self.grating_angle.0, self.articulation_angle.0
        )?;
        if let Some(visit) = self.block_visit {
            write!(f, " Visit {visit}")?;
        }
        if let Some(arc) = self.arc_image {
            write!(f, " Arc {arc}")?;
        }
        Ok(())
    }
}

/// Files of one configuration, by role, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleBuckets {
    pub arc: Vec<Utf8PathBuf>,
    pub flat: Vec<Utf8PathBuf>,
    pub object: Vec<Utf8PathBuf>,
}

/// Configuration → files. Iteration order is unspecified.
pub type ConfigurationMap = HashMap<ConfigurationKey, RoleBuckets, RandomState>;

/// Frames passing the beam-splitter check, in input order.
///
/// Applied once, by [`list_configurations_from_log`], before either partitioner runs.
/// A `BS-STATE` whose status character is not a digit is a data error.
pub fn quality_filter<'a>(
    records: &'a [ObservationRecord],
    params: &PartitionParams,
) -> Result<Vec<&'a ObservationRecord>, RssError> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if record.beam_splitter_status()? == params.beam_splitter_status {
            kept.push(record);
        }
    }
    Ok(kept)
}

/// Group the input files into configurations and pair them with arcs.
///
/// Arguments
/// -----------------
/// * `files`: raw frames, in observing order.
/// * `provider`: source of the header keywords of `files`.
/// * `params`: thresholds, see [`PartitionParams`].
/// * `notifier`: receives progress messages and warnings.
///
/// Return
/// ----------
/// * The [`ConfigurationMap`], or [`RssError::NoArcsToCalibrate`] when old data contains
///   no arc at all, or a header / I/O error.
pub fn list_configurations<P, N>(
    files: &[Utf8PathBuf],
    provider: &P,
    params: &PartitionParams,
    notifier: &mut N,
) -> Result<ConfigurationMap, RssError>
where
    P: ObservationLogProvider + ?Sized,
    N: Notifier + ?Sized,
{
    let log = provider.observation_log(files)?;
    list_configurations_from_log(&log, params, notifier)
}

/// [`list_configurations`] on an already built observation log.
pub fn list_configurations_from_log<N>(
    log: &ObservationLog,
    params: &PartitionParams,
    notifier: &mut N,
) -> Result<ConfigurationMap, RssError>
where
    N: Notifier + ?Sized,
{
    let records = log.records()?;
    let records: Vec<ObservationRecord> = quality_filter(&records, params)?
        .into_iter()
        .cloned()
        .collect();

    let mut old_data = false;
    for record in &records {
        if record.observation_date()?.year() < params.legacy_cutoff_year {
            old_data = true;
        }
    }

    if old_data {
        notifier.message("Configuration map for old data");
        let partition = partition_legacy(&records, params, notifier)?;
        if let Some(path) = &params.diagnostics_table {
            partition.diagnostics.write_to(path)?;
        }
        Ok(partition.configuration_map(&records))
    } else {
        partition_modern(&records, params, notifier)
    }
}

#[cfg(test)]
mod test_configuration {
    use super::*;

    #[test]
    fn test_key_equality_is_exact() {
        let a = ConfigurationKey::new("PG0900", 15.875, 31.75, Some(3));
        let b = ConfigurationKey::new("PG0900", 15.875, 31.75, Some(3));
        let c = ConfigurationKey::new("PG0900", 15.876, 31.75, Some(3));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            ConfigurationKey::new("PG0900", 0.0, 31.75, None),
            ConfigurationKey::new("PG0900", -0.0, 31.75, None)
        );

        let mut map = ConfigurationMap::default();
        map.insert(a.clone(), RoleBuckets::default());
        assert!(map.contains_key(&b));
        assert!(!map.contains_key(&c));
    }

    #[test]
    fn test_key_display() {
        let key = ConfigurationKey::new("PG0900", 15.87, 31.75, None);
        assert_eq!(key.to_string(), "Grating PG0900 Grang  15.87 Artic  31.75");
        let key = ConfigurationKey::new("PG0900", 15.87, 31.75, Some(42));
        assert_eq!(key.to_string(), "Grating PG0900 Grang  15.87 Artic  31.75 Visit 42");
        let key = ConfigurationKey::new("PG0900", 15.87, 31.75, None).with_arc_image(100);
        assert_eq!(key.to_string(), "Grating PG0900 Grang  15.87 Artic  31.75 Arc 100");
    }

    #[test]
    fn test_arc_image_separates_keys() {
        let key = ConfigurationKey::new("PG0900", 15.875, 31.75, None);
        assert_ne!(key.clone().with_arc_image(100), key.clone().with_arc_image(200));
        assert_ne!(key.clone().with_arc_image(100), key);
    }

    fn record(n: u32, bs_state: &str) -> ObservationRecord {
        ObservationRecord {
            path: format!("P20160101{n:04}.fits").into(),
            date_obs: "2016-01-01".into(),
            bs_state: bs_state.into(),
            grating: "PG0900".into(),
            grating_angle: 15.875,
            articulation_angle: 31.75,
            tracker_rho: Some(0.),
            block_visit: Some(1),
            ccd_type: Some("OBJECT".into()),
            object: None,
        }
    }

    #[test]
    fn test_quality_filter() {
        let records = vec![record(1, "S2"), record(2, "S1"), record(3, "S2")];
        let kept = quality_filter(&records, &PartitionParams::default()).unwrap();
        assert_eq!(kept, vec![&records[0], &records[2]]);

        assert!(quality_filter(&[record(4, "Sx")], &PartitionParams::default()).is_err());
    }
}
