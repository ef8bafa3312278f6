//! Exact-match configuration grouping for data with block visit identifiers.
use indexmap::IndexSet;

use super::{ConfigurationKey, ConfigurationMap, PartitionParams, RoleBuckets};
use crate::{
    notifier::Notifier,
    obslog::record::{ObservationRecord, ObservationRole},
    rss_errors::RssError,
};

/// Arc of another block visit close enough to stand in for `key`'s missing arc.
fn relaxed_match(
    record: &ObservationRecord,
    key: &ConfigurationKey,
    params: &PartitionParams,
) -> bool {
    let d_grang = record.grating_angle - key.grating_angle.0;
    let d_artic = record.articulation_angle - key.articulation_angle.0;
    record.grating == key.grating
        && d_grang < params.grating_angle_tolerance
        && d_grang > -params.grating_angle_tolerance
        && d_artic < params.articulation_tolerance
        && d_artic > -params.articulation_tolerance
        && record.block_visit != key.block_visit
}

/// Group frames by `(GRATING, GR-ANGLE, CAMANG, BVISITID)` and split them by role.
///
/// `records` must already have passed [`quality_filter`](super::quality_filter), as
/// [`list_configurations`](super::list_configurations) does. For each configuration:
///
/// 1. frames with exactly this key are split into arc / flat / object by `CCDTYPE`;
/// 2. if there is no arc, arcs of **other** block visits with the same grating and
///    angles within the tolerances of `params` are used instead (a warning is emitted);
/// 3. a configuration without object frames is left out of the result.
///
/// Arguments
/// -----------------
/// * `records`: the quality-filtered frames of the run.
/// * `params`: fallback tolerances.
/// * `notifier`: receives the fallback warnings.
///
/// Return
/// ----------
/// * The [`ConfigurationMap`].
pub fn partition_modern<N>(
    records: &[ObservationRecord],
    params: &PartitionParams,
    notifier: &mut N,
) -> Result<ConfigurationMap, RssError>
where
    N: Notifier + ?Sized,
{
    let keys: IndexSet<ConfigurationKey> = records.iter().map(|r| r.configuration()).collect();

    let mut configurations = ConfigurationMap::default();
    for key in keys {
        let mut buckets = RoleBuckets::default();
        for record in records.iter().filter(|r| r.configuration() == key) {
            let bucket = match record.role() {
                ObservationRole::Arc => &mut buckets.arc,
                ObservationRole::Flat => &mut buckets.flat,
                ObservationRole::Object => &mut buckets.object,
            };
            bucket.push(record.path.clone());
        }

        if buckets.arc.is_empty() {
            buckets.arc = records
                .iter()
                .filter(|r| r.role() == ObservationRole::Arc && relaxed_match(r, &key, params))
                .map(|r| r.path.clone())
                .collect();
            if !buckets.arc.is_empty() {
                notifier.warning(&format!(
                    "Warning: using arc from different block visit for {key}"
                ));
            }
        }

        if buckets.object.is_empty() {
            continue;
        }
        configurations.insert(key, buckets);
    }

    Ok(configurations)
}

#[cfg(test)]
mod test_modern {
    use super::*;
    use crate::notifier::RecordingNotifier;
    use camino::Utf8PathBuf;

    fn frame(n: u32, ccd_type: &str, grang: f64, camang: f64, visit: i64) -> ObservationRecord {
        ObservationRecord {
            path: format!("P20160101{n:04}.fits").into(),
            date_obs: "2016-01-01".into(),
            bs_state: "S2".into(),
            grating: "PG0900".into(),
            grating_angle: grang,
            articulation_angle: camang,
            tracker_rho: Some(0.),
            block_visit: Some(visit),
            ccd_type: Some(ccd_type.into()),
            object: None,
        }
    }

    fn paths(numbers: &[u32]) -> Vec<Utf8PathBuf> {
        numbers
            .iter()
            .map(|n| format!("P20160101{n:04}.fits").into())
            .collect()
    }

    #[test]
    fn test_exact_grouping() {
        let records = vec![
            frame(1, "FLAT", 15.875, 31.75, 1),
            frame(2, "ARC", 15.875, 31.75, 1),
            frame(3, "OBJECT", 15.875, 31.75, 1),
            frame(4, "OBJECT", 15.875, 31.75, 1),
            frame(5, "ARC", 20.0, 40.0, 1),
            frame(6, "OBJECT", 20.0, 40.0, 1),
        ];
        let mut notifier = RecordingNotifier::new();
        let map = partition_modern(&records, &PartitionParams::default(), &mut notifier).unwrap();

        assert_eq!(map.len(), 2);
        let buckets = &map[&ConfigurationKey::new("PG0900", 15.875, 31.75, Some(1))];
        assert_eq!(buckets.arc, paths(&[2]));
        assert_eq!(buckets.flat, paths(&[1]));
        assert_eq!(buckets.object, paths(&[3, 4]));
        assert!(notifier.warnings().is_empty());
    }

    #[test]
    fn test_configuration_without_objects_is_dropped() {
        let records = vec![
            frame(1, "ARC", 15.875, 31.75, 1),
            frame(2, "OBJECT", 15.875, 31.75, 1),
            // flat and arc only: dropped
            frame(4, "ARC", 10.0, 20.0, 2),
            frame(5, "FLAT", 10.0, 20.0, 2),
        ];
        let map =
            partition_modern(&records, &PartitionParams::default(), &mut RecordingNotifier::new())
                .unwrap();
        assert_eq!(map.len(), 1);
        let buckets = map.values().next().unwrap();
        assert_eq!(buckets.object, paths(&[2]));
    }

    #[test]
    fn test_arc_fallback_from_other_visit() {
        let records = vec![
            frame(1, "OBJECT", 15.875, 31.75, 1),
            frame(2, "ARC", 15.885, 31.71, 2),
            // outside the tolerances
            frame(3, "ARC", 15.91, 31.75, 3),
            frame(4, "ARC", 15.875, 31.81, 4),
        ];
        let mut notifier = RecordingNotifier::new();
        let map = partition_modern(&records, &PartitionParams::default(), &mut notifier).unwrap();

        let buckets = &map[&ConfigurationKey::new("PG0900", 15.875, 31.75, Some(1))];
        assert_eq!(buckets.arc, paths(&[2]));
        assert_eq!(notifier.warnings().len(), 1);
        assert!(notifier.warnings()[0].contains("different block visit"));
    }

    #[test]
    fn test_fallback_bounds_are_exclusive() {
        // binary fractions: the differences below are exact
        let params = PartitionParams::builder()
            .grating_angle_tolerance(0.25)
            .articulation_tolerance(0.5)
            .build()
            .unwrap();
        let key = ConfigurationKey::new("PG0900", 15.5, 31.0, Some(1));

        assert!(relaxed_match(&frame(2, "ARC", 15.625, 31.25, 2), &key, &params));
        assert!(!relaxed_match(&frame(3, "ARC", 15.75, 31.0, 2), &key, &params));
        assert!(!relaxed_match(&frame(4, "ARC", 15.25, 31.0, 2), &key, &params));
        assert!(!relaxed_match(&frame(5, "ARC", 15.5, 31.5, 2), &key, &params));
        assert!(!relaxed_match(&frame(6, "ARC", 15.5, 30.5, 2), &key, &params));

        let records = vec![
            frame(1, "OBJECT", 15.5, 31.0, 1),
            frame(3, "ARC", 15.75, 31.0, 2),
            frame(5, "ARC", 15.5, 31.5, 3),
        ];
        let mut notifier = RecordingNotifier::new();
        let map = partition_modern(&records, &params, &mut notifier).unwrap();
        assert!(map[&key].arc.is_empty());
        assert!(notifier.warnings().is_empty());
    }

    #[test]
    fn test_fallback_requires_a_different_visit() {
        // same visit, slightly different angle: separate configuration, no fallback
        let records = vec![
            frame(1, "OBJECT", 15.875, 31.75, 1),
            frame(2, "ARC", 15.880, 31.75, 1),
        ];
        let mut notifier = RecordingNotifier::new();
        let map = partition_modern(&records, &PartitionParams::default(), &mut notifier).unwrap();

        let buckets = &map[&ConfigurationKey::new("PG0900", 15.875, 31.75, Some(1))];
        assert!(buckets.arc.is_empty());
        assert!(notifier.warnings().is_empty());
    }
}
