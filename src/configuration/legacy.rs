//! # Legacy partitioner: wavelength-calibration blocks and nearest-arc pairing
//!
//! Data taken before 2015 cannot rely on `BVISITID` / `CCDTYPE`. The frames are instead
//! cut into **wavelength-calibration blocks**: maximal runs of consecutive frames in which
//! none of the following changes
//!
//! * the file group (a gap in the image numbers starts a new group),
//! * the track (a tracker rotation jump larger than [`PartitionParams::new_track_deg`]),
//! * the instrument configuration (grating, grating angle, articulation).
//!
//! Every block is then paired with one arc: the first arc inside the block if there is
//! one, otherwise the arc of the same configuration whose image number is closest to the
//! block's mean image number.
//!
//! Configurations without any arc lose their frames (warning). A run without a single
//! arc is fatal: [`RssError::NoArcsToCalibrate`].
use indexmap::IndexSet;
use itertools::Itertools;

use super::{
    diagnostics::{BlockDiagnosticRow, BlockDiagnostics},
    ConfigurationKey, ConfigurationMap, PartitionParams, RoleBuckets,
};
use crate::{
    constants::{Degree, ImageNumber, KW_TRKRHO},
    notifier::Notifier,
    obslog::record::ObservationRecord,
    rss_errors::RssError,
};

/// Result of [`partition_legacy`]. Every per-frame vector is indexed like the input records.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPartition {
    /// Distinct configurations, in order of first appearance.
    pub config_list: Vec<ConfigurationKey>,
    /// Position of each frame's configuration in `config_list`.
    pub config_index: Vec<usize>,
    pub image_numbers: Vec<ImageNumber>,
    /// Block of each frame; `None` for frames of a configuration without arcs.
    pub blocks: Vec<Option<usize>>,
    /// Record index of the arc serving each frame.
    pub arc_assignment: Vec<Option<usize>>,
    /// Distinct chosen arcs, ascending.
    pub arc_indices: Vec<usize>,
    pub diagnostics: BlockDiagnostics,
}

/// Running count of the consecutive pairs for which `changed` holds, starting at 0.
fn cumulative_changes<T, F>(values: &[T], changed: F) -> Vec<usize>
where
    F: Fn(&T, &T) -> bool,
{
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(values.iter().tuple_windows().scan(0, |count, (a, b)| {
            if changed(a, b) {
                *count += 1;
            }
            Some(*count)
        }))
        .collect()
}

fn join_numbers<'a, I: IntoIterator<Item = &'a ImageNumber>>(numbers: I) -> String {
    numbers.into_iter().join(" ")
}

/// Cut the frames of an old run into calibration blocks and pick one arc per block.
///
/// Arguments
/// -----------------
/// * `records`: frames in observing order, already quality filtered; `TRKRHO` and
///   `OBJECT` are read from them.
/// * `params`: the track threshold.
/// * `notifier`: receives one message per processed block, a warning per configuration
///   without arcs, and the fatal notice.
///
/// Return
/// ----------
/// * The [`LegacyPartition`]; an empty one for an empty input.
///
/// Errors
/// -----------------
/// * [`RssError::NoArcsToCalibrate`] when no frame is an arc.
/// * [`RssError::MissingKeyword`] when a frame has no `TRKRHO`.
/// * [`RssError::InvalidImageName`] when an image number cannot be read from a file name.
pub fn partition_legacy<N>(
    records: &[ObservationRecord],
    params: &PartitionParams,
    notifier: &mut N,
) -> Result<LegacyPartition, RssError>
where
    N: Notifier + ?Sized,
{
    let tracker_rho = records
        .iter()
        .map(|r| {
            r.tracker_rho
                .ok_or_else(|| RssError::MissingKeyword(KW_TRKRHO.to_string()))
        })
        .collect::<Result<Vec<Degree>, RssError>>()?;
    let image_numbers = records
        .iter()
        .map(ObservationRecord::image_number)
        .collect::<Result<Vec<ImageNumber>, RssError>>()?;

    let mut configurations: IndexSet<ConfigurationKey> = IndexSet::new();
    let config_index: Vec<usize> = records
        .iter()
        .map(|r| configurations.insert_full(r.instrument_configuration()).0)
        .collect();
    let config_list: Vec<ConfigurationKey> = configurations.into_iter().collect();

    let tracks = cumulative_changes(&tracker_rho, |a, b| (b - a).abs() > params.new_track_deg);
    let file_groups = cumulative_changes(&image_numbers, |a, b| {
        i64::from(*b) - i64::from(*a) > 1
    });
    let is_arc: Vec<bool> = records.iter().map(ObservationRecord::is_arc_object).collect();

    let signals: Vec<(usize, usize, usize)> = file_groups
        .iter()
        .zip(&tracks)
        .zip(&config_index)
        .map(|((&g, &t), &c)| (g, t, c))
        .collect();
    let raw_blocks = cumulative_changes(&signals, |a, b| a != b);
    let block_count = raw_blocks.last().map_or(0, |b| b + 1);

    let diagnostics = BlockDiagnostics {
        rows: (0..records.len())
            .map(|i| BlockDiagnosticRow {
                tracker_rho: tracker_rho[i],
                image_number: image_numbers[i],
                file_group: file_groups[i],
                track: tracks[i],
                config: config_index[i],
                block: raw_blocks[i],
                is_arc: is_arc[i],
            })
            .collect(),
    };

    let mut arcs_per_config = vec![0usize; config_list.len()];
    for (&c, _) in config_index.iter().zip(&is_arc).filter(|(_, arc)| **arc) {
        arcs_per_config[c] += 1;
    }
    let total_arcs: usize = arcs_per_config.iter().sum();

    let mut blocks: Vec<Option<usize>> = raw_blocks.iter().copied().map(Some).collect();
    for (c, key) in config_list.iter().enumerate() {
        if arcs_per_config[c] > 0 {
            continue;
        }
        let lost = (0..records.len()).filter(|&i| config_index[i] == c);
        notifier.warning(&format!(
            "No Arc for this configuration: {key}\n Images: {}",
            join_numbers(lost.clone().map(|i| &image_numbers[i]))
        ));
        for i in lost {
            blocks[i] = None;
        }
        if total_arcs == 0 {
            notifier.fatal("Cannot calibrate any images");
            return Err(RssError::NoArcsToCalibrate);
        }
    }

    let mut arc_assignment: Vec<Option<usize>> = vec![None; records.len()];
    for w in 0..block_count {
        let members: Vec<usize> = (0..records.len())
            .filter(|&i| blocks[i] == Some(w))
            .collect();
        let Some(&first) = members.first() else {
            continue;
        };

        let chosen = match members.iter().copied().find(|&i| is_arc[i]) {
            Some(arc) => Some(arc),
            None => {
                let conf = config_index[first];
                let mean = members
                    .iter()
                    .map(|&i| f64::from(image_numbers[i]))
                    .sum::<f64>()
                    / members.len() as f64;
                (0..records.len())
                    .filter(|&i| config_index[i] == conf && is_arc[i])
                    .min_by(|&a, &b| {
                        let da = (f64::from(image_numbers[a]) - mean).abs();
                        let db = (f64::from(image_numbers[b]) - mean).abs();
                        da.total_cmp(&db)
                    })
            }
        };
        let Some(arc) = chosen else {
            continue;
        };

        for &i in &members {
            arc_assignment[i] = Some(arc);
        }
        notifier.message(&format!(
            "For images: {}\n  Use Arc {:5}",
            join_numbers(members.iter().map(|&i| &image_numbers[i])),
            image_numbers[arc]
        ));
    }

    let arc_indices: Vec<usize> = arc_assignment.iter().flatten().copied().sorted().dedup().collect();

    Ok(LegacyPartition {
        config_list,
        config_index,
        image_numbers,
        blocks,
        arc_assignment,
        arc_indices,
        diagnostics,
    })
}

impl LegacyPartition {
    /// Number of distinct (unmasked) blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.iter().flatten().unique().count()
    }

    /// Image numbers of block `w`, in input order.
    pub fn block_images(&self, w: usize) -> Vec<ImageNumber> {
        self.blocks
            .iter()
            .zip(&self.image_numbers)
            .filter(|(b, _)| **b == Some(w))
            .map(|(_, &n)| n)
            .collect()
    }

    /// Express the pairing as a [`ConfigurationMap`]: one entry per chosen arc.
    ///
    /// The key is the arc's configuration without block visit, tagged with the arc's image
    /// number ([`ConfigurationKey::with_arc_image`]). `arc` holds that single arc, `object`
    /// the frames assigned to it that are not arcs themselves, `flat` stays empty.
    ///
    /// `records` must be the slice given to [`partition_legacy`].
    pub fn configuration_map(&self, records: &[ObservationRecord]) -> ConfigurationMap {
        self.arc_indices
            .iter()
            .map(|&a| {
                let key = self.config_list[self.config_index[a]]
                    .clone()
                    .with_arc_image(self.image_numbers[a]);
                let object = records
                    .iter()
                    .zip(&self.arc_assignment)
                    .filter(|(r, assigned)| **assigned == Some(a) && !r.is_arc_object())
                    .map(|(r, _)| r.path.clone())
                    .collect();
                let buckets = RoleBuckets {
                    arc: vec![records[a].path.clone()],
                    flat: Vec::new(),
                    object,
                };
                (key, buckets)
            })
            .collect()
    }
}
