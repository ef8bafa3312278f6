use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use rssmap::configuration::{partition_legacy, PartitionParams};
use rssmap::notifier::RecordingNotifier;
use rssmap::obslog::record::ObservationRecord;

/// A night of `n` frames: three configurations, a rotator jump every 40 frames,
/// a gap in the numbering every 25 frames and an arc every 12 frames.
fn synthetic_night(n: u32) -> Vec<ObservationRecord> {
    (0..n)
        .map(|i| {
            let image = i + i / 25 * 3;
            let grang = [12.5, 15.875, 20.0][(i / 60 % 3) as usize];
            ObservationRecord {
                path: format!("P20120505{image:04}.fits").into(),
                date_obs: "2012-05-05".into(),
                bs_state: "S2".into(),
                grating: "PG0900".into(),
                grating_angle: grang,
                articulation_angle: 2. * grang,
                tracker_rho: Some(f64::from(i / 40) * 7.5),
                block_visit: None,
                ccd_type: None,
                object: Some(if i % 12 == 0 { "ARC" } else { "M17" }.into()),
            }
        })
        .collect()
}

fn bench_partition_legacy(c: &mut Criterion) {
    let params = PartitionParams::default();
    let mut group = c.benchmark_group("partition_legacy");

    for n in [100u32, 1000] {
        let records = synthetic_night(n);
        group.bench_function(format!("{n}_frames"), |b| {
            b.iter_batched(
                RecordingNotifier::new,
                |mut notifier| {
                    let partition =
                        partition_legacy(black_box(&records), &params, &mut notifier).unwrap();
                    black_box(partition.configuration_map(&records))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition_legacy);
criterion_main!(benches);
