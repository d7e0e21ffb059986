//! Benchmarks for playlist snapshot extraction and deduplication.
//!
//! Measures the in-memory part of a merge for live playlists of growing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hls_sink_playlist::PlaylistSnapshot;

fn playlist(start: usize, count: usize) -> String {
    let mut text = String::from("#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:6\n");
    for i in start..start + count {
        text.push_str(&format!(
            "#EXTINF:6.006,\nhttps://cdn.example.com/live/720p/seg{}.ts?token=abcdef\n",
            i
        ));
    }
    text
}

/// Benchmark scanning playlist text into a snapshot.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_parse");

    for count in [10, 1_000, 10_000] {
        let text = playlist(0, count);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("segments_{}", count), |b| {
            b.iter(|| black_box(PlaylistSnapshot::parse(black_box(&text))))
        });
    }

    group.finish();
}

/// Benchmark a full dedup: existing file of N segments vs a 10-segment window.
fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_dedup");

    for existing_count in [100, 10_000] {
        let existing_text = playlist(0, existing_count);
        let incoming_text = playlist(existing_count - 5, 10);

        group.bench_function(format!("existing_{}", existing_count), |b| {
            b.iter(|| {
                let existing = PlaylistSnapshot::parse(&existing_text);
                let fresh = PlaylistSnapshot::parse(&incoming_text).without(&existing);
                black_box(fresh.render())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_dedup);
criterion_main!(benches);
