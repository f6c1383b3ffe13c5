//! Benchmarks for the hot paths of the extraction and proxy pipeline:
//! cache key formatting, HLS manifest rewriting, and SRT to WebVTT
//! conversion.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use streamcore::domain::value_objects::CatalogRef;
use streamcore::infrastructure::proxy::manifest_rewrite::{percent_encode, rewrite_manifest};
use streamcore::infrastructure::subtitle::converter::convert_srt_to_vtt;

fn bench_catalog_ref_display(c: &mut Criterion) {
    let movie = CatalogRef::movie(550).unwrap();
    let episode = CatalogRef::episode(1399, 4, 8).unwrap();

    c.bench_function("catalog_ref_display_movie", |b| {
        b.iter(|| black_box(movie.to_string()))
    });
    c.bench_function("catalog_ref_display_episode", |b| {
        b.iter(|| black_box(episode.to_string()))
    });
}

fn bench_manifest_rewrite(c: &mut Criterion) {
    let mut manifest = String::from("#EXTM3U\n#EXT-X-VERSION:6\n");
    for i in 0..200 {
        manifest.push_str(&format!("#EXTINF:6.000,\nsegment{i}.ts\n"));
    }

    c.bench_function("rewrite_manifest_200_segments", |b| {
        b.iter(|| {
            black_box(rewrite_manifest(
                &manifest,
                "https://cdn.example/hls/master.m3u8",
                "/api/stream-proxy",
                "shadowlands",
            ))
        })
    });

    c.bench_function("percent_encode_url", |b| {
        b.iter(|| black_box(percent_encode("https://cdn.example/hls/segment199.ts?token=abc123")))
    });
}

fn bench_srt_conversion(c: &mut Criterion) {
    let mut srt = String::new();
    for i in 0..500 {
        let start = i * 4;
        srt.push_str(&format!(
            "{}\n00:{:02}:{:02},000 --> 00:{:02}:{:02},500\nLine {i} of dialogue.\n\n",
            i + 1,
            start / 60,
            start % 60,
            (start + 3) / 60,
            (start + 3) % 60,
        ));
    }

    c.bench_function("convert_srt_to_vtt_500_cues", |b| {
        b.iter(|| black_box(convert_srt_to_vtt(&srt).unwrap()))
    });
}

criterion_group!(benches, bench_catalog_ref_display, bench_manifest_rewrite, bench_srt_conversion);
criterion_main!(benches);
