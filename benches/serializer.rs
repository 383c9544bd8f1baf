use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sil_term_bridge::adapter::{protocol, sexp, StateSerializer, StringStyle};
use sil_term_bridge::core::SandboxEngine;
use sil_term_bridge::types::{Keypress, MAP_HEIGHT, MAP_WIDTH};

fn bench_fresh(c: &mut Criterion) {
    let mut engine = SandboxEngine::tutorial();
    engine.apply_key(Keypress(b's'));
    let mut ser = StateSerializer::new(std::io::sink());

    c.bench_function("fresh_all_three_lines", |b| {
        b.iter(|| {
            ser.emit_all(black_box(&engine)).unwrap();
        })
    });
}

fn bench_map_line(c: &mut Criterion) {
    let engine = SandboxEngine::tutorial();

    c.bench_function("map_line_66x22", |b| {
        b.iter(|| {
            let msg = protocol::build_map(&engine, MAP_WIDTH, MAP_HEIGHT);
            black_box(sexp::to_string(&msg, StringStyle::Escaped).unwrap());
        })
    });
}

fn bench_parse_map(c: &mut Criterion) {
    let engine = SandboxEngine::tutorial();
    let msg = protocol::build_map(&engine, MAP_WIDTH, MAP_HEIGHT);
    let line = sexp::to_string(&msg, StringStyle::Escaped).unwrap();

    c.bench_function("parse_map_line", |b| {
        b.iter(|| {
            black_box(protocol::parse_message(black_box(&line)).unwrap());
        })
    });
}

criterion_group!(benches, bench_fresh, bench_map_line, bench_parse_map);
criterion_main!(benches);
