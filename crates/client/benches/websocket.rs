// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rach_client::{
    common::parse::{is_truthy, resolve_topic},
    websocket::messages::{RachWsFrame, parse_ws_frame},
};
use serde_json::{Value, json};
use ustr::Ustr;

// Test data loaded at compile time
const ACK: &str = include_str!("../test_data/ws_ack.json");
const ERR: &str = include_str!("../test_data/ws_err.json");
const PUB: &str = include_str!("../test_data/ws_pub.json");
const SERVICE: &str = include_str!("../test_data/ws_service.json");
const AUTH_SUCCESS: &str = include_str!("../test_data/ws_auth_success.json");
const AUTH_FAILURE: &str = include_str!("../test_data/ws_auth_failure.json");
const CS_PING: &str = include_str!("../test_data/ws_cs_ping.json");

// =============================================================================
// FRAME PARSING BENCHMARKS
// =============================================================================

/// Benchmarks `parse_ws_frame` across every inbound frame type.
fn bench_parse_ws_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach parse_ws_frame");

    let frames = [
        ("ack", ACK),
        ("err", ERR),
        ("pub", PUB),
        ("service", SERVICE),
        ("auth_success", AUTH_SUCCESS),
        ("auth_failure", AUTH_FAILURE),
        ("cs_ping", CS_PING),
    ];

    for (name, frame) in &frames {
        group.bench_with_input(BenchmarkId::new("parse", name), frame, |b, frame| {
            b.iter(|| {
                let result = parse_ws_frame(black_box(frame)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmarks raw `serde_json::Value` parsing for comparison with the typed
/// envelope.
fn bench_json_value_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach JSON Value Parsing");

    let frames = [("pub", PUB), ("service", SERVICE), ("ack", ACK)];

    for (name, frame) in &frames {
        group.bench_with_input(BenchmarkId::new("to_value", name), frame, |b, frame| {
            b.iter(|| {
                let value: Value = serde_json::from_str(black_box(frame)).unwrap();
                black_box(value);
            });
        });
    }

    group.finish();
}

// =============================================================================
// FRAME SERIALIZATION BENCHMARKS
// =============================================================================

/// Benchmarks outbound frame construction and serialization.
fn bench_serialize_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach Frame Serialization");

    let topic = Ustr::from("/robot/arm/joint_states");

    group.bench_function("add_sub", |b| {
        b.iter(|| {
            let frame = RachWsFrame::add_sub("42".to_string(), black_box(topic));
            black_box(serde_json::to_string(&frame).unwrap());
        });
    });

    group.bench_function("publish", |b| {
        let payload = json!({"position": [0.0, 0.785, -1.571]});
        b.iter(|| {
            let frame =
                RachWsFrame::publish("42".to_string(), black_box(topic), payload.clone());
            black_box(serde_json::to_string(&frame).unwrap());
        });
    });

    group.bench_function("ping", |b| {
        b.iter(|| {
            let frame = RachWsFrame::ping("42".to_string());
            black_box(serde_json::to_string(&frame).unwrap());
        });
    });

    group.finish();
}

// =============================================================================
// TOPIC RESOLUTION BENCHMARKS
// =============================================================================

/// Benchmarks topic resolution against a namespace.
fn bench_resolve_topic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach Topic Resolution");

    let cases = [
        ("relative", "/robot", "arm/joint_states"),
        ("absolute", "/robot", "/other/arm/joint_states"),
        ("root_namespace", "/", "arm/joint_states"),
        ("trailing_slash", "/robot/", "arm/joint_states/"),
    ];

    for (name, namespace, topic) in &cases {
        group.bench_function(BenchmarkId::new("resolve", name), |b| {
            b.iter(|| {
                black_box(resolve_topic(black_box(namespace), black_box(topic)));
            });
        });
    }

    group.finish();
}

// =============================================================================
// DISPATCH BENCHMARKS
// =============================================================================

/// Benchmarks the auth success check on the dispatch hot path.
fn bench_auth_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach Auth Check");

    for (name, frame) in &[("success", AUTH_SUCCESS), ("failure", AUTH_FAILURE)] {
        group.bench_with_input(BenchmarkId::new("check", name), frame, |b, frame| {
            b.iter(|| {
                let frame = parse_ws_frame(black_box(frame)).unwrap();
                let success = frame
                    .data
                    .as_ref()
                    .and_then(|data| data.get("success"))
                    .is_some_and(is_truthy);
                black_box(success);
            });
        });
    }

    group.finish();
}

/// Benchmarks batch processing of pushed data frames.
fn bench_push_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rach Push Batch");

    let batch_sizes = [10, 100, 1000];

    for batch_size in batch_sizes {
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(
            BenchmarkId::new("pub_frames", batch_size),
            &batch_size,
            |b, &size| {
                b.iter(|| {
                    for _ in 0..size {
                        let frame = parse_ws_frame(PUB).unwrap();
                        let topic = frame
                            .data
                            .as_ref()
                            .and_then(|data| data.get("topic"))
                            .and_then(Value::as_str);
                        black_box(topic);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_ws_frame,
    bench_json_value_parsing,
    bench_serialize_frames,
    bench_resolve_topic,
    bench_auth_check,
    bench_push_batch,
);
criterion_main!(benches);
