//! This bench test builds a container from a batch of topics, each with a
//! viewpoint, a handful of comments and some selected components.

#![allow(missing_docs)]

use std::hint::black_box;

use bcfkit::{
    Assembler, CameraState, Components, TopicStore,
    domain::{Component, Selection, TopicDraft, ViewpointCapture},
    schema::{HeaderRecord, TopicRecord},
};
use criterion::{Criterion, criterion_group, criterion_main};
use non_empty_string::NonEmptyString;
use uuid::Uuid;

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Generates `count` topics as they would be sent to the worker
fn preseed_topics(count: usize) -> Vec<TopicRecord> {
    let mut store = TopicStore::new("bench@example.com");
    for i in 0..count {
        let components = Components {
            selection: vec![Selection {
                uuid: Uuid::new_v4(),
                components: (0..20)
                    .map(|n| Component::new(format!("{n:0>22}")))
                    .collect(),
            }],
            ..Components::default()
        };
        let capture = ViewpointCapture {
            camera: CameraState {
                position: [10.0, 5.0, -3.0],
                target: [0.0, 0.0, 0.0],
                direction: [-0.8, -0.4, 0.24],
                field_of_view: 60.0,
                aspect_ratio: 1.5,
            },
            snapshot_image: PIXEL.to_string(),
            components,
        };
        let title = NonEmptyString::new(format!("Topic {i}")).unwrap();
        let uuid = store.create_topic(TopicDraft::new(title), capture);
        for c in 0..5 {
            store
                .add_comment(uuid, Some(format!("comment {c}")), None)
                .unwrap();
        }
    }
    store.topics().iter().map(TopicRecord::from).collect()
}

fn build_container(c: &mut Criterion) {
    let topics = preseed_topics(100);
    let header = HeaderRecord::default();
    let assembler = Assembler::default();

    c.bench_function("build container", |b| {
        b.iter(|| assembler.build(black_box(&topics), &header).unwrap());
    });
}

criterion_group!(benches, build_container);
criterion_main!(benches);
