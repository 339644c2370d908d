//! End-to-end container builds, from a topic store to the saved archive.

use std::io::{Cursor, Read};

use bcfkit::{
    Assembler, CameraState, Client, ClientError, Components, Config, DirectorySaver, Header,
    TopicStore,
    container::FailureKind,
    domain::{
        Component, Selection, TopicDraft, ViewpointCapture,
        components::{Color, Coloring},
    },
    schema::{CameraRecord, HeaderRecord, TopicRecord},
};
use non_empty_string::NonEmptyString;
use tempfile::TempDir;
use uuid::Uuid;
use zip::ZipArchive;

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn camera() -> CameraState {
    CameraState {
        position: [10.0, 5.0, -3.0],
        target: [0.0, 0.0, 0.0],
        direction: [-0.8, -0.4, 0.24],
        field_of_view: 60.0,
        aspect_ratio: 1.5,
    }
}

fn capture(components: Components) -> ViewpointCapture {
    ViewpointCapture {
        camera: camera(),
        snapshot_image: PIXEL.to_string(),
        components,
    }
}

fn draft(title: &str) -> TopicDraft {
    TopicDraft::new(NonEmptyString::new(title.to_string()).unwrap())
}

struct Archive(ZipArchive<Cursor<Vec<u8>>>);

impl Archive {
    fn new(bytes: Vec<u8>) -> Self {
        Self(ZipArchive::new(Cursor::new(bytes)).unwrap())
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.0.file_names().map(ToString::to_string).collect();
        names.sort();
        names
    }

    fn text(&mut self, name: &str) -> String {
        let mut text = String::new();
        self.0
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }
}

fn build(topics: &[TopicRecord]) -> Archive {
    Archive::new(
        Assembler::default()
            .build(topics, &HeaderRecord::default())
            .unwrap(),
    )
}

fn records(store: &TopicStore) -> Vec<TopicRecord> {
    store.topics().iter().map(TopicRecord::from).collect()
}

#[test]
fn leak_in_ceiling_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut store = TopicStore::new("someone@example.com");
    let uuid = store.create_topic(draft("Leak in ceiling"), capture(Components::default()));

    let config = Config {
        pretty_print: false,
        ..Config::default()
    };
    let client = Client::new(&config, DirectorySaver::new(dir.path())).unwrap();
    let saved = client
        .create_container(store.topics(), &Header::default())
        .unwrap();
    assert_eq!(saved.path, dir.path().join("presentation.bcf"));

    let topic = store.get(uuid).unwrap();
    let viewpoint = topic.first_viewpoint().unwrap();
    let mut archive = Archive::new(std::fs::read(&saved.path).unwrap());

    let mut expected = vec![
        "bcf.version".to_string(),
        format!("{uuid}/markup.bcf"),
        format!("{uuid}/{}", viewpoint.viewpoint_file()),
        format!("{uuid}/{}", viewpoint.snapshot_file()),
    ];
    expected.sort();
    assert_eq!(archive.names(), expected);

    let markup = archive.text(&format!("{uuid}/markup.bcf"));
    assert!(markup.contains("Leak in ceiling"));
    assert!(markup.contains(&format!("<Viewpoint>{}</Viewpoint>", viewpoint.viewpoint_file())));

    let visinfo = archive.text(&format!("{uuid}/{}", viewpoint.viewpoint_file()));
    assert!(visinfo.contains(&format!("Guid=\"{}\"", viewpoint.uuid())));
    // [10, 5, -3] in viewer space is [10, 3, 5] in BCF space.
    assert!(visinfo.contains("<CameraViewPoint><X>10</X><Y>3</Y><Z>5</Z></CameraViewPoint>"));
    assert!(visinfo.contains("<FieldOfView>60</FieldOfView>"));
}

#[test]
fn topic_without_viewpoint_has_only_markup() {
    let topic = TopicRecord::from(&bcfkit::Topic::new(
        NonEmptyString::new("Missing railing".to_string()).unwrap(),
        "someone@example.com",
    ));
    let uuid = topic.uuid.clone().unwrap();

    let mut archive = build(&[topic]);
    let mut expected = vec!["bcf.version".to_string(), format!("{uuid}/markup.bcf")];
    expected.sort();
    assert_eq!(archive.names(), expected);

    let markup = archive.text(&format!("{uuid}/markup.bcf"));
    assert!(!markup.contains("<Viewpoints>"));
    assert!(!markup.contains("<ViewPoint "));
}

#[test]
fn adding_a_viewpoint_keeps_the_first_one_intact() {
    let compact = Assembler::new(Config {
        pretty_print: false,
        ..Config::default()
    });
    let mut store = TopicStore::new("someone@example.com");
    let uuid = store.create_topic(draft("Leak in ceiling"), capture(Components::default()));
    let first = store.get(uuid).unwrap().first_viewpoint().unwrap().clone();
    let entry = format!("{uuid}/{}", first.viewpoint_file());

    let before = compact
        .build(&records(&store), &HeaderRecord::default())
        .unwrap();
    let before = Archive::new(before).text(&entry);

    let mut moved = capture(Components::default());
    moved.camera.position = [99.0, 5.0, -3.0];
    store.add_viewpoint(uuid, moved).unwrap();

    let after = compact
        .build(&records(&store), &HeaderRecord::default())
        .unwrap();
    let after = Archive::new(after).text(&entry);

    assert!(after.contains("<CameraViewPoint><X>10</X><Y>3</Y><Z>5</Z></CameraViewPoint>"));
    assert_eq!(after, before);
}

#[test]
fn one_folder_per_topic() {
    let mut store = TopicStore::new("someone@example.com");
    let uuids: Vec<Uuid> = ["One", "Two", "Three"]
        .into_iter()
        .map(|title| store.create_topic(draft(title), capture(Components::default())))
        .collect();

    let archive = build(&records(&store));
    let names = archive.names();

    assert_eq!(names.iter().filter(|n| *n == "bcf.version").count(), 1);
    for uuid in uuids {
        let folder = format!("{uuid}/");
        assert_eq!(names.iter().filter(|n| n.starts_with(&folder)).count(), 3);
        assert!(names.contains(&format!("{folder}markup.bcf")));
    }
}

#[test]
fn comments_keep_their_order() {
    let mut store = TopicStore::new("someone@example.com");
    let uuid = store.create_topic(draft("Leak in ceiling"), capture(Components::default()));
    store
        .add_comment(uuid, Some("first".to_string()), None)
        .unwrap();
    store
        .add_comment(uuid, Some("second".to_string()), None)
        .unwrap();

    let mut archive = build(&records(&store));
    let markup = archive.text(&format!("{uuid}/markup.bcf"));

    let first = markup.find("<Comment>first</Comment>").unwrap();
    let second = markup.find("<Comment>second</Comment>").unwrap();
    assert!(first < second);
}

#[test]
fn field_of_view_must_be_in_range() {
    let mut store = TopicStore::new("someone@example.com");
    store.create_topic(draft("Leak in ceiling"), capture(Components::default()));
    let mut topics = records(&store);

    let with_fov = |topics: &mut Vec<TopicRecord>, fov: f64| {
        topics[0].camera = Some(CameraRecord {
            field_of_view: Some(fov),
            ..topics[0].camera.unwrap_or_default()
        });
    };

    with_fov(&mut topics, 200.0);
    let error = Assembler::default()
        .build(&topics, &HeaderRecord::default())
        .unwrap_err();
    assert_eq!(error.kind(), FailureKind::SchemaViolation);
    assert!(error.to_string().contains("camera.fieldOfView"));

    with_fov(&mut topics, 90.0);
    assert!(
        Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .is_ok()
    );
}

#[test]
fn components_without_guid_are_excluded() {
    let components = Components {
        selection: vec![Selection {
            uuid: Uuid::new_v4(),
            components: vec![Component::new(""), Component::new("1Ryb8XgUj3gebyYvJGdU9n")],
        }],
        coloring: vec![Coloring {
            uuid: Uuid::new_v4(),
            color: "FF0000".parse::<Color>().unwrap(),
            components: vec![Component::new("")],
        }],
        ..Components::default()
    };
    let mut store = TopicStore::new("someone@example.com");
    let uuid = store.create_topic(draft("Leak in ceiling"), capture(components));
    let viewpoint = store.get(uuid).unwrap().first_viewpoint().unwrap().clone();

    let mut archive = build(&records(&store));
    let visinfo = archive.text(&format!("{uuid}/{}", viewpoint.viewpoint_file()));

    assert!(visinfo.contains("IfcGuid=\"1Ryb8XgUj3gebyYvJGdU9n\""));
    assert!(!visinfo.contains("IfcGuid=\"\""));
    assert!(!visinfo.contains("<Coloring>"));
}

#[test]
fn identical_input_gives_identical_archive() {
    let mut store = TopicStore::new("someone@example.com");
    store.create_topic(draft("One"), capture(Components::default()));
    store.create_topic(draft("Two"), capture(Components::default()));
    let topics = records(&store);

    let assembler = Assembler::default();
    let first = assembler.build(&topics, &HeaderRecord::default()).unwrap();
    let second = assembler.build(&topics, &HeaderRecord::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn failing_topic_saves_nothing_and_worker_recovers() {
    let dir = TempDir::new().unwrap();
    let mut store = TopicStore::new("someone@example.com");
    store.create_topic(draft("One"), capture(Components::default()));
    store.create_topic(draft("Two"), capture(Components::default()));

    let mut topics = records(&store);
    topics[1].viewpoints[0].snapshot_image = Some("data:image/png;base64,!!!".to_string());

    let client = Client::new(&Config::default(), DirectorySaver::new(dir.path())).unwrap();
    let error = client
        .create_container_from_records(topics, HeaderRecord::default())
        .unwrap_err();

    let ClientError::Build(failure) = error else {
        panic!("expected a build failure, got {error:?}");
    };
    assert_eq!(failure.kind, FailureKind::InvalidImageData);
    assert_eq!(failure.topic.map(|t| t.position), Some(1));
    assert!(!dir.path().join("presentation.bcf").exists());

    client
        .create_container(store.topics(), &Header::default())
        .unwrap();
    assert!(dir.path().join("presentation.bcf").exists());
}

#[test]
fn removing_a_topic_renumbers_the_rest() {
    let mut store = TopicStore::new("someone@example.com");
    for title in ["One", "Two", "Three"] {
        store.create_topic(draft(title), capture(Components::default()));
    }

    store.remove_topic(1).unwrap();

    let indices: Vec<_> = store.topics().iter().map(bcfkit::Topic::index).collect();
    let titles: Vec<_> = store.topics().iter().map(bcfkit::Topic::title).collect();
    assert_eq!(indices, [0, 1]);
    assert_eq!(titles, ["One", "Three"]);
}
