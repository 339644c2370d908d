use std::{
    collections::HashSet,
    io::{Cursor, Write},
};

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use uuid::Uuid;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use super::{AssemblyError, TopicError, TopicRef, snapshot};
use crate::{
    domain::{CameraState, Compression, Config, Header, Topic},
    schema::{HeaderRecord, TopicRecord, Validate},
    xml::{self, Options, visinfo::Visinfo},
};

/// Builds BCF containers from candidate records.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: Config,
}

/// One topic folder, ready to be written to the archive.
struct RenderedTopic {
    uuid: Uuid,
    markup: Vec<u8>,
    viewpoint: Option<RenderedViewpoint>,
}

struct RenderedViewpoint {
    visinfo_name: String,
    visinfo: Vec<u8>,
    snapshot_name: String,
    snapshot: Vec<u8>,
}

impl Assembler {
    /// An assembler writing containers as `config` describes.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Builds a container from `topics` and the project `header`.
    ///
    /// Topics are rendered in parallel, but the archive lists them in input
    /// order and is byte-identical for identical input.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid topic, in input order, or if the header is
    /// invalid, two topics share a uuid, or the archive cannot be written.
    /// No partial archive is returned.
    #[instrument(skip_all, fields(topics = topics.len()))]
    pub fn build(
        &self,
        topics: &[TopicRecord],
        header: &HeaderRecord,
    ) -> Result<Vec<u8>, AssemblyError> {
        let header = header.validate().map_err(AssemblyError::Header)?;
        let options = Options::from(&self.config);

        let rendered = topics
            .par_iter()
            .enumerate()
            .map(|(position, record)| {
                render_topic(record, &header, options).map_err(|source| {
                    AssemblyError::topic_error(
                        TopicRef {
                            position,
                            uuid: record.uuid.clone(),
                        },
                        source,
                    )
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(rendered.len());
        for topic in &rendered {
            if !seen.insert(topic.uuid) {
                return Err(AssemblyError::DuplicateTopic(topic.uuid));
            }
        }

        let archive = self.write_archive(&rendered, options)?;
        tracing::info!(
            topics = rendered.len(),
            bytes = archive.len(),
            "built container"
        );
        Ok(archive)
    }

    fn file_options(&self) -> SimpleFileOptions {
        let method = match self.config.compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };
        // A fixed timestamp keeps the output reproducible.
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(zip::DateTime::default())
    }

    fn write_archive(
        &self,
        topics: &[RenderedTopic],
        options: Options,
    ) -> Result<Vec<u8>, AssemblyError> {
        let file_options = self.file_options();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for topic in topics {
            let folder = topic.uuid;
            zip.start_file(format!("{folder}/{}", xml::markup::FILE_NAME), file_options)?;
            zip.write_all(&topic.markup)?;

            if let Some(viewpoint) = &topic.viewpoint {
                zip.start_file(format!("{folder}/{}", viewpoint.visinfo_name), file_options)?;
                zip.write_all(&viewpoint.visinfo)?;
                zip.start_file(format!("{folder}/{}", viewpoint.snapshot_name), file_options)?;
                zip.write_all(&viewpoint.snapshot)?;
            }
        }

        let version = xml::version::build(options).map_err(AssemblyError::Version)?;
        zip.start_file(xml::version::FILE_NAME, file_options)?;
        zip.write_all(&version)?;

        Ok(zip.finish()?.into_inner())
    }
}

fn render_topic(
    record: &TopicRecord,
    header: &Header,
    options: Options,
) -> Result<RenderedTopic, TopicError> {
    let topic = record.validate()?;
    let markup = xml::markup::build(&topic, header, options)?;
    let viewpoint = render_viewpoint(&topic, options)?;

    tracing::debug!(uuid = %topic.uuid(), "rendered topic");
    Ok(RenderedTopic {
        uuid: topic.uuid(),
        markup,
        viewpoint,
    })
}

/// Renders the first viewpoint, the only one the markup refers to. Its own
/// camera wins over the topic's.
fn render_viewpoint(
    topic: &Topic,
    options: Options,
) -> Result<Option<RenderedViewpoint>, TopicError> {
    let Some(viewpoint) = topic.first_viewpoint() else {
        return Ok(None);
    };

    let snapshot = snapshot::decode(viewpoint.snapshot_image())?;
    let camera = viewpoint
        .camera()
        .or_else(|| topic.camera())
        .map(CameraState::to_bcf)
        .transpose()?;
    let visinfo = xml::visinfo::build(
        &Visinfo {
            viewpoint,
            components: topic.components().first(),
            camera: camera.as_ref(),
        },
        options,
    )?;

    Ok(Some(RenderedViewpoint {
        visinfo_name: viewpoint.viewpoint_file().to_string(),
        visinfo,
        snapshot_name: viewpoint.snapshot_file().to_string(),
        snapshot: snapshot.bytes,
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;
    use crate::{
        container::FailureKind,
        schema::{
            CameraRecord, CommentRecord, ComponentsRecord, ViewpointRecord, ViolationKind,
            VisibilityRecord,
        },
    };

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn record(uuid: &str, title: &str) -> TopicRecord {
        TopicRecord {
            uuid: Some(uuid.into()),
            index: Some(0),
            title: Some(title.into()),
            creation_date: Some("2024-03-01T09:30:00Z".into()),
            creation_author: Some("someone@example.com".into()),
            ..TopicRecord::default()
        }
    }

    fn with_viewpoint(mut record: TopicRecord, viewpoint: &str) -> TopicRecord {
        record.viewpoints.push(ViewpointRecord {
            uuid: Some(viewpoint.into()),
            viewpoint: Some(format!("{viewpoint}.bcfv")),
            snapshot: Some(format!("{viewpoint}.png")),
            snapshot_image: Some(PIXEL.into()),
            index: Some(0),
            camera: None,
        });
        record.components.push(ComponentsRecord {
            uuid: Some(COMPONENTS.into()),
            visibility: Some(VisibilityRecord {
                default_visibility: Some(true),
                ..VisibilityRecord::default()
            }),
            ..ComponentsRecord::default()
        });
        record.camera = Some(CameraRecord {
            position: Some([0.0, 1.0, 2.0]),
            target: Some([0.0, 0.0, 0.0]),
            direction: Some([0.0, 0.0, -1.0]),
            field_of_view: Some(60.0),
            aspect_ratio: Some(1.5),
        });
        record
    }

    const TOPIC_A: &str = "8f2b7c1e-3d4a-4b5c-9e6f-7a8b9c0d1e2f";
    const TOPIC_B: &str = "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d";
    const VIEWPOINT: &str = "0c1d2e3f-4a5b-4c6d-8e7f-9a0b1c2d3e4f";
    const COMPONENTS: &str = "5e1c7f0a-1d8c-4b4e-9f1e-3b7a9c2d4e6f";

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        zip.file_names().map(ToString::to_string).collect()
    }

    #[test]
    fn writes_one_folder_per_topic_and_version_last() {
        let topics = [
            with_viewpoint(record(TOPIC_A, "Leak in ceiling"), VIEWPOINT),
            record(TOPIC_B, "Missing railing"),
        ];
        let archive = Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .unwrap();

        let mut names = entry_names(&archive);
        names.sort();
        let mut expected = vec![
            format!("{TOPIC_A}/markup.bcf"),
            format!("{TOPIC_A}/{VIEWPOINT}.bcfv"),
            format!("{TOPIC_A}/{VIEWPOINT}.png"),
            format!("{TOPIC_B}/markup.bcf"),
            "bcf.version".to_string(),
        ];
        expected.sort();
        assert_eq!(names, expected);

        let mut zip = ZipArchive::new(Cursor::new(archive.as_slice())).unwrap();
        let last = zip.len() - 1;
        assert_eq!(zip.by_index(last).unwrap().name(), "bcf.version");
    }

    #[test]
    fn snapshot_bytes_are_decoded() {
        let topics = [with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT)];
        let archive = Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut png = Vec::new();
        zip.by_name(&format!("{TOPIC_A}/{VIEWPOINT}.png"))
            .unwrap()
            .read_to_end(&mut png)
            .unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn output_is_reproducible() {
        let topics = [
            with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT),
            record(TOPIC_B, "Railing"),
        ];
        let assembler = Assembler::default();
        let first = assembler.build(&topics, &HeaderRecord::default()).unwrap();
        let second = assembler.build(&topics, &HeaderRecord::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stored_archives_are_larger() {
        let topics = [record(TOPIC_A, "Leak")];
        let deflated = Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .unwrap();
        let stored = Assembler::new(Config {
            compression: Compression::Stored,
            ..Config::default()
        })
        .build(&topics, &HeaderRecord::default())
        .unwrap();

        assert!(stored.len() > deflated.len());
    }

    #[test]
    fn first_failing_topic_is_reported() {
        let mut bad_comment = record(TOPIC_B, "Railing");
        bad_comment.comments.push(CommentRecord {
            uuid: Some(VIEWPOINT.into()),
            date: Some("2024-03-01T10:00:00Z".into()),
            author: Some("someone@example.com".into()),
            ..CommentRecord::default()
        });
        let topics = [record(TOPIC_A, "Leak"), bad_comment, record("nope", "x")];

        let error = Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .unwrap_err();

        assert_eq!(error.topic().map(|t| t.position), Some(1));
        assert!(error.is_violation(&ViolationKind::EmptyComment));
    }

    #[test]
    fn viewpoint_without_camera_is_missing_section() {
        let mut topic = with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT);
        topic.camera = None;

        let error = Assembler::default()
            .build(&[topic], &HeaderRecord::default())
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::MissingRequiredSection);
    }

    #[test]
    fn empty_snapshot_is_invalid_image() {
        let mut topic = with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT);
        topic.viewpoints[0].snapshot_image = Some(String::new());

        let error = Assembler::default()
            .build(&[topic], &HeaderRecord::default())
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::InvalidImageData);
    }

    #[test]
    fn duplicate_topics_are_rejected() {
        let topics = [record(TOPIC_A, "Leak"), record(TOPIC_A, "Leak again")];
        let error = Assembler::default()
            .build(&topics, &HeaderRecord::default())
            .unwrap_err();
        assert!(matches!(error, AssemblyError::DuplicateTopic(uuid) if uuid.to_string() == TOPIC_A));
    }

    #[test]
    fn invalid_header_fails_the_build() {
        let header = HeaderRecord {
            ifc_project: Some("not an id".into()),
            ..HeaderRecord::default()
        };
        let error = Assembler::default()
            .build(&[record(TOPIC_A, "Leak")], &header)
            .unwrap_err();
        assert!(matches!(error, AssemblyError::Header(_)));
    }

    #[test]
    fn empty_request_holds_only_version() {
        let archive = Assembler::default()
            .build(&[], &HeaderRecord::default())
            .unwrap();
        assert_eq!(entry_names(&archive), ["bcf.version"]);
    }

    fn visinfo(archive: Vec<u8>) -> String {
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut text = String::new();
        zip.by_name(&format!("{TOPIC_A}/{VIEWPOINT}.bcfv"))
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn viewpoint_camera_wins_over_topic_camera() {
        let compact = Assembler::new(Config {
            pretty_print: false,
            ..Config::default()
        });
        let mut topic = with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT);

        let from_topic = compact
            .build(&[topic.clone()], &HeaderRecord::default())
            .unwrap();
        assert!(
            visinfo(from_topic)
                .contains("<CameraViewPoint><X>0</X><Y>-2</Y><Z>1</Z></CameraViewPoint>")
        );

        topic.viewpoints[0].camera = topic.camera.map(|camera| CameraRecord {
            position: Some([7.0, 0.0, -4.0]),
            ..camera
        });
        let own = compact.build(&[topic], &HeaderRecord::default()).unwrap();
        assert!(
            visinfo(own).contains("<CameraViewPoint><X>7</X><Y>4</Y><Z>0</Z></CameraViewPoint>")
        );
    }

    #[test]
    fn file_names_outside_topic_folder_are_rejected() {
        let mut topic = with_viewpoint(record(TOPIC_A, "Leak"), VIEWPOINT);
        topic.viewpoints[0].viewpoint = Some("../../evil.bcfv".into());

        let error = Assembler::default()
            .build(&[topic], &HeaderRecord::default())
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::SchemaViolation);
        assert!(error.is_violation(&ViolationKind::InvalidFileName("../../evil.bcfv".into())));
    }
}
