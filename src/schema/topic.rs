use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use super::{
    ComponentsRecord, SchemaViolation, Validate, ViolationKind,
    violation::{
        check_range, file_name, optional_date, optional_str, parse_date, parse_index, parse_uuid,
        required, required_str,
    },
};
use crate::{
    domain::{
        CameraState, Comment, Stamp, Topic, TopicStatus, TopicType, Vector3, Viewpoint,
        topic::format_timestamp,
    },
    xml::markup,
};

/// Accepted vertical field of view, in degrees.
pub const FIELD_OF_VIEW_RANGE: (f64, f64) = (1.0, 140.0);

/// Accepted viewport aspect ratio.
pub const ASPECT_RATIO_RANGE: (f64, f64) = (0.1, 4.0);

/// A candidate topic, as exchanged with the worker and read from topic files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TopicRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default)]
    pub viewpoints: Vec<ViewpointRecord>,
    #[serde(default)]
    pub components: Vec<ComponentsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraRecord>,
}

/// A candidate comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CommentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_author: Option<String>,
}

/// A candidate viewpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ViewpointRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Filename of the `.bcfv` document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewpoint: Option<String>,
    /// Filename of the snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    /// The snapshot as a base64 data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// The camera the snapshot was taken with. Falls back to the topic's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraRecord>,
}

/// A candidate camera in viewer space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CameraRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_view: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
}

fn parse_variant<T: Copy>(
    value: &str,
    all: &[T],
    as_str: fn(T) -> &'static str,
    field: &str,
) -> Result<T, SchemaViolation> {
    all.iter()
        .copied()
        .find(|variant| as_str(*variant) == value)
        .ok_or_else(|| {
            SchemaViolation::new(
                field,
                ViolationKind::UnknownVariant {
                    value: value.to_string(),
                    expected: all
                        .iter()
                        .map(|variant| as_str(*variant))
                        .collect::<Vec<_>>()
                        .join(", "),
                },
            )
        })
}

impl Validate for TopicRecord {
    type Output = Topic;

    fn validate(&self) -> Result<Topic, SchemaViolation> {
        let uuid = parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?;
        let index = parse_index(*required(self.index.as_ref(), "index")?, "index")?;
        let title = required_str(self.title.as_ref(), "title")?;
        let title = NonEmptyString::new(title.to_string())
            .map_err(|_| SchemaViolation::new("title", ViolationKind::Empty))?;

        let creation = Stamp {
            date: parse_date(
                required_str(self.creation_date.as_ref(), "creationDate")?,
                "creationDate",
            )?,
            author: required_str(self.creation_author.as_ref(), "creationAuthor")?.to_string(),
        };
        // An unmodified topic is last modified at its creation.
        let modified = Stamp {
            date: optional_date(self.modified_date.as_ref(), "modifiedDate")?
                .unwrap_or(creation.date),
            author: optional_str(self.modified_author.as_ref())
                .unwrap_or_else(|| creation.author.clone()),
        };

        let topic_type = optional_str(self.topic_type.as_ref())
            .map(|s| parse_variant(&s, &TopicType::ALL, TopicType::as_str, "topicType"))
            .transpose()?
            .unwrap_or_default();
        let topic_status = optional_str(self.topic_status.as_ref())
            .map(|s| parse_variant(&s, &TopicStatus::ALL, TopicStatus::as_str, "topicStatus"))
            .transpose()?
            .unwrap_or_default();

        let comments = self
            .comments
            .iter()
            .enumerate()
            .map(|(i, comment)| {
                comment
                    .validate()
                    .map_err(|e| e.nested(&format!("comments[{i}]")))
            })
            .collect::<Result<_, _>>()?;

        let viewpoints = self
            .viewpoints
            .iter()
            .enumerate()
            .map(|(i, viewpoint)| {
                viewpoint
                    .validate_at(i)
                    .map_err(|e| e.nested(&format!("viewpoints[{i}]")))
            })
            .collect::<Result<_, _>>()?;

        let components = self
            .components
            .iter()
            .enumerate()
            .map(|(i, components)| {
                components
                    .validate()
                    .map_err(|e| e.nested(&format!("components[{i}]")))
            })
            .collect::<Result<_, _>>()?;

        let camera = self
            .camera
            .as_ref()
            .map(|camera| camera.validate().map_err(|e| e.nested("camera")))
            .transpose()?;

        Ok(Topic {
            uuid,
            index,
            title,
            description: optional_str(self.description.as_ref()),
            creation,
            modified,
            topic_type,
            topic_status,
            due_date: optional_date(self.due_date.as_ref(), "dueDate")?,
            assigned_to: optional_str(self.assigned_to.as_ref()),
            comments,
            viewpoints,
            components,
            camera,
        })
    }
}

impl Validate for CommentRecord {
    type Output = Comment;

    fn validate(&self) -> Result<Comment, SchemaViolation> {
        let uuid = parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?;
        let date = parse_date(required_str(self.date.as_ref(), "date")?, "date")?;
        let author = required_str(self.author.as_ref(), "author")?.to_string();
        let comment = optional_str(self.comment.as_ref());
        let viewpoint = optional_str(self.viewpoint.as_ref())
            .map(|s| parse_uuid(&s, "viewpoint"))
            .transpose()?;

        if comment.is_none() && viewpoint.is_none() {
            return Err(SchemaViolation::new("", ViolationKind::EmptyComment));
        }

        Ok(Comment {
            uuid,
            date,
            author,
            comment,
            viewpoint,
            modified_date: optional_date(self.modified_date.as_ref(), "modifiedDate")?,
            modified_author: optional_str(self.modified_author.as_ref()),
        })
    }
}

impl ViewpointRecord {
    /// Validates a viewpoint found at `position` in its topic. A missing
    /// index defaults to the position.
    fn validate_at(&self, position: usize) -> Result<Viewpoint, SchemaViolation> {
        let uuid = parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?;
        let viewpoint =
            file_name(self.viewpoint.as_ref(), markup::FILE_NAME, "viewpoint")?.to_string();
        let snapshot =
            file_name(self.snapshot.as_ref(), markup::FILE_NAME, "snapshot")?.to_string();
        if viewpoint == snapshot {
            return Err(SchemaViolation::new(
                "snapshot",
                ViolationKind::InvalidFileName(snapshot),
            ));
        }
        // An empty image is caught when the snapshot is decoded.
        let snapshot_image = required(self.snapshot_image.as_ref(), "snapshotImage")?.clone();
        let index = self
            .index
            .map_or(Ok(position), |value| parse_index(value, "index"))?;
        let camera = self
            .camera
            .as_ref()
            .map(|camera| camera.validate().map_err(|e| e.nested("camera")))
            .transpose()?;

        Ok(Viewpoint {
            uuid,
            viewpoint,
            snapshot,
            snapshot_image,
            index,
            camera,
        })
    }
}

impl Validate for ViewpointRecord {
    type Output = Viewpoint;

    fn validate(&self) -> Result<Viewpoint, SchemaViolation> {
        self.validate_at(0)
    }
}

impl Validate for CameraRecord {
    type Output = CameraState;

    fn validate(&self) -> Result<CameraState, SchemaViolation> {
        let vector = |value: Option<&Vector3>, field: &str| {
            let v = *required(value, field)?;
            if v.iter().all(|c| c.is_finite()) {
                Ok(v)
            } else {
                Err(SchemaViolation::new(field, ViolationKind::NotFinite))
            }
        };
        let (fov_min, fov_max) = FIELD_OF_VIEW_RANGE;
        let (aspect_min, aspect_max) = ASPECT_RATIO_RANGE;

        Ok(CameraState {
            position: vector(self.position.as_ref(), "position")?,
            target: vector(self.target.as_ref(), "target")?,
            direction: vector(self.direction.as_ref(), "direction")?,
            field_of_view: check_range(
                *required(self.field_of_view.as_ref(), "fieldOfView")?,
                fov_min,
                fov_max,
                "fieldOfView",
            )?,
            aspect_ratio: check_range(
                *required(self.aspect_ratio.as_ref(), "aspectRatio")?,
                aspect_min,
                aspect_max,
                "aspectRatio",
            )?,
        })
    }
}

impl From<&Topic> for TopicRecord {
    fn from(topic: &Topic) -> Self {
        Self {
            uuid: Some(topic.uuid.to_string()),
            index: i64::try_from(topic.index).ok(),
            title: Some(topic.title.as_str().to_owned()),
            description: topic.description.clone(),
            creation_date: Some(format_timestamp(&topic.creation.date)),
            creation_author: Some(topic.creation.author.clone()),
            modified_date: Some(format_timestamp(&topic.modified.date)),
            modified_author: Some(topic.modified.author.clone()),
            topic_type: Some(topic.topic_type.to_string()),
            topic_status: Some(topic.topic_status.to_string()),
            due_date: topic.due_date.as_ref().map(format_timestamp),
            assigned_to: topic.assigned_to.clone(),
            comments: topic.comments.iter().map(CommentRecord::from).collect(),
            viewpoints: topic.viewpoints.iter().map(ViewpointRecord::from).collect(),
            components: topic.components.iter().map(ComponentsRecord::from).collect(),
            camera: topic.camera.as_ref().map(CameraRecord::from),
        }
    }
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        Self {
            uuid: Some(comment.uuid.to_string()),
            date: Some(format_timestamp(&comment.date)),
            author: Some(comment.author.clone()),
            comment: comment.comment.clone(),
            viewpoint: comment.viewpoint.map(|uuid| uuid.to_string()),
            modified_date: comment.modified_date.as_ref().map(format_timestamp),
            modified_author: comment.modified_author.clone(),
        }
    }
}

impl From<&Viewpoint> for ViewpointRecord {
    fn from(viewpoint: &Viewpoint) -> Self {
        Self {
            uuid: Some(viewpoint.uuid.to_string()),
            viewpoint: Some(viewpoint.viewpoint.clone()),
            snapshot: Some(viewpoint.snapshot.clone()),
            snapshot_image: Some(viewpoint.snapshot_image.clone()),
            index: i64::try_from(viewpoint.index).ok(),
            camera: viewpoint.camera.as_ref().map(CameraRecord::from),
        }
    }
}

impl From<&CameraState> for CameraRecord {
    fn from(camera: &CameraState) -> Self {
        Self {
            position: Some(camera.position),
            target: Some(camera.target),
            direction: Some(camera.direction),
            field_of_view: Some(camera.field_of_view),
            aspect_ratio: Some(camera.aspect_ratio),
        }
    }
}
