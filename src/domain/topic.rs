use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CameraState, Comment, Components, Viewpoint};

/// A BCF date-time.
///
/// The offset given in the source is kept; values without an offset are
/// interpreted as UTC.
pub type Timestamp = DateTime<FixedOffset>;

/// Formats a timestamp the way it is written into BCF documents.
#[must_use]
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn now() -> Timestamp {
    Utc::now().fixed_offset()
}

/// Who did something, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// When it happened.
    pub date: Timestamp,
    /// Who did it. Free-form, usually an email address.
    pub author: String,
}

impl Stamp {
    /// A stamp for `author` at the current time.
    #[must_use]
    pub fn now(author: impl Into<String>) -> Self {
        Self {
            date: now(),
            author: author.into(),
        }
    }
}

/// The type of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopicType {
    /// Something is wrong.
    #[default]
    Error,
    /// Something may be wrong.
    Warning,
    /// Informational.
    Info,
    /// Not classified.
    Unknown,
}

impl TopicType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 4] = [Self::Error, Self::Warning, Self::Info, Self::Unknown];

    /// The value written to the `TopicType` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
            Self::Unknown => "Unknown",
        }
    }
}

/// The status of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopicStatus {
    /// Needs attention.
    #[default]
    Open,
    /// Resolved.
    Closed,
}

impl TopicStatus {
    /// All variants, in declaration order.
    pub const ALL: [Self; 2] = [Self::Open, Self::Closed];

    /// The value written to the `TopicStatus` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issue.
///
/// A topic owns its comments (in chronological order), its viewpoints
/// (append-only) and one component visualisation snapshot per viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub(crate) uuid: Uuid,
    /// Sort order. Deprecated in BCF 3.0, but still written.
    pub(crate) index: usize,
    pub(crate) title: NonEmptyString,
    pub(crate) description: Option<String>,
    pub(crate) creation: Stamp,
    pub(crate) modified: Stamp,
    pub(crate) topic_type: TopicType,
    pub(crate) topic_status: TopicStatus,
    pub(crate) due_date: Option<Timestamp>,
    pub(crate) assigned_to: Option<String>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) viewpoints: Vec<Viewpoint>,
    pub(crate) components: Vec<Components>,
    pub(crate) camera: Option<CameraState>,
}

impl Topic {
    /// Creates a topic with a fresh UUID, created and last modified by
    /// `author` now.
    #[must_use]
    pub fn new(title: NonEmptyString, author: impl Into<String>) -> Self {
        let creation = Stamp::now(author);
        Self {
            uuid: Uuid::new_v4(),
            index: 0,
            title,
            description: None,
            modified: creation.clone(),
            creation,
            topic_type: TopicType::default(),
            topic_status: TopicStatus::default(),
            due_date: None,
            assigned_to: None,
            comments: Vec::new(),
            viewpoints: Vec::new(),
            components: Vec::new(),
            camera: None,
        }
    }

    /// The topic's unique, stable identifier.
    ///
    /// This is also the name of the topic's folder in the container.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Sort order within the owning collection.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// When, and by whom, the topic was created.
    #[must_use]
    pub const fn creation(&self) -> &Stamp {
        &self.creation
    }

    /// When, and by whom, the topic was last modified.
    #[must_use]
    pub const fn modified(&self) -> &Stamp {
        &self.modified
    }

    /// The topic type.
    #[must_use]
    pub const fn topic_type(&self) -> TopicType {
        self.topic_type
    }

    /// The topic status.
    #[must_use]
    pub const fn topic_status(&self) -> TopicStatus {
        self.topic_status
    }

    /// When the issue needs to be resolved by.
    #[must_use]
    pub const fn due_date(&self) -> Option<&Timestamp> {
        self.due_date.as_ref()
    }

    /// Who the topic is assigned to, usually a comma-separated email list.
    #[must_use]
    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    /// Comments, oldest first.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Viewpoints, in the order they were added.
    #[must_use]
    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// The viewpoint written to the container, if any.
    #[must_use]
    pub fn first_viewpoint(&self) -> Option<&Viewpoint> {
        self.viewpoints.first()
    }

    /// Component visualisation snapshots, one per viewpoint.
    #[must_use]
    pub fn components(&self) -> &[Components] {
        &self.components
    }

    /// The captured camera in viewer space.
    #[must_use]
    pub const fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }

    /// Sets the description. An empty string clears it.
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
    }

    /// Sets the captured camera.
    pub const fn set_camera(&mut self, camera: CameraState) {
        self.camera = Some(camera);
    }

    /// Appends a viewpoint together with its component snapshot.
    ///
    /// Existing viewpoints are never modified; a changed visualisation is a
    /// new viewpoint.
    pub fn push_viewpoint(&mut self, mut viewpoint: Viewpoint, components: Components) {
        viewpoint.index = self.viewpoints.len();
        self.viewpoints.push(viewpoint);
        self.components.push(components);
    }

    /// Records a modification by the last modifying author.
    pub(crate) fn touch(&mut self) {
        self.modified.date = now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    #[test]
    fn new_topic_is_open_error_with_matching_stamps() {
        let topic = Topic::new(title("Leak in ceiling"), "someone@example.com");

        assert_eq!(topic.title(), "Leak in ceiling");
        assert_eq!(topic.topic_status(), TopicStatus::Open);
        assert_eq!(topic.topic_type(), TopicType::Error);
        assert_eq!(topic.creation(), topic.modified());
        assert!(topic.viewpoints().is_empty());
        assert!(topic.first_viewpoint().is_none());
    }

    #[test]
    fn empty_description_is_cleared() {
        let mut topic = Topic::new(title("t"), "a");
        topic.set_description("water on floor");
        assert_eq!(topic.description(), Some("water on floor"));

        topic.set_description("");
        assert_eq!(topic.description(), None);
    }

    #[test]
    fn viewpoints_are_appended_with_sequential_index() {
        let mut topic = Topic::new(title("t"), "a");
        topic.push_viewpoint(Viewpoint::new("data:image/png;base64,AA=="), Components::default());
        topic.push_viewpoint(Viewpoint::new("data:image/png;base64,AA=="), Components::default());

        let indices: Vec<_> = topic.viewpoints().iter().map(Viewpoint::index).collect();
        assert_eq!(indices, [0, 1]);
        assert_eq!(topic.components().len(), 2);
    }

    #[test]
    fn utc_timestamps_use_zulu_suffix() {
        let date = DateTime::parse_from_rfc3339("2023-07-03T21:02:50+00:00").unwrap();
        assert_eq!(format_timestamp(&date), "2023-07-03T21:02:50Z");

        let date = DateTime::parse_from_rfc3339("2023-07-03T21:02:50+02:00").unwrap();
        assert_eq!(format_timestamp(&date), "2023-07-03T21:02:50+02:00");
    }
}
