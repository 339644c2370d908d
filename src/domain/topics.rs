use non_empty_string::NonEmptyString;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    CameraState, Comment, Components, EmptyComment, Stamp, Timestamp, Topic, TopicStatus,
    TopicType, Viewpoint,
};

/// The fields a user fills in when creating a topic.
#[derive(Debug, Clone)]
pub struct TopicDraft {
    /// The title.
    pub title: NonEmptyString,
    /// The description. Empty means none.
    pub description: String,
    /// The topic type.
    pub topic_type: TopicType,
    /// The topic status.
    pub topic_status: TopicStatus,
    /// When the issue needs to be resolved by.
    pub due_date: Option<Timestamp>,
    /// Who the topic is assigned to.
    pub assigned_to: Option<String>,
}

impl TopicDraft {
    /// A draft with the given title and default everything else.
    #[must_use]
    pub fn new(title: NonEmptyString) -> Self {
        Self {
            title,
            description: String::new(),
            topic_type: TopicType::default(),
            topic_status: TopicStatus::default(),
            due_date: None,
            assigned_to: None,
        }
    }
}

/// What the viewer captured at the moment a viewpoint was taken.
#[derive(Debug, Clone)]
pub struct ViewpointCapture {
    /// The camera, in viewer space.
    pub camera: CameraState,
    /// The screenshot as a base64 data URL.
    pub snapshot_image: String,
    /// The element selection, visibility and colouring.
    pub components: Components,
}

/// A change to one scalar field of a topic.
#[derive(Debug, Clone)]
pub enum TopicUpdate {
    /// Replace the title.
    Title(NonEmptyString),
    /// Replace the description. Empty clears it.
    Description(String),
    /// Change the status.
    Status(TopicStatus),
    /// Change the type.
    Type(TopicType),
    /// Set or clear the due date.
    DueDate(Option<Timestamp>),
    /// Set or clear the assignee.
    AssignedTo(Option<String>),
}

/// Errors from [`TopicStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No topic has the given uuid.
    #[error("topic not found: {0}")]
    TopicNotFound(Uuid),

    /// The topic has no comment with the given uuid.
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),

    /// An index is past the end of the collection.
    #[error("index {index} is out of bounds for {len} topics")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of topics.
        len: usize,
    },

    /// A comment would have neither text nor a viewpoint.
    #[error(transparent)]
    EmptyComment(#[from] EmptyComment),
}

/// The mutable collection of topics owned by the foreground.
///
/// Topic indices always form the sequence `0..len`, in storage order.
#[derive(Debug, Clone)]
pub struct TopicStore {
    topics: Vec<Topic>,
    selected: Option<Uuid>,
    author: String,
}

impl TopicStore {
    /// An empty collection. New topics and comments are attributed to
    /// `author`.
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            topics: Vec::new(),
            selected: None,
            author: author.into(),
        }
    }

    /// The author new topics and comments are attributed to.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// All topics, ordered by index.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// The number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether there are no topics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Look up a topic by uuid.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.uuid == uuid)
    }

    fn get_mut(&mut self, uuid: Uuid) -> Result<&mut Topic, StoreError> {
        self.topics
            .iter_mut()
            .find(|topic| topic.uuid == uuid)
            .ok_or(StoreError::TopicNotFound(uuid))
    }

    /// Creates a topic at the end of the collection.
    ///
    /// The topic gets a first viewpoint built from the capture, and becomes
    /// the selected topic. Returns its uuid.
    #[instrument(skip(self, capture))]
    pub fn create_topic(&mut self, draft: TopicDraft, capture: ViewpointCapture) -> Uuid {
        let mut topic = Topic::new(draft.title, self.author.clone());
        topic.index = self.topics.len();
        topic.set_description(draft.description);
        topic.topic_type = draft.topic_type;
        topic.topic_status = draft.topic_status;
        topic.due_date = draft.due_date;
        topic.assigned_to = draft.assigned_to.filter(|s| !s.is_empty());
        topic.set_camera(capture.camera);
        topic.push_viewpoint(
            Viewpoint::new(capture.snapshot_image).with_camera(capture.camera),
            capture.components,
        );

        let uuid = topic.uuid;
        tracing::debug!(%uuid, index = topic.index, "created topic");
        self.topics.push(topic);
        self.selected = Some(uuid);
        uuid
    }

    /// Removes the topic at `index` and renumbers every later topic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfBounds`] if there is no such topic.
    pub fn remove_topic(&mut self, index: usize) -> Result<Topic, StoreError> {
        let len = self.topics.len();
        let position = self
            .topics
            .iter()
            .position(|topic| topic.index == index)
            .ok_or(StoreError::IndexOutOfBounds { index, len })?;

        let removed = self.topics.remove(position);
        for topic in &mut self.topics {
            if topic.index > index {
                topic.index -= 1;
            }
        }

        if self.selected == Some(removed.uuid) {
            self.selected = None;
        }
        Ok(removed)
    }

    /// Moves the topic at `old_index` to `new_index`, shifting the topics in
    /// between by one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfBounds`] if either index is past the
    /// end of the collection.
    pub fn move_topic(&mut self, old_index: usize, new_index: usize) -> Result<(), StoreError> {
        let len = self.topics.len();
        for index in [old_index, new_index] {
            if index >= len {
                return Err(StoreError::IndexOutOfBounds { index, len });
            }
        }

        for topic in &mut self.topics {
            topic.index = if topic.index == old_index {
                new_index
            } else if old_index < new_index && (old_index + 1..=new_index).contains(&topic.index) {
                topic.index - 1
            } else if new_index < old_index && (new_index..old_index).contains(&topic.index) {
                topic.index + 1
            } else {
                topic.index
            };
        }
        self.topics.sort_by_key(|topic| topic.index);
        Ok(())
    }

    /// Changes one field of a topic and bumps its modified date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TopicNotFound`] if there is no such topic.
    pub fn update_topic(&mut self, uuid: Uuid, update: TopicUpdate) -> Result<(), StoreError> {
        let topic = self.get_mut(uuid)?;
        match update {
            TopicUpdate::Title(title) => topic.title = title,
            TopicUpdate::Description(description) => topic.set_description(description),
            TopicUpdate::Status(status) => topic.topic_status = status,
            TopicUpdate::Type(topic_type) => topic.topic_type = topic_type,
            TopicUpdate::DueDate(due_date) => topic.due_date = due_date,
            TopicUpdate::AssignedTo(assigned_to) => {
                topic.assigned_to = assigned_to.filter(|s| !s.is_empty());
            }
        }
        topic.touch();
        Ok(())
    }

    /// Appends a comment to a topic. Returns the comment's uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such topic, or if the comment has
    /// neither text nor a viewpoint reference.
    pub fn add_comment(
        &mut self,
        topic: Uuid,
        text: Option<String>,
        viewpoint: Option<Uuid>,
    ) -> Result<Uuid, StoreError> {
        let comment = Comment::new(self.author.clone(), text, viewpoint)?;
        let uuid = comment.uuid;
        let topic = self.get_mut(topic)?;
        topic.comments.push(comment);
        topic.touch();
        Ok(uuid)
    }

    /// Replaces a comment's text, stamping the comment's modified date and
    /// author.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic or comment does not exist, or if the
    /// edit would leave the comment empty.
    pub fn update_comment(
        &mut self,
        topic: Uuid,
        comment: Uuid,
        text: String,
    ) -> Result<(), StoreError> {
        let edit = Stamp::now(self.author.clone());
        let topic = self.get_mut(topic)?;
        topic
            .comments
            .iter_mut()
            .find(|c| c.uuid == comment)
            .ok_or(StoreError::CommentNotFound(comment))?
            .edit(text, edit)?;
        topic.touch();
        Ok(())
    }

    /// Removes a comment from a topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic or comment does not exist.
    pub fn remove_comment(&mut self, topic: Uuid, comment: Uuid) -> Result<Comment, StoreError> {
        let topic = self.get_mut(topic)?;
        let position = topic
            .comments
            .iter()
            .position(|c| c.uuid == comment)
            .ok_or(StoreError::CommentNotFound(comment))?;
        let removed = topic.comments.remove(position);
        topic.touch();
        Ok(removed)
    }

    /// Appends a new viewpoint to a topic. Returns the viewpoint's uuid.
    ///
    /// The capture's camera stays with the new viewpoint. Existing viewpoints
    /// and the topic's camera are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TopicNotFound`] if there is no such topic.
    pub fn add_viewpoint(
        &mut self,
        topic: Uuid,
        capture: ViewpointCapture,
    ) -> Result<Uuid, StoreError> {
        let topic = self.get_mut(topic)?;
        let viewpoint = Viewpoint::new(capture.snapshot_image).with_camera(capture.camera);
        let uuid = viewpoint.uuid;
        topic.push_viewpoint(viewpoint, capture.components);
        topic.touch();
        Ok(uuid)
    }

    /// Selects a topic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TopicNotFound`] if there is no such topic.
    pub fn select(&mut self, uuid: Uuid) -> Result<(), StoreError> {
        if self.get(uuid).is_none() {
            return Err(StoreError::TopicNotFound(uuid));
        }
        self.selected = Some(uuid);
        Ok(())
    }

    /// Clears the selection.
    pub const fn deselect(&mut self) {
        self.selected = None;
    }

    /// The selected topic, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Topic> {
        self.selected.and_then(|uuid| self.get(uuid))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn capture() -> ViewpointCapture {
        ViewpointCapture {
            camera: CameraState {
                position: [0.0, 0.0, 10.0],
                target: [0.0, 0.0, 0.0],
                direction: [0.0, 0.0, -1.0],
                field_of_view: 60.0,
                aspect_ratio: 1.5,
            },
            snapshot_image: "data:image/png;base64,AA==".to_string(),
            components: Components::default(),
        }
    }

    fn draft(title: &str) -> TopicDraft {
        TopicDraft::new(NonEmptyString::new(title.to_string()).unwrap())
    }

    fn store_with(titles: &[&str]) -> TopicStore {
        let mut store = TopicStore::new("someone@example.com");
        for title in titles {
            store.create_topic(draft(title), capture());
        }
        store
    }

    fn titles(store: &TopicStore) -> Vec<&str> {
        store.topics().iter().map(Topic::title).collect()
    }

    fn indices(store: &TopicStore) -> Vec<usize> {
        store.topics().iter().map(Topic::index).collect()
    }

    #[test]
    fn create_topic_appends_with_first_viewpoint() {
        let store = store_with(&["a", "b"]);

        assert_eq!(indices(&store), [0, 1]);
        let topic = &store.topics()[1];
        assert_eq!(topic.viewpoints().len(), 1);
        assert_eq!(topic.components().len(), 1);
        assert_eq!(topic.creation().author, "someone@example.com");
        assert!(topic.camera().is_some());
        assert_eq!(store.selected().map(Topic::title), Some("b"));
    }

    #[test]
    fn remove_topic_renumbers_later_topics() {
        let mut store = store_with(&["a", "b", "c"]);
        let removed = store.remove_topic(1).unwrap();

        assert_eq!(removed.title(), "b");
        assert_eq!(indices(&store), [0, 1]);
        assert_eq!(titles(&store), ["a", "c"]);
    }

    #[test]
    fn remove_selected_topic_clears_selection() {
        let mut store = store_with(&["a", "b"]);
        store.remove_topic(1).unwrap();
        assert!(store.selected().is_none());
    }

    #[test]
    fn remove_topic_out_of_bounds() {
        let mut store = store_with(&["a"]);
        assert_eq!(
            store.remove_topic(3).unwrap_err(),
            StoreError::IndexOutOfBounds { index: 3, len: 1 }
        );
    }

    #[test_case(0, 2, &["b", "c", "a"]; "forwards")]
    #[test_case(2, 0, &["c", "a", "b"]; "backwards")]
    #[test_case(1, 1, &["a", "b", "c"]; "in place")]
    fn move_topic_shifts_neighbours(old: usize, new: usize, expected: &[&str]) {
        let mut store = store_with(&["a", "b", "c"]);
        store.move_topic(old, new).unwrap();

        assert_eq!(titles(&store), expected);
        assert_eq!(indices(&store), [0, 1, 2]);
    }

    #[test]
    fn update_topic_bumps_modified_date_only() {
        let mut store = store_with(&["a"]);
        let uuid = store.topics()[0].uuid();
        let before = store.topics()[0].clone();

        store
            .update_topic(uuid, TopicUpdate::Status(TopicStatus::Closed))
            .unwrap();

        let after = store.get(uuid).unwrap();
        assert_eq!(after.topic_status(), TopicStatus::Closed);
        assert_eq!(after.creation(), before.creation());
        assert_eq!(after.modified().author, before.modified().author);
        assert!(after.modified().date >= before.modified().date);
    }

    #[test]
    fn update_unknown_topic_fails() {
        let mut store = store_with(&["a"]);
        let unknown = Uuid::new_v4();
        assert_eq!(
            store.update_topic(unknown, TopicUpdate::Description("x".into())),
            Err(StoreError::TopicNotFound(unknown))
        );
    }

    #[test]
    fn comment_lifecycle() {
        let mut store = store_with(&["a"]);
        let topic = store.topics()[0].uuid();
        let viewpoint = store.topics()[0].viewpoints()[0].uuid();

        let first = store
            .add_comment(topic, Some("first".into()), None)
            .unwrap();
        let second = store.add_comment(topic, None, Some(viewpoint)).unwrap();
        assert_eq!(
            store.add_comment(topic, None, None),
            Err(StoreError::EmptyComment(EmptyComment))
        );

        store
            .update_comment(topic, first, "edited".into())
            .unwrap();
        let comments = store.get(topic).unwrap().comments();
        assert_eq!(comments[0].text(), Some("edited"));
        assert_eq!(comments[0].modified_author(), Some("someone@example.com"));
        assert_eq!(comments[1].viewpoint(), Some(viewpoint));

        store.remove_comment(topic, second).unwrap();
        assert_eq!(store.get(topic).unwrap().comments().len(), 1);
        assert_eq!(
            store.remove_comment(topic, second).unwrap_err(),
            StoreError::CommentNotFound(second)
        );
    }

    #[test]
    fn add_viewpoint_appends_without_editing_existing() {
        let mut store = store_with(&["a"]);
        let topic = store.topics()[0].uuid();
        let original = store.topics()[0].viewpoints()[0].clone();

        let added = store.add_viewpoint(topic, capture()).unwrap();

        let viewpoints = store.get(topic).unwrap().viewpoints();
        assert_eq!(viewpoints[0], original);
        assert_eq!(viewpoints[1].uuid(), added);
        assert_eq!(viewpoints[1].index(), 1);
        assert_eq!(store.get(topic).unwrap().components().len(), 2);
    }

    #[test]
    fn add_viewpoint_keeps_the_topic_camera() {
        let mut store = store_with(&["a"]);
        let topic = store.topics()[0].uuid();
        let before = store.topics()[0].camera().copied();

        let mut moved = capture();
        moved.camera.position = [99.0, 0.0, 0.0];
        store.add_viewpoint(topic, moved).unwrap();

        let topic = store.get(topic).unwrap();
        assert_eq!(topic.camera().copied(), before);
        assert_eq!(topic.viewpoints()[0].camera().copied(), before);
        assert_eq!(
            topic.viewpoints()[1].camera().map(|c| c.position),
            Some([99.0, 0.0, 0.0])
        );
    }

    #[test]
    fn select_requires_existing_topic() {
        let mut store = store_with(&["a", "b"]);
        let first = store.topics()[0].uuid();

        store.select(first).unwrap();
        assert_eq!(store.selected().map(Topic::uuid), Some(first));

        assert!(store.select(Uuid::new_v4()).is_err());
        store.deselect();
        assert!(store.selected().is_none());
    }
}
