use uuid::Uuid;

use crate::domain::{Stamp, Timestamp, topic::now};

/// A comment on a topic.
///
/// A comment carries text, a reference to one of the topic's viewpoints, or
/// both. It never has neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub(crate) uuid: Uuid,
    pub(crate) date: Timestamp,
    pub(crate) author: String,
    pub(crate) comment: Option<String>,
    pub(crate) viewpoint: Option<Uuid>,
    pub(crate) modified_date: Option<Timestamp>,
    pub(crate) modified_author: Option<String>,
}

/// A comment was given neither text nor a viewpoint reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a comment needs text, a viewpoint reference, or both")]
pub struct EmptyComment;

impl Comment {
    /// Creates a comment by `author`, dated now.
    ///
    /// Empty text is treated as no text.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyComment`] if there is neither text nor a viewpoint.
    pub fn new(
        author: impl Into<String>,
        comment: Option<String>,
        viewpoint: Option<Uuid>,
    ) -> Result<Self, EmptyComment> {
        let comment = comment.filter(|text| !text.is_empty());
        if comment.is_none() && viewpoint.is_none() {
            return Err(EmptyComment);
        }
        Ok(Self {
            uuid: Uuid::new_v4(),
            date: now(),
            author: author.into(),
            comment,
            viewpoint,
            modified_date: None,
            modified_author: None,
        })
    }

    /// The comment's identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// When the comment was written.
    #[must_use]
    pub const fn date(&self) -> &Timestamp {
        &self.date
    }

    /// Who wrote the comment.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The comment text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The referenced viewpoint.
    #[must_use]
    pub const fn viewpoint(&self) -> Option<Uuid> {
        self.viewpoint
    }

    /// When the comment was last edited.
    #[must_use]
    pub const fn modified_date(&self) -> Option<&Timestamp> {
        self.modified_date.as_ref()
    }

    /// Who last edited the comment.
    #[must_use]
    pub fn modified_author(&self) -> Option<&str> {
        self.modified_author.as_deref()
    }

    /// Replaces the text and stamps the edit.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyComment`] if the new text is empty and the comment has
    /// no viewpoint reference to fall back on. The comment is unchanged.
    pub fn edit(&mut self, text: String, edit: Stamp) -> Result<(), EmptyComment> {
        let text = Some(text).filter(|t| !t.is_empty());
        if text.is_none() && self.viewpoint.is_none() {
            return Err(EmptyComment);
        }
        self.comment = text;
        self.modified_date = Some(edit.date);
        self.modified_author = Some(edit.author);
        Ok(())
    }
}
