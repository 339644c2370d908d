use uuid::Uuid;

use crate::domain::CameraState;

/// A saved camera pose and snapshot, tied to a topic.
///
/// Viewpoints are immutable once created. When a discussion needs a
/// different visualisation, a new viewpoint is added instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    pub(crate) uuid: Uuid,
    /// Filename of the `.bcfv` document.
    pub(crate) viewpoint: String,
    /// Filename of the snapshot image.
    pub(crate) snapshot: String,
    /// The snapshot as a base64 data URL.
    pub(crate) snapshot_image: String,
    pub(crate) index: usize,
    /// The camera this viewpoint was captured with, in viewer space.
    pub(crate) camera: Option<CameraState>,
}

impl Viewpoint {
    /// Creates a viewpoint for a freshly captured screenshot.
    ///
    /// The document and snapshot filenames are derived from a new UUID.
    #[must_use]
    pub fn new(snapshot_image: impl Into<String>) -> Self {
        Self::with_uuid(Uuid::new_v4(), snapshot_image)
    }

    pub(crate) fn with_uuid(uuid: Uuid, snapshot_image: impl Into<String>) -> Self {
        Self {
            uuid,
            viewpoint: format!("{uuid}.bcfv"),
            snapshot: format!("{uuid}.png"),
            snapshot_image: snapshot_image.into(),
            index: 0,
            camera: None,
        }
    }

    /// Attaches the camera the snapshot was taken with.
    #[must_use]
    pub const fn with_camera(mut self, camera: CameraState) -> Self {
        self.camera = Some(camera);
        self
    }

    /// The viewpoint's identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Filename of the viewpoint document inside the topic folder.
    #[must_use]
    pub fn viewpoint_file(&self) -> &str {
        &self.viewpoint
    }

    /// Filename of the snapshot image inside the topic folder.
    #[must_use]
    pub fn snapshot_file(&self) -> &str {
        &self.snapshot
    }

    /// The snapshot image as a data URL.
    #[must_use]
    pub fn snapshot_image(&self) -> &str {
        &self.snapshot_image
    }

    /// Sort hint.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The camera captured with this viewpoint, if it has its own.
    #[must_use]
    pub const fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }
}
