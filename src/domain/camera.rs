//! The viewer captures cameras in a right-handed, `Y`-up frame. BCF uses a
//! `Z`-up frame, so every vector is remapped `[x, y, z] -> [x, -z, y]`
//! before it is written to a viewpoint document.

use serde::{Deserialize, Serialize};

/// A 3D vector as `[x, y, z]`.
pub type Vector3 = [f64; 3];

/// A camera pose as captured from the live viewer, in viewer space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    /// Camera position.
    pub position: Vector3,
    /// The point the camera orbits around.
    pub target: Vector3,
    /// View direction.
    pub direction: Vector3,
    /// Vertical field of view in degrees.
    pub field_of_view: f64,
    /// Width divided by height of the viewport.
    pub aspect_ratio: f64,
}

/// A perspective camera in BCF space, ready to be written to a `.bcfv`
/// document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BcfCamera {
    /// `CameraViewPoint`.
    pub position: Vector3,
    /// `CameraDirection`.
    pub direction: Vector3,
    /// `CameraUpVector`.
    pub up: Vector3,
    /// `FieldOfView` in degrees.
    pub field_of_view: f64,
    /// `AspectRatio`.
    pub aspect_ratio: f64,
}

/// A camera field holds a NaN or infinite component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid camera state: `{field}` is not finite")]
pub struct InvalidCameraState {
    /// Name of the offending field.
    pub field: &'static str,
}

impl CameraState {
    /// Converts the captured camera into BCF space.
    ///
    /// The up vector is the normalised vector from the position towards the
    /// target. Strictly that is a view vector rather than an up vector; it is
    /// kept because that is what existing consumers of these files have been
    /// given so far.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCameraState`] if any component is not finite.
    pub fn to_bcf(&self) -> Result<BcfCamera, InvalidCameraState> {
        check_vector("position", self.position)?;
        check_vector("target", self.target)?;
        check_vector("direction", self.direction)?;
        check_scalar("fieldOfView", self.field_of_view)?;
        check_scalar("aspectRatio", self.aspect_ratio)?;

        let raw_up = normalize(sub(self.target, self.position));

        Ok(BcfCamera {
            position: to_bcf_axes(self.position),
            direction: to_bcf_axes(self.direction),
            up: to_bcf_axes(raw_up),
            field_of_view: self.field_of_view,
            aspect_ratio: self.aspect_ratio,
        })
    }
}

/// Maps a viewer-space vector into BCF space: `[x, y, z] -> [x, -z, y]`.
#[must_use]
pub fn to_bcf_axes([x, y, z]: Vector3) -> Vector3 {
    [x, -z, y]
}

/// The inverse of [`to_bcf_axes`]: `[x, y, z] -> [x, z, -y]`.
#[must_use]
pub fn from_bcf_axes([x, y, z]: Vector3) -> Vector3 {
    [x, z, -y]
}

fn sub(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scales to unit length. A zero vector is returned unchanged.
fn normalize(v: Vector3) -> Vector3 {
    let length = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    if length == 0.0 {
        return v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

fn check_vector(field: &'static str, v: Vector3) -> Result<(), InvalidCameraState> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(InvalidCameraState { field })
    }
}

fn check_scalar(field: &'static str, value: f64) -> Result<(), InvalidCameraState> {
    check_vector(field, [value, 0.0, 0.0])
}
