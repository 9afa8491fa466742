//! Preview cameras

use serde::{Deserialize, Serialize};

use crate::id::CameraId;

/// Key of the camera every scene starts with
pub const DEFAULT_CAMERA_ID: &str = "default";

/// A saved viewpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: CameraId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: [f64; 3],
    /// XYZ Euler angles in radians
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default)]
    pub selected: bool,
}

impl Camera {
    pub fn new(id: impl Into<CameraId>, name: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            rotation: [0.0; 3],
            selected: false,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            selected: true,
            ..Self::new(DEFAULT_CAMERA_ID, "Default", [0.0, 0.0, 5.0])
        }
    }
}

/// Make sure exactly one camera is selected, preferring the first selected one
pub(crate) fn normalize_selection(cameras: &mut [Camera]) {
    let first = cameras.iter().position(|c| c.selected).unwrap_or(0);
    for (i, camera) in cameras.iter_mut().enumerate() {
        camera.selected = i == first;
    }
}
