//! # lightform_scene - Light Entity Model
//!
//! The canonical scene state of the editor:
//!
//! - [`Light`]: one lightformer, with its appearance carried by the
//!   [`LightKind`] sum type
//! - [`Camera`] and [`Signal`]: preview viewpoints and per-channel animation
//! - [`SceneStore`]: copy-on-write owner of all three lists, with solo and
//!   selection policy and scoped change notification
//! - [`persist`]: versioned save/load with migrations from older layouts
//!
//! ## Example
//!
//! ```
//! use lightform_scene::prelude::*;
//!
//! let store = SceneStore::with_default_scene();
//! let b = store.add_light(Light::new("", "Light B", LightKind::default()));
//! store.toggle_solo(&b).unwrap();
//! assert!(store.is_solo());
//! ```

pub mod camera;
pub mod color;
pub mod error;
pub mod id;
pub mod light;
pub mod persist;
pub mod signal;
pub mod store;

pub use camera::{Camera, DEFAULT_CAMERA_ID};
pub use color::{linear_to_srgb, srgb_to_linear, Color};
pub use error::{SceneError, SceneResult};
pub use id::{CameraId, IdGenerator, LightId, SignalId};
pub use light::*;
pub use persist::{load_scene, save_scene, FileStorage, KeyValueStorage, MemoryStorage, SCHEMA_VERSION};
pub use signal::{Axis, Signal, SignalMode, SignalProperty, SignalSample};
pub use store::{SceneSnapshot, SceneStore, StoreEvent};

pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::color::Color;
    pub use crate::error::{SceneError, SceneResult};
    pub use crate::id::{CameraId, LightId, SignalId};
    pub use crate::light::{Light, LightKind, Placement, Shape};
    pub use crate::signal::Signal;
    pub use crate::store::{SceneStore, StoreEvent};
}
