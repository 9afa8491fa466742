//! # lightform_studio
//!
//! Headless front end of the Lightform editor core: configuration, the
//! frame loop, HDRI export and code output.

pub mod config;
pub mod error;
pub mod studio;

pub use config::{StudioConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, ConfigResult, StudioError, StudioResult};
pub use studio::{Studio, StudioReport};
