//! # lightform_codegen - Scene Code
//!
//! Renders a light list as a declarative environment component, shown
//! read-only next to the editor and written by the studio binary.

pub mod jsx;
pub mod writer;

pub use jsx::{generate, CodegenOptions};
