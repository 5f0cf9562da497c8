//! Artifact storage
//!
//! Fitted objects are persisted as JSON documents under the artifacts
//! directory and loaded read-only at serving time.

pub mod artifacts;

pub use artifacts::{format_size, load_json, save_json, ArtifactError, ArtifactStatus};
