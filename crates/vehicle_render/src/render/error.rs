//! Error taxonomy for the rendering core
//!
//! Configuration errors (broken asset references) are fatal and surfaced
//! immediately. Per-frame visibility and texture decisions are never errors;
//! those are expressed as skip-this-frame outcomes in the pipeline.

use thiserror::Error;

/// Errors produced by the rendering core
#[derive(Debug, Error)]
pub enum RenderError {
    /// A tread path referenced a roller object the model does not contain.
    ///
    /// Indicates a broken asset; not retried.
    #[error("could not create tread path for {model}: missing roller {roller} in the model")]
    MissingRoller {
        /// Model the tread path is defined against
        model: String,
        /// Name of the missing roller sub-object
        roller: String,
    },

    /// A tread-bearing mount slot has no roller chain defined.
    #[error("no tread path found for part slot {slot} on {model}")]
    MissingTreadPath {
        /// Model the slot belongs to
        model: String,
        /// Mount slot index
        slot: u32,
    },

    /// An object declared `apply_after` on another object that has no
    /// animations defined.
    #[error("was told to apply after object {dependency} for object {object}, but there aren't any animations to apply after")]
    MissingApplyAfter {
        /// Object that declared the dependency
        object: String,
        /// The named dependency that has no switchbox
        dependency: String,
    },

    /// Model parsing failed in the external model source.
    #[error("model parsing failed: {0}")]
    ModelParse(String),

    /// Backend-specific error, wrapped in a generic form.
    #[error("backend error: {0}")]
    Backend(String),
}
