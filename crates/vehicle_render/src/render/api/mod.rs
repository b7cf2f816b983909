//! Backend abstraction for the rendering core
//!
//! The actual GPU work (texture binding, buffer upload, draw submission) is
//! done by the host engine. This module defines the contract that engine
//! implements; everything else in the crate talks to it through
//! [`RenderBackend`].

mod render_backend;

pub use render_backend::{
    AnimatedTexture, BackendResult, BufferToken, RenderBackend, TextureFrame, TextureImage,
};
