//! Backend traits for the rendering system
//!
//! This module defines the trait a host rendering backend must implement to
//! provide a consistent interface for the model-object pipeline. The
//! pipeline issues one `upload_and_draw` per visible object per pass and
//! never touches GPU state directly.

use crate::foundation::math::{Mat4, Point3};
use crate::render::entity::TextDef;
use crate::render::error::RenderError;
use crate::render::renderable::RenderableObject;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a vertex buffer cached in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferToken(pub u64);

/// Decoded RGBA image data ready for upload
#[derive(Debug, Clone)]
pub struct TextureImage {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// One frame of an animated texture
#[derive(Debug, Clone)]
pub struct TextureFrame {
    /// Decoded frame image
    pub image: TextureImage,
    /// Display duration of this frame in milliseconds
    pub delay_ms: u32,
}

/// A decoded animated texture (GIF frame sequence)
#[derive(Debug, Clone)]
pub struct AnimatedTexture {
    /// Ordered frames; never empty
    pub frames: Vec<TextureFrame>,
}

/// Main rendering backend trait
///
/// Implemented by the host engine. All methods are called from the render
/// thread only; downloaded texture data reaches the backend via
/// [`crate::render::textures::TextureStore::poll`], never from worker
/// threads.
pub trait RenderBackend {
    /// Register image data under `identifier` so later draws referencing
    /// that texture identifier resolve to it. Passing `None` binds the
    /// error-placeholder texture to the identifier instead.
    ///
    /// Returns true if the texture was bound, false if the backend could
    /// not use the data (e.g. partial upload).
    fn bind_texture(&mut self, identifier: &str, image: Option<&TextureImage>) -> bool;

    /// Register an animated frame sequence under `identifier`.
    ///
    /// Returns true if the texture was bound.
    fn bind_animated_texture(&mut self, identifier: &str, frames: &AnimatedTexture) -> bool;

    /// Upload (or re-use cached) vertices for the object and draw it with
    /// its current transform, texture, color, alpha, and lighting state.
    ///
    /// `cached` is the token from a previous upload of the same object, if
    /// any. When the object requests vertex caching the backend returns a
    /// token the caller must hold and eventually pass to
    /// [`RenderBackend::release_buffer`].
    fn upload_and_draw(
        &mut self,
        object: &RenderableObject,
        cached: Option<BufferToken>,
    ) -> BackendResult<Option<BufferToken>>;

    /// Free a cached vertex buffer.
    fn release_buffer(&mut self, token: BufferToken);

    /// Engine-specific packed lighting state at a world position.
    fn query_lighting_at(&self, position: &Point3) -> u32;

    /// Ambient light brightness in [0, 1] at a world position.
    ///
    /// Used to fade flares and beams out in daylight.
    fn query_ambient_brightness(&self, position: &Point3) -> f64;

    /// Draw an attached text string with the given transform.
    ///
    /// Text rasterization itself lives in the host engine; the pipeline
    /// only decides when text is visible (solid pass, after the owning
    /// object rendered).
    fn draw_text(&mut self, text: &str, transform: &Mat4, def: &TextDef) -> BackendResult<()>;
}
