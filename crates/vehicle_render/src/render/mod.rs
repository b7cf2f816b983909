//! # Rendering System
//!
//! The model-object rendering core: takes parsed model geometry plus a
//! per-frame entity state view and turns them into backend draw calls.
//!
//! ## Architecture
//!
//! - **Pipeline**: per-object visibility gating, texture resolution, and
//!   draw dispatch over two passes (solid, then blended)
//! - **Treads**: procedural tread path solving and per-link rendering
//! - **Lights**: derived overlay geometry for emissive lights, covers,
//!   flares, and beams
//! - **Textures**: asynchronous URL texture acquisition
//! - **Backend trait**: the host engine implements [`api::RenderBackend`];
//!   nothing in this crate touches GPU state directly

pub mod api;
pub mod entity;
pub mod error;
pub mod lights;
pub mod pipeline;
pub mod renderable;
pub mod settings;
pub mod textures;
pub mod treads;

pub use api::{
    AnimatedTexture, BackendResult, BufferToken, RenderBackend, TextureFrame, TextureImage,
};
pub use entity::{
    AnimatedObjectDef, BlendableComponent, LightDef, RenderEntity, SwitchboxState, TextDef,
    TextEntry, TreadDescriptor, VisibilityFade,
};
pub use error::RenderError;
pub use pipeline::{ModelObject, ObjectKind, RenderContext};
pub use renderable::{ColorRgb, ModelSource, RenderableObject, Vertex};
pub use settings::RenderSettings;
pub use textures::{HttpTextureFetcher, TextureFetcher, TextureState, TextureStore};
pub use treads::{PathPoint, TreadPointCache};
