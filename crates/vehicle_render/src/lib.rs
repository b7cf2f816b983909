//! # Vehicle Render
//!
//! Real-time entity rendering core for simulated vehicles: renderable
//! model objects, procedural tread animation, light overlay geometry, and
//! online texture acquisition.
//!
//! ## Features
//!
//! - **Model objects**: named sub-meshes with per-frame animation,
//!   visibility, and lighting state
//! - **Treads**: roller-chain path solving with catenary droop and cyclic
//!   link patterns
//! - **Lights**: derived color/cover/flare/beam geometry with electric
//!   dimming
//! - **Online textures**: threaded URL downloads with retry and error
//!   placeholders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vehicle_render::prelude::*;
//! # fn demo(
//! #     backend: &mut dyn RenderBackend,
//! #     entity: &dyn RenderEntity,
//! #     models: &dyn ModelSource,
//! #     objects: &mut Vec<ModelObject>,
//! # ) -> Result<(), RenderError> {
//! let settings = RenderSettings::default();
//! let mut textures = TextureStore::new(std::sync::Arc::new(HttpTextureFetcher::new()));
//! let mut treads = TreadPointCache::new();
//!
//! textures.poll(backend);
//! for blend_pass in [false, true] {
//!     let mut context = RenderContext {
//!         backend: &mut *backend,
//!         settings: &settings,
//!         textures: &mut textures,
//!         tread_cache: &mut treads,
//!         models,
//!     };
//!     for object in objects.iter_mut() {
//!         object.render(entity, blend_pass, &mut context)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod foundation;
pub mod render;

/// Common imports for crate users
pub mod prelude {
    pub use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3};
    pub use crate::render::{
        ColorRgb, HttpTextureFetcher, ModelObject, ModelSource, ObjectKind, RenderBackend,
        RenderContext, RenderEntity, RenderError, RenderSettings, RenderableObject, TextureStore,
        TreadPointCache, Vertex,
    };
}
