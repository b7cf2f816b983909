//! Renderable object representation
//!
//! A [`RenderableObject`] is one named sub-mesh of a model: a vertex buffer
//! plus the per-frame texture/transform/lighting state needed to draw it.
//! The pipeline mutates this state every frame prior to issuing the draw
//! through the backend.

use crate::foundation::math::Mat4;
use crate::render::api::{BufferToken, RenderBackend};
use crate::render::error::RenderError;

/// A single mesh vertex: normal, UV, position interleaved.
///
/// Field order matches the model source's 8-float interleave so buffers can
/// be uploaded without repacking.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Position in model space
    pub position: [f32; 3],
}

impl Vertex {
    /// Create a vertex from components
    pub fn new(normal: [f32; 3], uv: [f32; 2], position: [f32; 3]) -> Self {
        Self {
            normal,
            uv,
            position,
        }
    }
}

/// RGB color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRgb {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl ColorRgb {
    /// Pure white, the neutral modulation color
    pub const WHITE: ColorRgb = ColorRgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Create a color from components
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Default for ColorRgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A named sub-mesh with its current render state
#[derive(Debug, Clone)]
pub struct RenderableObject {
    /// Sub-object name from the model
    pub name: String,
    /// Texture identifier bound when drawing
    pub texture: String,
    /// Modulation color
    pub color: ColorRgb,
    /// Alpha multiplier in [0, 1]
    pub alpha: f32,
    /// Interleaved vertex buffer
    pub vertices: Vec<Vertex>,
    /// Object-to-world transform, recomputed each frame
    pub transform: Mat4,
    /// True if this object draws on the blend pass
    pub is_translucent: bool,
    /// Ask the backend to keep the uploaded vertices between draws.
    ///
    /// Set for geometry drawn many times per frame (tread links, overlays).
    pub cache_vertices: bool,
    /// Packed world lighting state from the backend
    pub world_light_value: u32,
    /// Render at full brightness, ignoring the world light value
    pub ignore_world_lighting: bool,
    /// Use additive brightness blending (light beams)
    pub enable_brightness_blending: bool,
    cached_buffer: Option<BufferToken>,
}

impl RenderableObject {
    /// Create a new renderable object
    pub fn new(
        name: impl Into<String>,
        texture: impl Into<String>,
        color: ColorRgb,
        vertices: Vec<Vertex>,
        cache_vertices: bool,
    ) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            color,
            alpha: 1.0,
            vertices,
            transform: Mat4::identity(),
            is_translucent: false,
            cache_vertices,
            world_light_value: 0,
            ignore_world_lighting: false,
            enable_brightness_blending: false,
            cached_buffer: None,
        }
    }

    /// Set the lighting state for the next draw
    pub fn set_lighting(
        &mut self,
        world_light_value: u32,
        ignore_world_lighting: bool,
        enable_brightness_blending: bool,
    ) {
        self.world_light_value = world_light_value;
        self.ignore_world_lighting = ignore_world_lighting;
        self.enable_brightness_blending = enable_brightness_blending;
    }

    /// Enable or disable additive brightness blending
    pub fn set_blending(&mut self, enable_brightness_blending: bool) {
        self.enable_brightness_blending = enable_brightness_blending;
    }

    /// Set the alpha multiplier
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Set the modulation color
    pub fn set_color(&mut self, color: ColorRgb) {
        self.color = color;
    }

    /// Draw this object through the backend with its current state.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let token = backend.upload_and_draw(&*self, self.cached_buffer)?;
        self.cached_buffer = token;
        Ok(())
    }

    /// Release the cached GPU buffer, if any. Call before the owning model
    /// is re-parsed or the entity is destroyed.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(token) = self.cached_buffer.take() {
            backend.release_buffer(token);
        }
    }

    /// Retarget UVs into the unit square, per triangle.
    ///
    /// Used when swapping an authored texture for a shared one (glass on
    /// windows, light overlays): the authored UVs may tile outside [0, 1]
    /// and would sample the wrong part of the replacement texture.
    pub fn normalize_uvs(&mut self) {
        for triangle in self.vertices.chunks_mut(3) {
            let u_shift = triangle
                .iter()
                .map(|v| v.uv[0])
                .fold(f32::INFINITY, f32::min)
                .floor();
            let v_shift = triangle
                .iter()
                .map(|v| v.uv[1])
                .fold(f32::INFINITY, f32::min)
                .floor();
            if u_shift != 0.0 || v_shift != 0.0 {
                for vertex in triangle {
                    vertex.uv[0] -= u_shift;
                    vertex.uv[1] -= v_shift;
                }
            }
        }
    }

    /// Build a mirrored duplicate with reversed vertex order.
    ///
    /// Reversing the order flips the winding, so the duplicate faces inward;
    /// used for interior window panes.
    pub fn reversed(&self, name_suffix: &str) -> RenderableObject {
        let mut interior = self.clone();
        interior.name = format!("{}{}", self.name, name_suffix);
        interior.vertices.reverse();
        interior.cached_buffer = None;
        interior
    }
}

/// Source of parsed model geometry.
///
/// Implemented by the host's asset layer; returns the raw per-sub-object
/// vertex buffers for a model identifier.
pub trait ModelSource {
    /// Parse (or fetch from cache) the named model's sub-objects.
    fn parse_model(&self, model_id: &str) -> Result<Vec<RenderableObject>, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<Vertex> {
        (0..6)
            .map(|i| Vertex::new([0.0, 0.0, 1.0], [i as f32, 2.5], [i as f32, 0.0, 0.0]))
            .collect()
    }

    #[test]
    fn test_normalize_uvs_shifts_per_triangle() {
        let mut object = RenderableObject::new(
            "window",
            "glass",
            ColorRgb::WHITE,
            quad_vertices(),
            false,
        );
        object.normalize_uvs();
        // First triangle had min u = 0, untouched; second had min u = 3.
        assert_eq!(object.vertices[0].uv[0], 0.0);
        assert_eq!(object.vertices[3].uv[0], 0.0);
        assert_eq!(object.vertices[4].uv[0], 1.0);
        // v = 2.5 everywhere shifts down by floor(2.5) = 2.
        assert!(object.vertices.iter().all(|v| v.uv[1] == 0.5));
    }

    #[test]
    fn test_reversed_flips_winding() {
        let object = RenderableObject::new(
            "window",
            "glass",
            ColorRgb::WHITE,
            quad_vertices(),
            false,
        );
        let interior = object.reversed("_interior");
        assert_eq!(interior.name, "window_interior");
        assert_eq!(interior.vertices.len(), object.vertices.len());
        assert_eq!(interior.vertices[0], object.vertices[5]);
        assert_eq!(interior.vertices[5], object.vertices[0]);
    }
}
