//! Light overlay geometry generation
//!
//! Lights derive secondary geometry from their base mesh: an emissive color
//! overlay, a glass cover, lens flares, and light beams. Color and cover
//! overlays duplicate the source vertices pushed out along their normals by
//! small per-kind offsets so the stacked layers never z-fight; flares and
//! beams are generated from declarative placement descriptors instead.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::entity::BlendableComponent;
use crate::render::renderable::{ColorRgb, RenderableObject, Vertex};

/// Texture used for emissive color overlays
pub const LIGHT_TEXTURE: &str = "textures/rendering/light.png";
/// Texture used for glass covers and windows
pub const GLASS_TEXTURE: &str = "textures/rendering/glass.png";
/// Texture used for lens flares
pub const FLARE_TEXTURE: &str = "textures/rendering/lensflare.png";
/// Texture used for light beams
pub const BEAM_TEXTURE: &str = "textures/rendering/lightbeam.png";

/// Base normal-offset step between stacked overlay layers
pub const Z_BUFFER_OFFSET: f32 = 0.0003;
/// Color overlay offset; innermost layer
pub const COLOR_OFFSET: f32 = Z_BUFFER_OFFSET;
/// Flare center offset; sits above the color layer
pub const FLARE_OFFSET: f32 = COLOR_OFFSET + Z_BUFFER_OFFSET;
/// Cover offset; outermost layer
pub const COVER_OFFSET: f32 = FLARE_OFFSET + Z_BUFFER_OFFSET;
/// Beam apex offset along the beam axis, pulled back into the housing
pub const BEAM_OFFSET: f64 = -0.15;
/// Number of triangular segments per beam cone face
pub const BEAM_SEGMENTS: i32 = 40;

fn offset_along_normals(
    parsed: &RenderableObject,
    name: &str,
    texture: &str,
    color: ColorRgb,
    offset: f32,
) -> RenderableObject {
    let vertices = parsed
        .vertices
        .iter()
        .map(|v| {
            Vertex::new(
                v.normal,
                v.uv,
                [
                    v.position[0] + v.normal[0] * offset,
                    v.position[1] + v.normal[1] * offset,
                    v.position[2] + v.normal[2] * offset,
                ],
            )
        })
        .collect();
    let mut object = RenderableObject::new(name, texture, color, vertices, false);
    object.normalize_uvs();
    object
}

/// Build the emissive color overlay for a light's base mesh.
pub fn generate_color_overlay(parsed: &RenderableObject) -> RenderableObject {
    let mut object = offset_along_normals(
        parsed,
        "color",
        LIGHT_TEXTURE,
        ColorRgb::WHITE,
        COLOR_OFFSET,
    );
    object.is_translucent = true;
    object
}

/// Build the glass cover overlay for a light's base mesh.
///
/// Covers render on the solid pass and keep the source object's color.
pub fn generate_cover_overlay(parsed: &RenderableObject) -> RenderableObject {
    offset_along_normals(parsed, "cover", GLASS_TEXTURE, parsed.color, COVER_OFFSET)
}

/// Build one billboard quad (two triangles) per flare placement.
pub fn generate_flares(components: &[BlendableComponent]) -> RenderableObject {
    let mut vertices = Vec::with_capacity(components.len() * 6);
    for component in components {
        let rotation = Mat4::rotation_to_axis(&component.axis);
        let center = component.axis * FLARE_OFFSET as f64 + component.position;
        for corner in 0..6 {
            // Two CCW triangles: BR, TR, TL and BR, TL, BL.
            let uv: [f32; 2] = match corner {
                0 | 3 => [1.0, 1.0],
                1 => [1.0, 0.0],
                2 | 4 => [0.0, 0.0],
                _ => [0.0, 1.0],
            };
            let local = Vec3::new(
                if uv[0] == 0.0 {
                    -component.flare_width / 2.0
                } else {
                    component.flare_width / 2.0
                },
                if uv[1] == 0.0 {
                    component.flare_height / 2.0
                } else {
                    -component.flare_height / 2.0
                },
                0.0,
            );
            let position = rotation.transform_vector(&local) + center;
            vertices.push(Vertex::new(
                [
                    component.axis.x as f32,
                    component.axis.y as f32,
                    component.axis.z as f32,
                ],
                uv,
                [position.x as f32, position.y as f32, position.z as f32],
            ));
        }
    }
    let mut object = RenderableObject::new("flares", FLARE_TEXTURE, ColorRgb::WHITE, vertices, false);
    object.is_translucent = true;
    object
}

/// Build the double-cone beam fan for each beam placement.
///
/// Each beam is two cones sharing an apex (inner and outer face), built as
/// `BEAM_SEGMENTS` triangles each by walking the segment index from negative
/// to positive. Normals are intentionally zero: beams are pure-emissive
/// blended geometry with no lighting dependency.
pub fn generate_beams(components: &[BlendableComponent]) -> RenderableObject {
    let mut vertices = Vec::with_capacity(components.len() * 2 * BEAM_SEGMENTS as usize * 3);
    for component in components {
        let rotation = Mat4::rotation_to_axis(&component.axis);
        let center = component.axis * BEAM_OFFSET + component.position;
        for segment in -BEAM_SEGMENTS..BEAM_SEGMENTS {
            for corner in 0..3 {
                // Corner 0 is the apex; 1 and 2 are on the cone rim.
                let uv: [f32; 2] = match corner {
                    0 => [0.0, 0.0],
                    1 => [0.0, 1.0],
                    _ => [1.0, 1.0],
                };
                let segment_fraction = |index: i32| index as f64 / BEAM_SEGMENTS as f64;
                // Mirror the angle stepping about zero so the inner and
                // outer faces wind in opposite directions.
                let angle = if segment < 0 {
                    if uv[0] == 0.0 {
                        std::f64::consts::TAU * segment_fraction(segment + 1)
                    } else {
                        std::f64::consts::TAU * segment_fraction(segment)
                    }
                } else if uv[0] == 0.0 {
                    std::f64::consts::TAU * segment_fraction(segment)
                } else {
                    std::f64::consts::TAU * segment_fraction(segment + 1)
                };
                let local = if uv[1] == 0.0 {
                    Vec3::zeros()
                } else {
                    Vec3::new(
                        component.beam_diameter / 2.0 * angle.cos(),
                        component.beam_diameter / 2.0 * angle.sin(),
                        component.beam_length,
                    )
                };
                let position = rotation.transform_vector(&local) + center;
                vertices.push(Vertex::new(
                    [0.0, 0.0, 0.0],
                    uv,
                    [position.x as f32, position.y as f32, position.z as f32],
                ));
            }
        }
    }
    let mut object = RenderableObject::new("beams", BEAM_TEXTURE, ColorRgb::WHITE, vertices, false);
    object.is_translucent = true;
    object
}

/// Effective brightness of an electric light given system voltage.
///
/// Output starts dimming below 10V and reaches zero at 3V, linearly.
pub fn electric_dimming(light_level: f64, electric_power: f64) -> f64 {
    if electric_power < 3.0 {
        0.0
    } else if electric_power < 10.0 {
        light_level * (electric_power - 3.0) / 7.0
    } else {
        light_level
    }
}
