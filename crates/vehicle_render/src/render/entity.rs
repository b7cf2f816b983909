//! Entity/provider contract
//!
//! The rendering core does not own entities. Each frame the driver evaluates
//! animation switchboxes and light/text state on its side, then hands the
//! pipeline a read-only view of the results through [`RenderEntity`].

use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::render::renderable::ColorRgb;

/// Result of evaluating one animation switchbox for the current frame
#[derive(Debug, Clone)]
pub struct SwitchboxState {
    /// Whether visibility animations left the object visible
    pub visible: bool,
    /// Net transform produced by the switchbox's animation chain
    pub net_matrix: Mat4,
    /// Visibility-clock output for alpha fading, when one ran this frame
    pub visibility: Option<VisibilityFade>,
}

impl SwitchboxState {
    /// A visible switchbox with no transform and no fade
    pub fn visible_identity() -> Self {
        Self {
            visible: true,
            net_matrix: Mat4::identity(),
            visibility: None,
        }
    }
}

/// Visibility-clock output driving a linear alpha fade
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFade {
    /// Last evaluated animation variable value
    pub value: f64,
    /// Value at or below which alpha is 0
    pub clamp_min: f64,
    /// Value at or above which alpha is 1
    pub clamp_max: f64,
}

impl VisibilityFade {
    /// Alpha in [0, 1]: 0 below `clamp_min`, 1 at/above `clamp_max`,
    /// linear between. `>=` on the max side so equal clamps act as a
    /// hard switch.
    pub fn alpha(&self) -> f32 {
        if self.value < self.clamp_min {
            0.0
        } else if self.value >= self.clamp_max {
            1.0
        } else {
            ((self.value - self.clamp_min) / (self.clamp_max - self.clamp_min)) as f32
        }
    }
}

/// Static animation properties of a named object
#[derive(Debug, Clone, Default)]
pub struct AnimatedObjectDef {
    /// Render only if this other object's switchbox evaluates visible
    pub apply_after: Option<String>,
    /// Visibility animations fade alpha instead of hiding the object
    pub blended_animations: bool,
}

/// Definition of a text field attached to the model
#[derive(Debug, Clone, Default)]
pub struct TextDef {
    /// Field name matched against online-texture object names
    pub field_name: Option<String>,
    /// Object this text renders on top of
    pub attached_to: Option<String>,
}

/// A text field with its current value
#[derive(Debug, Clone)]
pub struct TextEntry {
    /// The field definition
    pub def: TextDef,
    /// Current text value (empty when unset)
    pub value: String,
}

/// A flare or beam placement on a light
#[derive(Debug, Clone)]
pub struct BlendableComponent {
    /// Placement position in model space
    pub position: Vec3,
    /// Facing axis, normalized
    pub axis: Vec3,
    /// Flare billboard width; 0 if this component has no flare
    pub flare_width: f64,
    /// Flare billboard height; 0 if this component has no flare
    pub flare_height: f64,
    /// Beam cone diameter; 0 if this component has no beam
    pub beam_diameter: f64,
    /// Beam cone length
    pub beam_length: f64,
}

/// Definition of a light-emitting object
#[derive(Debug, Clone, Default)]
pub struct LightDef {
    /// Light name, matching the model object name
    pub name: String,
    /// Renders an emissive color overlay when lit
    pub emissive: bool,
    /// Has a glass cover rendered on the solid pass
    pub covered: bool,
    /// The object itself is a beam mesh
    pub is_beam: bool,
    /// Powered by the electrical system; dims with voltage
    pub is_electric: bool,
    /// Flare/beam placements
    pub blendable_components: Vec<BlendableComponent>,
}

impl LightDef {
    /// True if any component defines a flare or beam
    pub fn has_blendable_components(&self) -> bool {
        !self.blendable_components.is_empty()
    }
}

/// Tread state for a tread-bearing entity
#[derive(Debug, Clone)]
pub struct TreadDescriptor {
    /// Model whose rollers the tread paths around
    pub path_model: String,
    /// Mount slot on that model
    pub placement_slot: u32,
    /// Requested link spacing
    pub spacing: f64,
    /// Catenary droop constant; 0 disables droop
    pub droop_constant: f64,
    /// Roller chain, in path order
    pub roller_names: Vec<String>,
    /// Cyclic link pattern: object names, one per slot in the cycle
    pub tread_order: Option<Vec<String>>,
    /// Monotonic tread rotation in degrees
    pub rotation: f64,
    /// Offset of the tread part from the model origin
    pub local_offset: Vec3,
    /// Undo `local_offset` before pathing (tread mounted directly on the
    /// vehicle rather than on a sub-part)
    pub undo_local_offset: bool,
    /// Spare-mount treads render as plain objects, not along the path
    pub is_spare: bool,
}

/// Read-only per-frame view of the entity that owns the rendered model
pub trait RenderEntity {
    /// Resolved skin texture identifier
    fn skin_texture(&self) -> &str;

    /// World position, for lighting queries
    fn position(&self) -> Point3;

    /// Packed world lighting state sampled this tick
    fn world_light_value(&self) -> u32;

    /// Electrical system voltage, if the entity has one
    fn electric_power(&self) -> Option<f64>;

    /// Whether light beams should render at all (e.g. player setting or
    /// first-person camera suppression)
    fn should_render_beams(&self) -> bool;

    /// Animation properties for a named object
    fn animated_object(&self, object_name: &str) -> Option<&AnimatedObjectDef>;

    /// Evaluated switchbox for a named object, if it has animations
    fn switchbox(&self, object_name: &str) -> Option<&SwitchboxState>;

    /// Light definition for a named object, if it is a light
    fn light_def(&self, object_name: &str) -> Option<&LightDef>;

    /// Brightness in [0, 1] for a named light
    fn light_brightness(&self, light_name: &str) -> f64;

    /// Current color for a named light
    fn light_color(&self, light_name: &str) -> ColorRgb;

    /// Text fields and their current values
    fn text_entries(&self) -> &[TextEntry];

    /// Tread state when this entity is an active tread part
    fn tread(&self) -> Option<&TreadDescriptor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_fade_alpha_curve() {
        let fade = VisibilityFade {
            value: 5.0,
            clamp_min: 0.0,
            clamp_max: 10.0,
        };
        assert_eq!(fade.alpha(), 0.5);

        let below = VisibilityFade {
            value: -1.0,
            ..fade
        };
        assert_eq!(below.alpha(), 0.0);

        let above = VisibilityFade {
            value: 10.0,
            ..fade
        };
        assert_eq!(above.alpha(), 1.0);
    }

    #[test]
    fn test_visibility_fade_equal_clamps_is_hard_switch() {
        let on = VisibilityFade {
            value: 3.0,
            clamp_min: 3.0,
            clamp_max: 3.0,
        };
        assert_eq!(on.alpha(), 1.0);

        let off = VisibilityFade {
            value: 2.999,
            clamp_min: 3.0,
            clamp_max: 3.0,
        };
        assert_eq!(off.alpha(), 0.0);
    }
}
