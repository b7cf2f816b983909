//! Model object render pipeline
//!
//! One [`ModelObject`] wraps each named sub-mesh of an entity's model and
//! carries the derived geometry that object needs (interior window panes,
//! light overlays). Each frame the host calls [`ModelObject::render`] twice
//! per object, once for the solid pass and once for the blend pass; the
//! object decides what to draw from the entity's per-frame state.

use crate::foundation::math::Mat4;
use crate::render::api::RenderBackend;
use crate::render::entity::{RenderEntity, TreadDescriptor};
use crate::render::error::RenderError;
use crate::render::lights::{
    electric_dimming, generate_beams, generate_color_overlay, generate_cover_overlay,
    generate_flares, GLASS_TEXTURE,
};
use crate::render::renderable::{ModelSource, RenderableObject};
use crate::render::settings::RenderSettings;
use crate::render::textures::TextureStore;
use crate::render::treads::{render_treads, TreadPointCache};

const WINDOW_NAME_MARKER: &str = "window";
const ONLINE_TEXTURE_MARKER: &str = "url";
const LIGHT_NAME_MARKER: char = '&';
const INTERIOR_WINDOW_SUFFIX: &str = "_interior";

/// How an object's name classifies it, decided once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Regular skin-textured geometry
    Plain,
    /// Glass window pane
    Window,
    /// Texture comes from a player-supplied URL
    OnlineTexture,
    /// Light-emitting object with a light definition
    Light,
}

impl ObjectKind {
    /// Classify an object by its model name.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.starts_with(LIGHT_NAME_MARKER) {
            ObjectKind::Light
        } else if lower.contains(WINDOW_NAME_MARKER) {
            ObjectKind::Window
        } else if lower.starts_with(ONLINE_TEXTURE_MARKER) || lower.ends_with(ONLINE_TEXTURE_MARKER)
        {
            ObjectKind::OnlineTexture
        } else {
            ObjectKind::Plain
        }
    }
}

/// Everything external the pipeline touches while rendering one frame.
pub struct RenderContext<'a> {
    /// Host rendering backend
    pub backend: &'a mut dyn RenderBackend,
    /// Client render settings
    pub settings: &'a RenderSettings,
    /// Online texture state
    pub textures: &'a mut TextureStore,
    /// Shared tread paths
    pub tread_cache: &'a mut TreadPointCache,
    /// Model geometry source, for tread path generation
    pub models: &'a dyn ModelSource,
}

/// A renderable sub-mesh plus its derived geometry.
pub struct ModelObject {
    object: RenderableObject,
    kind: ObjectKind,
    interior_window: Option<RenderableObject>,
    color_overlay: Option<RenderableObject>,
    cover: Option<RenderableObject>,
    flares: Option<RenderableObject>,
    beams: Option<RenderableObject>,
}

impl ModelObject {
    /// Wrap a parsed object, deriving windows and light geometry from the
    /// entity's definitions.
    pub fn new(mut object: RenderableObject, entity: &dyn RenderEntity) -> Self {
        let kind = ObjectKind::classify(&object.name);
        let mut interior_window = None;
        let mut color_overlay = None;
        let mut cover = None;
        let mut flares = None;
        let mut beams = None;

        match kind {
            ObjectKind::Window => {
                // Windows swap the authored texture for shared glass, so
                // their UVs must collapse into the unit square.
                object.texture = GLASS_TEXTURE.to_string();
                object.normalize_uvs();
                object.is_translucent = true;
                interior_window = Some(object.reversed(INTERIOR_WINDOW_SUFFIX));
            }
            ObjectKind::Light => {
                // Beam meshes are standalone light geometry and derive
                // nothing.
                if let Some(def) = entity.light_def(&object.name).filter(|def| !def.is_beam) {
                    if def.emissive {
                        color_overlay = Some(generate_color_overlay(&object));
                    }
                    if def.covered {
                        cover = Some(generate_cover_overlay(&object));
                    }
                    let flare_components: Vec<_> = def
                        .blendable_components
                        .iter()
                        .filter(|component| component.flare_height > 0.0)
                        .cloned()
                        .collect();
                    if !flare_components.is_empty() {
                        flares = Some(generate_flares(&flare_components));
                    }
                    let beam_components: Vec<_> = def
                        .blendable_components
                        .iter()
                        .filter(|component| component.beam_diameter > 0.0)
                        .cloned()
                        .collect();
                    if !beam_components.is_empty() {
                        beams = Some(generate_beams(&beam_components));
                    }
                }
            }
            ObjectKind::Plain | ObjectKind::OnlineTexture => {}
        }

        Self {
            object,
            kind,
            interior_window,
            color_overlay,
            cover,
            flares,
            beams,
        }
    }

    /// The wrapped object's name
    pub fn name(&self) -> &str {
        &self.object.name
    }

    /// How the object was classified
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn url_for<'a>(&self, entity: &'a dyn RenderEntity) -> Option<&'a str> {
        entity
            .text_entries()
            .iter()
            .find(|entry| {
                entry
                    .def
                    .field_name
                    .as_deref()
                    .map_or(false, |field| self.object.name.contains(field))
            })
            .map(|entry| entry.value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Visibility and transform for this frame, from the object's own
    /// switchbox chained after its `apply_after` dependency.
    ///
    /// Returns `None` when animations hide the object. The alpha is 1
    /// except for blended visibility animations, which fade only on the
    /// blend pass; the solid pass stays fully opaque.
    fn evaluate_animation(
        &self,
        entity: &dyn RenderEntity,
        blend_pass: bool,
    ) -> Result<Option<(Mat4, f32)>, RenderError> {
        let mut transform = Mat4::identity();
        let mut alpha = 1.0f32;
        let animation = entity.animated_object(&self.object.name);

        if let Some(dependency) = animation.and_then(|def| def.apply_after.as_deref()) {
            let parent =
                entity
                    .switchbox(dependency)
                    .ok_or_else(|| RenderError::MissingApplyAfter {
                        object: self.object.name.clone(),
                        dependency: dependency.to_string(),
                    })?;
            if !parent.visible {
                return Ok(None);
            }
            transform *= parent.net_matrix;
        }

        if let Some(switchbox) = entity.switchbox(&self.object.name) {
            let blended = animation.map(|def| def.blended_animations).unwrap_or(false);
            if blended {
                if blend_pass {
                    if let Some(fade) = &switchbox.visibility {
                        alpha = fade.alpha();
                        if alpha == 0.0 {
                            return Ok(None);
                        }
                    }
                }
            } else if !switchbox.visible {
                return Ok(None);
            }
            transform *= switchbox.net_matrix;
        }
        Ok(Some((transform, alpha)))
    }

    /// Whether this object would draw anything this frame, ignoring the
    /// solid/blend pass split.
    pub fn should_render(
        &self,
        entity: &dyn RenderEntity,
        settings: &RenderSettings,
    ) -> Result<bool, RenderError> {
        if self.kind == ObjectKind::Window && !settings.render_windows {
            return Ok(false);
        }
        if self.kind == ObjectKind::OnlineTexture && self.url_for(entity).is_none() {
            return Ok(false);
        }
        Ok(self.evaluate_animation(entity, false)?.is_some())
    }

    /// Render this object for one pass.
    ///
    /// `blend_pass` is false for the solid pass and true for the blended
    /// pass; the host calls both each frame.
    pub fn render(
        &mut self,
        entity: &dyn RenderEntity,
        blend_pass: bool,
        context: &mut RenderContext<'_>,
    ) -> Result<(), RenderError> {
        if !self.should_render(entity, context.settings)? {
            return Ok(());
        }
        let (transform, alpha) = match self.evaluate_animation(entity, blend_pass)? {
            Some(state) => state,
            None => return Ok(()),
        };

        // Texture resolution.
        match self.kind {
            ObjectKind::OnlineTexture => {
                let url = match self.url_for(entity) {
                    Some(url) => url.to_string(),
                    None => return Ok(()),
                };
                context.textures.request(&url);
                if !context.textures.is_bound(&url) {
                    // Still downloading; draw nothing rather than flicker
                    // an unbound texture.
                    return Ok(());
                }
                self.object.texture = url;
            }
            ObjectKind::Plain => {
                self.object.texture = entity.skin_texture().to_string();
            }
            ObjectKind::Window => {}
            ObjectKind::Light => {
                self.object.texture = entity.skin_texture().to_string();
            }
        }

        self.object.transform = transform;
        self.object.set_alpha(alpha);

        let world_light = entity.world_light_value();
        let light_def = if self.kind == ObjectKind::Light {
            entity.light_def(&self.object.name)
        } else {
            None
        };
        let brightness = light_def
            .map(|def| {
                let level = entity.light_brightness(&def.name);
                match (def.is_electric, entity.electric_power()) {
                    (true, Some(power)) => electric_dimming(level, power),
                    _ => level,
                }
            })
            .unwrap_or(0.0);
        let lit = brightness > 0.0;
        self.object.set_lighting(
            world_light,
            lit && context.settings.bright_lights,
            false,
        );

        // A beam mesh takes the brightness-blended path only while beams
        // are enabled; otherwise it falls back to normal rendering with its
        // authored translucency.
        let beam_active =
            light_def.map_or(false, |def| def.is_beam) && entity.should_render_beams();
        if beam_active {
            let ambient = context.backend.query_ambient_brightness(&entity.position());
            let blended_alpha = (((1.0 - ambient) * brightness).min(1.0)) as f32;
            if blended_alpha == 0.0 {
                return Ok(());
            }
            self.object.set_alpha(alpha * blended_alpha);
            self.object
                .set_blending(context.settings.blended_lights);
        }

        // Base geometry. Treads only render on the solid pass.
        let translucent = self.object.is_translucent || beam_active;
        if translucent == blend_pass {
            if let Some(tread) = entity
                .tread()
                .filter(|tread| !blend_pass && !tread.is_spare)
            {
                self.render_along_tread_path(tread, context)?;
            } else {
                self.object.render(context.backend)?;
            }

            if !blend_pass {
                for entry in entity.text_entries() {
                    if entry.def.attached_to.as_deref() == Some(self.object.name.as_str())
                        && !entry.value.is_empty()
                    {
                        context
                            .backend
                            .draw_text(&entry.value, &self.object.transform, &entry.def)?;
                    }
                }
            }
        }

        if blend_pass && context.settings.inner_windows {
            if let Some(interior) = &mut self.interior_window {
                interior.transform = transform;
                interior.set_alpha(alpha);
                interior.render(context.backend)?;
            }
        }

        // Beam meshes are their own light geometry; only non-beam lights
        // get the derived overlay treatment.
        if let Some(def) = light_def.filter(|def| !def.is_beam) {
            self.render_light_extras(
                entity,
                def.has_blendable_components(),
                brightness,
                &transform,
                blend_pass,
                context,
            )?;
        }
        Ok(())
    }

    fn render_along_tread_path(
        &mut self,
        tread: &TreadDescriptor,
        context: &mut RenderContext<'_>,
    ) -> Result<(), RenderError> {
        let points = context.tread_cache.points_for(tread, context.models)?;
        render_treads(&mut self.object, &points, tread, context.backend)
    }

    fn render_light_extras(
        &mut self,
        entity: &dyn RenderEntity,
        has_components: bool,
        brightness: f64,
        transform: &Mat4,
        blend_pass: bool,
        context: &mut RenderContext<'_>,
    ) -> Result<(), RenderError> {
        let world_light = entity.world_light_value();

        // Covers are part of the housing: they draw on the solid pass even
        // when the light is off, lit up only while it is on.
        if !blend_pass {
            if let Some(cover) = &mut self.cover {
                cover.transform = *transform;
                cover.set_lighting(
                    world_light,
                    brightness > 0.0 && context.settings.bright_lights,
                    false,
                );
                cover.render(context.backend)?;
            }
            return Ok(());
        }

        if brightness <= 0.0 {
            return Ok(());
        }

        if let Some(overlay) = &mut self.color_overlay {
            overlay.transform = *transform;
            overlay.set_color(entity.light_color(&self.object.name));
            overlay.set_alpha(brightness as f32);
            overlay.set_lighting(world_light, true, false);
            overlay.render(context.backend)?;
        }

        if has_components && context.settings.blended_lights {
            let ambient = context.backend.query_ambient_brightness(&entity.position());
            let blended_alpha = (((1.0 - ambient) * brightness).min(1.0)) as f32;
            if blended_alpha == 0.0 {
                return Ok(());
            }
            if let Some(flares) = &mut self.flares {
                flares.transform = *transform;
                flares.set_alpha(blended_alpha);
                flares.set_lighting(world_light, true, false);
                flares.render(context.backend)?;
            }
            if entity.should_render_beams() {
                if let Some(beams) = &mut self.beams {
                    beams.transform = *transform;
                    beams.set_alpha(blended_alpha);
                    beams.set_lighting(world_light, true, true);
                    beams.render(context.backend)?;
                }
            }
        }
        Ok(())
    }

    /// Release all cached GPU buffers this object and its derived geometry
    /// hold.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.object.destroy(backend);
        for derived in [
            &mut self.interior_window,
            &mut self.color_overlay,
            &mut self.cover,
            &mut self.flares,
            &mut self.beams,
        ]
        .into_iter()
        .flatten()
        {
            derived.destroy(backend);
        }
    }
}
