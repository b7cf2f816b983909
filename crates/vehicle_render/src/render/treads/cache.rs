//! Shared tread path cache
//!
//! Path generation walks the whole roller chain and is too expensive to
//! redo per entity, so solved point lists are shared: keyed by path model,
//! then mount slot, then the exact requested spacing. Spacing keys use the
//! f64 bit pattern so lookups never do float comparison.

use std::collections::HashMap;
use std::sync::Arc;

use crate::render::entity::TreadDescriptor;
use crate::render::error::RenderError;
use crate::render::renderable::ModelSource;
use crate::render::treads::path::generate_tread_points;
use crate::render::treads::PathPoint;

type SlotPaths = HashMap<u64, Arc<Vec<PathPoint>>>;

/// Cache of solved tread paths
#[derive(Debug, Default)]
pub struct TreadPointCache {
    paths: HashMap<String, HashMap<u32, SlotPaths>>,
}

impl TreadPointCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the path for a descriptor, generating and caching it on first
    /// use.
    pub fn points_for(
        &mut self,
        descriptor: &TreadDescriptor,
        models: &dyn ModelSource,
    ) -> Result<Arc<Vec<PathPoint>>, RenderError> {
        let spacing_key = descriptor.spacing.to_bits();
        if let Some(points) = self
            .paths
            .get(&descriptor.path_model)
            .and_then(|slots| slots.get(&descriptor.placement_slot))
            .and_then(|paths| paths.get(&spacing_key))
        {
            return Ok(points.clone());
        }

        let objects = models.parse_model(&descriptor.path_model)?;
        let points = Arc::new(generate_tread_points(
            &descriptor.path_model,
            &objects,
            descriptor,
        )?);
        self.paths
            .entry(descriptor.path_model.clone())
            .or_default()
            .entry(descriptor.placement_slot)
            .or_default()
            .insert(spacing_key, points.clone());
        Ok(points)
    }

    /// Drop all cached paths for a model. Call when the model is re-parsed
    /// or unloaded.
    pub fn clear_model(&mut self, model_id: &str) {
        if self.paths.remove(model_id).is_some() {
            log::debug!("Cleared cached tread paths for {model_id}");
        }
    }
}
