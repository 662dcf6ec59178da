// SPDX-License-Identifier: MIT OR Apache-2.0
//! The animation document: an ordered list of layers.

use crate::error::{EditError, InvariantError};
use crate::layer::{Layer, LayerId};
use egui::Shape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tisfat_editor_entities::EntityKind;

/// Default frames per second
pub const DEFAULT_FPS: f32 = 10.0;
/// Default canvas width in pixels
pub const DEFAULT_WIDTH: u32 = 460;
/// Default canvas height in pixels
pub const DEFAULT_HEIGHT: u32 = 360;

/// Direction to move a layer in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDirection {
    /// Towards index 0
    Up,
    /// Towards the end
    Down,
}

/// An animation project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Layers; later layers draw on top
    layers: Vec<Layer>,
    /// Frame rate
    pub fps: f32,
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
    /// Number of layers of each entity kind, used for default names
    entity_counts: IndexMap<EntityKind, u32>,
}

impl Project {
    /// Create an empty project
    pub fn new(fps: f32, width: u32, height: u32) -> Self {
        Self {
            layers: Vec::new(),
            fps,
            width,
            height,
            entity_counts: IndexMap::new(),
        }
    }

    /// Get all layers
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Get layer count
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Get a layer
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Get a mutable layer
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Index of a layer in draw order
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Number of layers holding `kind`
    pub fn entity_count(&self, kind: EntityKind) -> u32 {
        self.entity_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Add a layer with a default entity of `kind`, named after its count
    pub fn add_layer(&mut self, kind: EntityKind) -> LayerId {
        let count = self.entity_count(kind) + 1;
        let layer = Layer::new(format!("{} {}", kind.name(), count), kind.create_default());
        self.push_layer(layer)
    }

    /// Append an existing layer
    pub fn push_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        *self.entity_counts.entry(layer.entity.kind()).or_insert(0) += 1;
        tracing::info!("Added layer '{}'", layer.name);
        self.layers.push(layer);
        id
    }

    /// Remove a layer
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, EditError> {
        let idx = self.layer_index(id).ok_or(EditError::LayerNotFound(id))?;
        let layer = self.layers.remove(idx);
        if let Some(count) = self.entity_counts.get_mut(&layer.entity.kind()) {
            *count = count.saturating_sub(1);
        }
        tracing::info!("Removed layer '{}'", layer.name);
        Ok(layer)
    }

    /// Swap a layer with its neighbour
    pub fn move_layer(&mut self, id: LayerId, direction: LayerDirection) -> Result<(), EditError> {
        let idx = self.layer_index(id).ok_or(EditError::LayerNotFound(id))?;
        let target = match direction {
            LayerDirection::Up => idx.checked_sub(1),
            LayerDirection::Down => Some(idx + 1).filter(|&i| i < self.layers.len()),
        }
        .ok_or(EditError::LayerAtEdge)?;
        self.layers.swap(idx, target);
        Ok(())
    }

    /// Earliest frameset start over all layers
    pub fn first_time(&self) -> u32 {
        self.layers.iter().filter_map(|l| l.start_time()).min().unwrap_or(0)
    }

    /// Latest frameset end over all layers
    pub fn last_time(&self) -> u32 {
        self.layers.iter().filter_map(|l| l.end_time()).max().unwrap_or(0)
    }

    /// Draw every visible layer at `time`, bottom layer first
    pub fn draw(&self, time: f32, for_render: bool) -> Vec<Shape> {
        self.layers
            .iter()
            .flat_map(|layer| layer.draw(time, for_render))
            .collect()
    }

    /// Check every layer
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.layers.iter().try_for_each(Layer::validate)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DEFAULT_FPS, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_layer_names_by_kind() {
        let mut project = Project::default();
        let a = project.add_layer(EntityKind::StickFigure);
        let b = project.add_layer(EntityKind::StickFigure);
        let c = project.add_layer(EntityKind::Bitmap);

        assert_eq!(project.layer(a).unwrap().name, "Stick Figure 1");
        assert_eq!(project.layer(b).unwrap().name, "Stick Figure 2");
        assert_eq!(project.layer(c).unwrap().name, "Bitmap 1");
        assert_eq!(project.entity_count(EntityKind::StickFigure), 2);

        project.remove_layer(a).unwrap();
        assert_eq!(project.entity_count(EntityKind::StickFigure), 1);
        assert_eq!(project.layer_count(), 2);
        assert_eq!(project.remove_layer(a), Err(EditError::LayerNotFound(a)));
    }

    #[test]
    fn test_move_layer_edges() {
        let mut project = Project::default();
        let a = project.add_layer(EntityKind::StickFigure);
        let b = project.add_layer(EntityKind::Bitmap);

        assert_eq!(project.move_layer(a, LayerDirection::Up), Err(EditError::LayerAtEdge));
        assert_eq!(project.move_layer(b, LayerDirection::Down), Err(EditError::LayerAtEdge));

        project.move_layer(a, LayerDirection::Down).unwrap();
        assert_eq!(project.layer_index(a), Some(1));
        assert_eq!(project.layer_index(b), Some(0));
    }

    #[test]
    fn test_first_and_last_time() {
        let mut project = Project::default();
        assert_eq!((project.first_time(), project.last_time()), (0, 0));

        let a = project.add_layer(EntityKind::StickFigure);
        let layer = project.layer_mut(a).unwrap();
        let (fs, _) = layer.insert_frameset(30).unwrap();
        let end = layer.frameset(fs).unwrap().keyframes()[1].id;
        layer.move_keyframe(fs, end, 45).unwrap();
        let first = layer.framesets()[0].id;
        layer.move_frameset(first, 5).unwrap();

        project.add_layer(EntityKind::Bitmap);
        assert_eq!(project.first_time(), 0);
        assert_eq!(project.last_time(), 45);
    }

    #[test]
    fn test_project_survives_ron_round_trip() {
        let mut project = Project::default();
        project.add_layer(EntityKind::StickFigure);
        project.add_layer(EntityKind::Bitmap);

        let text = ron::ser::to_string_pretty(&project, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: Project = ron::from_str(&text).unwrap();
        assert_eq!(loaded, project);
        assert_eq!(loaded.entity_count(EntityKind::Bitmap), 1);
    }

    #[test]
    fn test_draw_skips_absent_layers() {
        let mut project = Project::default();
        project.add_layer(EntityKind::Bitmap);
        assert!(!project.draw(5.0, true).is_empty());
        assert!(project.draw(50.0, true).is_empty());
        assert!(project.validate().is_ok());
    }
}
