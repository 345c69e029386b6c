//! Scene container and loading
//!
//! A `Scene` is a snapshot of the host's objects in enumeration order.
//! It is rebuilt for every export and never mutated by the exporter.

use std::collections::HashSet;
use std::path::Path;

use echo_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::object::{LightKind, ObjectKind, SceneObject};

/// Enumerable list of scene objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Build a scene, rejecting duplicate object names
    pub fn new(objects: Vec<SceneObject>) -> Result<Self> {
        let scene = Self { objects };
        scene.check_unique_names()?;
        Ok(scene)
    }

    /// Load a scene description, choosing the format by file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading scene description");

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let text = std::fs::read_to_string(path).map_err(|e| Error::scene_load(path, e))?;

        let scene: Scene = match ext.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| Error::scene_load(path, e))?,
            "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| Error::scene_load(path, e))?,
            other => {
                return Err(Error::UnsupportedFormat {
                    format: format!("scene description '.{}'", other),
                })
            }
        };

        scene
            .check_unique_names()
            .map_err(|e| Error::scene_load(path, e))?;
        debug!(objects = scene.objects.len(), "Scene loaded");
        Ok(scene)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let scene: Scene =
            serde_json::from_str(text).map_err(|e| Error::scene_load("<json>", e))?;
        scene.check_unique_names()?;
        Ok(scene)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scene: Scene =
            serde_yaml::from_str(text).map_err(|e| Error::scene_load("<yaml>", e))?;
        scene.check_unique_names()?;
        Ok(scene)
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.name.as_str()) {
                return Err(Error::scene_load(
                    "<scene>",
                    format!("duplicate object name '{}'", object.name),
                ));
            }
        }
        Ok(())
    }

    /// Objects of one kind, in enumeration order
    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(move |o| o.kind() == kind)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &SceneObject> {
        self.of_kind(ObjectKind::Mesh)
    }

    pub fn lights(&self) -> impl Iterator<Item = &SceneObject> {
        self.of_kind(ObjectKind::Light)
    }

    /// Lights the renderer can represent
    pub fn point_lights(&self) -> impl Iterator<Item = &SceneObject> {
        self.lights()
            .filter(|o| o.as_light().is_some_and(|l| l.kind == LightKind::Point))
    }

    /// First camera in enumeration order
    pub fn first_camera(&self) -> Option<&SceneObject> {
        self.of_kind(ObjectKind::Camera).next()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
