//! Scene objects
//!
//! Every object has a unique name, a transform and a kind-specific
//! payload. The payload is tagged by `kind` in scene descriptions:
//!
//! ```yaml
//! - name: Cube_1
//!   kind: mesh
//!   transform: { position: [0, 0, 0], rotation: [0, 0, 0], scale: [1, 1, 1] }
//!   material: { nodes: [...], links: [...] }
//! ```

use std::fmt;

use echo_core::{Rgb, Transform};
use serde::{Deserialize, Serialize};

use crate::mesh::MeshData;
use crate::shader::MaterialGraph;

/// Object kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Camera,
    Light,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Mesh => "MESH",
            ObjectKind::Camera => "CAMERA",
            ObjectKind::Light => "LIGHT",
        };
        f.write_str(name)
    }
}

/// Mesh payload
///
/// Geometry is realized on demand by a mesh writer; `geometry` is only
/// present when the scene description carries it inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialGraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<MeshData>,
}

/// Camera payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraObject {
    /// Horizontal field of view in radians
    #[serde(alias = "angle")]
    pub fov: f64,
}

/// Light type as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightKind {
    #[default]
    #[serde(alias = "point")]
    Point,
    #[serde(alias = "sun")]
    Sun,
    #[serde(alias = "spot")]
    Spot,
    #[serde(alias = "area")]
    Area,
}

/// Light payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightObject {
    #[serde(rename = "light_type", default)]
    pub kind: LightKind,
    #[serde(default)]
    pub color: Rgb,
    /// Unit-less light power
    pub energy: f64,
}

/// Kind-specific object payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectData {
    Mesh(MeshObject),
    Camera(CameraObject),
    Light(LightObject),
}

/// A named object in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(flatten)]
    pub data: ObjectData,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, transform: Transform, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            transform,
            data,
        }
    }

    pub fn mesh(name: impl Into<String>, transform: Transform, mesh: MeshObject) -> Self {
        Self::new(name, transform, ObjectData::Mesh(mesh))
    }

    pub fn camera(name: impl Into<String>, transform: Transform, fov: f64) -> Self {
        Self::new(name, transform, ObjectData::Camera(CameraObject { fov }))
    }

    pub fn light(name: impl Into<String>, transform: Transform, light: LightObject) -> Self {
        Self::new(name, transform, ObjectData::Light(light))
    }

    pub fn kind(&self) -> ObjectKind {
        match self.data {
            ObjectData::Mesh(_) => ObjectKind::Mesh,
            ObjectData::Camera(_) => ObjectKind::Camera,
            ObjectData::Light(_) => ObjectKind::Light,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshObject> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&CameraObject> {
        match &self.data {
            ObjectData::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&LightObject> {
        match &self.data {
            ObjectData::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Material graph of a mesh object, if any
    pub fn material(&self) -> Option<&MaterialGraph> {
        self.as_mesh()?.material.as_ref()
    }
}
