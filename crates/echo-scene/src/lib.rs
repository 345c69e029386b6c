//! echo-scene
//!
//! Read-only scene graph model handed to the exporter: objects with
//! transforms, shader node graphs, lights, cameras and optional inline
//! mesh data.
//!
//! # Example
//!
//! ```rust,ignore
//! use echo_scene::Scene;
//!
//! let scene = Scene::from_path("scene.yaml")?;
//! for mesh in scene.meshes() {
//!     println!("{}", mesh.name);
//! }
//! ```

pub mod mesh;
pub mod object;
pub mod scene;
pub mod shader;

pub use mesh::MeshData;
pub use object::{
    CameraObject, LightKind, LightObject, MeshObject, ObjectData, ObjectKind, SceneObject,
};
pub use scene::Scene;
pub use shader::{InputValue, MaterialGraph, NodeKind, NodeLink, ShaderNode};
