//! Inline mesh geometry
//!
//! Hosts normally realize geometry on demand through their own mesh
//! writer. Scene descriptions may instead carry the polygons inline so
//! the bundled PLY writer can produce the geometry files.

use serde::{Deserialize, Serialize};

/// Polygon mesh in object-local coordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<[f64; 3]>,
    /// Polygons as vertex index lists
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check that every face has at least three corners and only
    /// references existing vertices.
    pub fn validate(&self) -> Result<(), String> {
        let count = self.vertices.len();
        for (i, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(format!("face {} has {} corners", i, face.len()));
            }
            if let Some(&bad) = face.iter().find(|&&index| index as usize >= count) {
                return Err(format!("face {} references vertex {} of {}", i, bad, count));
            }
        }
        Ok(())
    }
}
