//! ASCII PLY mesh writer
//!
//! Writes the inline geometry of the selected object as PLY 1.0:
//!
//! ```text
//! ply
//! format ascii 1.0
//! element vertex N
//! property float x ...
//! element face M
//! property list uchar int vertex_indices
//! end_header
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use echo_core::{Error, Result};
use echo_scene::MeshData;

use crate::geometry::{MeshWriter, Selection};
use crate::syntax::number;

/// Writes scene-embedded mesh data as ASCII PLY
#[derive(Debug, Clone, Default)]
pub struct PlyWriter {
    /// Optional comment line placed in the header
    pub comment: Option<String>,
}

impl PlyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
        }
    }

    /// Serialize `mesh` into `out`
    pub fn write_mesh<W: Write>(&self, mesh: &MeshData, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "ply")?;
        writeln!(out, "format ascii 1.0")?;
        if let Some(comment) = &self.comment {
            writeln!(out, "comment {}", comment.replace('\n', " "))?;
        }
        writeln!(out, "element vertex {}", mesh.vertex_count())?;
        writeln!(out, "property float x")?;
        writeln!(out, "property float y")?;
        writeln!(out, "property float z")?;
        writeln!(out, "element face {}", mesh.face_count())?;
        writeln!(out, "property list uchar int vertex_indices")?;
        writeln!(out, "end_header")?;

        for [x, y, z] in &mesh.vertices {
            writeln!(out, "{} {} {}", number(*x), number(*y), number(*z))?;
        }

        for face in &mesh.faces {
            write!(out, "{}", face.len())?;
            for index in face {
                write!(out, " {}", index)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

impl MeshWriter for PlyWriter {
    fn write_selected(&self, selection: &Selection<'_>, path: &Path) -> Result<()> {
        let object = selection.object();
        let mesh = object
            .as_mesh()
            .and_then(|m| m.geometry.as_ref())
            .ok_or_else(|| Error::MissingGeometry {
                object: object.name.clone(),
            })?;

        mesh.validate().map_err(|message| Error::MeshWrite {
            object: object.name.clone(),
            message,
        })?;

        // PLY face lists use a uchar count
        if let Some(face) = mesh.faces.iter().find(|f| f.len() > usize::from(u8::MAX)) {
            return Err(Error::MeshWrite {
                object: object.name.clone(),
                message: format!("face with {} corners exceeds PLY list limit", face.len()),
            });
        }

        let file = File::create(path).map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        self.write_mesh(mesh, &mut writer)
            .and_then(|()| writer.flush())
            .map_err(|source| Error::WriteFile {
                path: path.to_path_buf(),
                source,
            })
    }

    fn name(&self) -> &str {
        "ply"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.5, 0.0]],
            faces: vec![vec![0, 1, 2, 3]],
        }
    }

    #[test]
    fn test_write_mesh() {
        let mut out = Vec::new();
        PlyWriter::new().write_mesh(&quad(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "ply\n\
format ascii 1.0\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 0 0\n\
1 1 0\n\
0 1.5 0\n\
4 0 1 2 3\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_header_comment() {
        let mut out = Vec::new();
        PlyWriter::with_comment("Cube_1").write_mesh(&quad(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("format ascii 1.0\ncomment Cube_1\n"));
    }
}
