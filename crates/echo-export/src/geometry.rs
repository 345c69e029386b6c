//! Geometry export
//!
//! Hosts export meshes through a routine that acts on the "current
//! selection", a process-wide piece of state. The exporter models that as
//! a [`Selection`] token which only exists while the exporter holds its
//! selection lock, so at most one object is ever selected for writing.

use std::collections::HashMap;
use std::path::{Component, Path};

use echo_core::{Error, Result};
use echo_scene::{Scene, SceneObject};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::layout::Layout;

/// Extension of exported geometry files
pub const GEOMETRY_EXTENSION: &str = "ply";

/// Exclusive selection of a single object
///
/// Created by [`GeometryExporter`] for the duration of one
/// select → export → deselect sequence.
pub struct Selection<'a> {
    object: &'a SceneObject,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> Selection<'a> {
    pub fn object(&self) -> &'a SceneObject {
        self.object
    }
}

/// Capability that realizes the selected object's geometry as a file
pub trait MeshWriter: Send + Sync {
    /// Write the selected object's geometry to `path`
    fn write_selected(&self, selection: &Selection<'_>, path: &Path) -> Result<()>;

    /// Human-readable writer name for logs
    fn name(&self) -> &str;
}

/// Object name → geometry file name relative to the geometries directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryFileMap {
    files: HashMap<String, String>,
}

impl GeometryFileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: impl Into<String>, file: impl Into<String>) {
        self.files.insert(object.into(), file.into());
    }

    pub fn get(&self, object: &str) -> Option<&str> {
        self.files.get(object).map(String::as_str)
    }

    pub fn contains(&self, object: &str) -> bool {
        self.files.contains_key(object)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Map every mesh object of `scene` to its conventional file name
    /// without writing anything
    pub fn assumed(scene: &Scene) -> Self {
        let mut map = Self::new();
        for object in scene.meshes().filter(|o| is_plain_file_name(&o.name)) {
            map.insert(&object.name, geometry_file_name(&object.name));
        }
        map
    }
}

/// `{name}.ply`
pub fn geometry_file_name(object_name: &str) -> String {
    format!("{}.{}", object_name, GEOMETRY_EXTENSION)
}

/// True when `name` is a single normal path component, so the file
/// derived from it stays inside the geometries directory
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part == name,
        _ => false,
    }
}

fn check_object_name(object: &SceneObject) -> Result<()> {
    if is_plain_file_name(&object.name) {
        Ok(())
    } else {
        Err(Error::MeshWrite {
            object: object.name.clone(),
            message: "object name is not usable as a file name".to_string(),
        })
    }
}

/// Outcome of a geometry export pass
#[derive(Debug, Clone, Default)]
pub struct GeometryOutcome {
    pub files: GeometryFileMap,
    /// Mesh objects in export order whose geometry was written
    pub exported: Vec<String>,
    /// Mesh objects that failed, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Exports each mesh object through a [`MeshWriter`]
pub struct GeometryExporter<'w> {
    writer: &'w dyn MeshWriter,
    selection: Mutex<()>,
}

impl<'w> GeometryExporter<'w> {
    pub fn new(writer: &'w dyn MeshWriter) -> Self {
        Self {
            writer,
            selection: Mutex::new(()),
        }
    }

    /// Export every mesh object in scene order.
    ///
    /// A writer failure or an object name unusable as a file name skips
    /// that object and the pass continues.
    pub fn export(&self, scene: &Scene, layout: &Layout) -> GeometryOutcome {
        let mut outcome = GeometryOutcome::default();
        info!(writer = self.writer.name(), "Exporting geometry");

        for object in scene.meshes() {
            let file_name = geometry_file_name(&object.name);
            let path = layout.geometry_path(&file_name);

            match check_object_name(object).and_then(|()| self.export_one(object, &path)) {
                Ok(()) => {
                    debug!(object = %object.name, path = %path.display(), "Geometry written");
                    outcome.files.insert(&object.name, file_name);
                    outcome.exported.push(object.name.clone());
                }
                Err(e) => {
                    warn!(
                        object = %object.name,
                        error = %e,
                        "Skipping mesh, geometry export failed"
                    );
                    outcome.skipped.push((object.name.clone(), e.to_string()));
                }
            }
        }

        info!(
            exported = outcome.exported.len(),
            skipped = outcome.skipped.len(),
            "Geometry export complete"
        );
        outcome
    }

    fn export_one(&self, object: &SceneObject, path: &Path) -> Result<()> {
        let selection = Selection {
            object,
            _guard: self.selection.lock(),
        };
        // Dropping the selection releases the lock, i.e. deselects
        self.writer.write_selected(&selection, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutOptions;
    use echo_core::Transform;
    use echo_scene::MeshObject;

    /// Records selections instead of writing files
    struct RecordingWriter {
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl MeshWriter for RecordingWriter {
        fn write_selected(&self, selection: &Selection<'_>, _path: &Path) -> Result<()> {
            let name = &selection.object().name;
            self.seen.lock().push(name.clone());
            if Some(name.as_str()) == self.fail_on {
                return Err(Error::MeshWrite {
                    object: name.clone(),
                    message: "boom".into(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn scene() -> Scene {
        Scene::new(vec![
            SceneObject::mesh("A", Transform::IDENTITY, MeshObject::default()),
            SceneObject::camera("Camera", Transform::IDENTITY, 0.8),
            SceneObject::mesh("B", Transform::IDENTITY, MeshObject::default()),
            SceneObject::mesh("C", Transform::IDENTITY, MeshObject::default()),
        ])
        .unwrap()
    }

    #[test]
    fn test_exports_meshes_in_scene_order() {
        let writer = RecordingWriter { seen: Mutex::new(Vec::new()), fail_on: None };
        let layout = Layout::plan("/tmp/scene", &LayoutOptions::default()).unwrap();

        let outcome = GeometryExporter::new(&writer).export(&scene(), &layout);

        assert_eq!(*writer.seen.lock(), ["A", "B", "C"]);
        assert_eq!(outcome.files.get("B"), Some("B.ply"));
        assert_eq!(outcome.files.len(), 3);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_failure_skips_object() {
        let writer = RecordingWriter { seen: Mutex::new(Vec::new()), fail_on: Some("B") };
        let layout = Layout::plan("/tmp/scene", &LayoutOptions::default()).unwrap();

        let outcome = GeometryExporter::new(&writer).export(&scene(), &layout);

        assert_eq!(outcome.exported, ["A", "C"]);
        assert!(!outcome.files.contains("B"));
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].1.contains("boom"));
    }

    #[test]
    fn test_escaping_names_are_skipped() {
        let writer = RecordingWriter { seen: Mutex::new(Vec::new()), fail_on: None };
        let layout = Layout::plan("/tmp/scene", &LayoutOptions::default()).unwrap();
        let scene = Scene::new(vec![
            SceneObject::mesh("../../outside", Transform::IDENTITY, MeshObject::default()),
            SceneObject::mesh("dir/inner", Transform::IDENTITY, MeshObject::default()),
            SceneObject::mesh("A", Transform::IDENTITY, MeshObject::default()),
        ])
        .unwrap();

        let outcome = GeometryExporter::new(&writer).export(&scene, &layout);

        assert_eq!(*writer.seen.lock(), ["A"]);
        assert_eq!(outcome.exported, ["A"]);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].0, "../../outside");
        assert!(!GeometryFileMap::assumed(&scene).contains("../../outside"));
    }

    #[test]
    fn test_is_plain_file_name() {
        assert!(is_plain_file_name("Cube_1"));
        assert!(is_plain_file_name("Cube.001"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name("a/b"));
        assert!(!is_plain_file_name("a/."));
        assert!(!is_plain_file_name("/abs"));
    }

    #[test]
    fn test_assumed_map() {
        let map = GeometryFileMap::assumed(&scene());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("C"), Some("C.ply"));
        assert!(!map.contains("Camera"));
    }
}
