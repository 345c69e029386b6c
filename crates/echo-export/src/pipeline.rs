//! Export pipeline
//!
//! Runs the stages in dependency order:
//! layout → geometry, materials → scene block → profile block → write.
//! Camera and profile validation happen before anything touches the
//! filesystem.

use std::path::{Path, PathBuf};

use echo_core::{Result, ResultExt};
use echo_scene::Scene;
use serde::Serialize;
use tracing::info;

use crate::assembler::{assemble_scene, select_camera, SCENE_DECLARATION};
use crate::geometry::{GeometryExporter, GeometryFileMap, MeshWriter};
use crate::layout::{Layout, LayoutOptions};
use crate::material::translate_scene;
use crate::profile::ExportProfile;
use crate::writer::{render, write_scene_file};

/// Summary of one export
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub scene_file: PathBuf,
    pub camera: String,
    /// Meshes with geometry and an entity in the scene file
    pub exported_meshes: Vec<String>,
    /// Meshes whose geometry export failed, with the reason
    pub skipped_meshes: Vec<SkippedMesh>,
    /// Meshes emitted without a material, with the reason
    pub unmaterialed_meshes: Vec<SkippedMesh>,
    pub materials: usize,
    pub point_lights: usize,
    pub ignored_lights: usize,
}

/// Object name with the reason it was degraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMesh {
    pub object: String,
    pub reason: String,
}

/// One-shot scene exporter
pub struct Exporter<'w> {
    profile: ExportProfile,
    layout_options: LayoutOptions,
    writer: &'w dyn MeshWriter,
}

impl<'w> Exporter<'w> {
    pub fn new(profile: ExportProfile, writer: &'w dyn MeshWriter) -> Self {
        Self {
            profile,
            layout_options: LayoutOptions::default(),
            writer,
        }
    }

    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout_options = options;
        self
    }

    /// Export `scene` into the folder `destination`
    pub fn export(&self, scene: &Scene, destination: impl AsRef<Path>) -> Result<ExportReport> {
        let destination = destination.as_ref();
        info!(destination = %destination.display(), objects = scene.len(), "Starting export");

        self.profile.validate()?;
        select_camera(scene)?;

        let layout = Layout::create(destination, &self.layout_options)
            .context("preparing export directories")?;

        let geometry = GeometryExporter::new(self.writer).export(scene, &layout);
        let materials = translate_scene(scene);

        let assembly = assemble_scene(scene, &geometry.files, &materials.materials)?;
        let profile = self.profile.to_declaration(SCENE_DECLARATION);

        write_scene_file(&layout.scene_file_path, &assembly.declaration, &profile)
            .context("writing scene file")?;

        let report = ExportReport {
            scene_file: layout.scene_file_path,
            camera: assembly.camera,
            exported_meshes: assembly.meshes,
            skipped_meshes: geometry
                .skipped
                .into_iter()
                .map(|(object, reason)| SkippedMesh { object, reason })
                .collect(),
            unmaterialed_meshes: materials
                .skipped
                .into_iter()
                .map(|(object, reason)| SkippedMesh { object, reason: reason.to_string() })
                .collect(),
            materials: assembly.materials,
            point_lights: assembly.point_lights,
            ignored_lights: assembly.ignored_lights,
        };

        info!(
            scene_file = %report.scene_file.display(),
            meshes = report.exported_meshes.len(),
            skipped = report.skipped_meshes.len(),
            "Export complete"
        );
        Ok(report)
    }
}

/// Compile `scene` to echo text without writing anything.
///
/// Every mesh is assumed to have its geometry file.
pub fn compile(scene: &Scene, profile: &ExportProfile) -> Result<String> {
    profile.validate()?;

    let files = GeometryFileMap::assumed(scene);
    let materials = translate_scene(scene);
    let assembly = assemble_scene(scene, &files, &materials.materials)?;

    Ok(render(&assembly.declaration, &profile.to_declaration(SCENE_DECLARATION)))
}
