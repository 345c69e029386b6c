//! Echo Export Pipeline
//!
//! Compiles a scene snapshot into an Echo renderer scene folder:
//! - Layout planning (`{root}/{name}`, `geometries/`, `textures/`)
//! - Geometry export through a [`MeshWriter`] (PLY bundled)
//! - Material translation from shader node graphs
//! - Scene and evaluation-profile blocks in echo syntax

pub mod assembler;
pub mod geometry;
pub mod layout;
pub mod material;
pub mod pipeline;
pub mod ply;
pub mod profile;
pub mod syntax;
pub mod writer;

pub use assembler::{assemble_scene, SceneAssembly};
pub use geometry::{GeometryExporter, GeometryFileMap, MeshWriter, Selection};
pub use layout::{Layout, LayoutOptions};
pub use material::{translate_scene, MaterialDeclarationMap, MaterialKind, SkipReason};
pub use pipeline::{compile, ExportReport, Exporter};
pub use ply::PlyWriter;
pub use profile::{EvaluatorKind, ExportProfile, PatternKind};
