//! Export directory layout
//!
//! An export to `P` produces:
//!
//! ```text
//! P/
//! ├── {basename(P)}     scene file
//! ├── geometries/       one .ply per mesh object
//! └── textures/         reserved
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use echo_core::{Error, Result};
use tracing::{debug, info};

/// Name of the geometry subdirectory
pub const GEOMETRIES_DIR: &str = "geometries";
/// Name of the texture subdirectory
pub const TEXTURES_DIR: &str = "textures";

/// Layout options
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Extension appended to the scene file name when the basename lacks it
    pub scene_extension: Option<String>,
}

impl LayoutOptions {
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            scene_extension: Some(extension.into()),
        }
    }
}

/// Planned export layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub textures_dir: PathBuf,
    pub geometries_dir: PathBuf,
    pub scene_file_name: String,
    pub scene_file_path: PathBuf,
}

impl Layout {
    /// Derive the layout for destination `root` without touching the filesystem
    pub fn plan(root: impl AsRef<Path>, options: &LayoutOptions) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let basename = root
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::InvalidDestination(root.clone()))?;

        let scene_file_name = match options.scene_extension.as_deref() {
            Some(ext) if !basename.ends_with(&format!(".{}", ext)) => {
                format!("{}.{}", basename, ext)
            }
            _ => basename.to_string(),
        };

        Ok(Self {
            textures_dir: root.join(TEXTURES_DIR),
            geometries_dir: root.join(GEOMETRIES_DIR),
            scene_file_path: root.join(&scene_file_name),
            scene_file_name,
            root,
        })
    }

    /// Plan the layout and create its directories
    pub fn create(root: impl AsRef<Path>, options: &LayoutOptions) -> Result<Self> {
        let layout = Self::plan(root, options)?;
        layout.ensure_dirs()?;
        Ok(layout)
    }

    /// Create root, textures and geometries directories if absent.
    ///
    /// Existing directories and the files inside them are left alone.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.root, &self.textures_dir, &self.geometries_dir] {
            ensure_dir(dir)?;
        }
        info!(root = %self.root.display(), "Export layout ready");
        Ok(())
    }

    /// Path of a file inside the geometries directory
    pub fn geometry_path(&self, file_name: &str) -> PathBuf {
        self.geometries_dir.join(file_name)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if dir.is_dir() {
            debug!(dir = %dir.display(), "Directory exists");
            return Ok(());
        }
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    fs::create_dir_all(dir).map_err(|source| Error::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(dir = %dir.display(), "Created directory");
    Ok(())
}
