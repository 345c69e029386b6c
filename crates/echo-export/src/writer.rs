//! Scene file writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use echo_core::{Error, Result};
use tracing::info;

use crate::syntax::Declaration;

/// Concatenate the scene block and the profile block
pub fn render(scene: &Declaration, profile: &Declaration) -> String {
    let mut text = scene.to_block();
    text.push_str(&profile.to_block());
    text
}

/// Truncate `path` and write the scene file.
///
/// No atomic replace: a failure part-way leaves a truncated file.
pub fn write_scene_file(path: &Path, scene: &Declaration, profile: &Declaration) -> Result<()> {
    let text = render(scene, profile);
    let wrap = |source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(wrap)?;
    writer.flush().map_err(wrap)?;

    info!(path = %path.display(), bytes = text.len(), "Scene file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Construct, Value};

    fn declarations() -> (Declaration, Declaration) {
        let scene = Declaration::new("scene", Construct::new("Scene"));
        let profile = Declaration::new(
            "profile",
            Construct::new("EvaluationProfile").assign("MaxEpoch", Value::quoted("20")),
        );
        (scene, profile)
    }

    #[test]
    fn test_render_order() {
        let (scene, profile) = declarations();
        let text = render(&scene, &profile);

        assert_eq!(
            text,
            concat!(
                ":scene = new Scene\n{\n}\n",
                ":profile = new EvaluationProfile\n{\n    .MaxEpoch = \"20\"\n}\n",
            )
        );
    }

    #[test]
    fn test_write_truncates() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("scene.echo");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        let (scene, profile) = declarations();
        write_scene_file(&path, &scene, &profile).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render(&scene, &profile));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing").join("scene.echo");

        let (scene, profile) = declarations();
        let err = write_scene_file(&path, &scene, &profile).unwrap_err();
        assert!(err.is_filesystem_error());
    }
}
