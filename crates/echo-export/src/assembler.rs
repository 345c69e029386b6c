//! Scene block assembly
//!
//! Builds the `Scene` declaration: material declarations first, then
//! one entity per exported mesh, the camera, and the point lights.

use echo_core::{round_degrees, Error, Result, Transform};
use echo_scene::{Scene, SceneObject};
use tracing::{debug, info};

use crate::geometry::GeometryFileMap;
use crate::layout::GEOMETRIES_DIR;
use crate::material::{MaterialDeclarationMap, POWER_DIVISOR};
use crate::syntax::{hdr, int_tuple, number, tuple, Construct, Declaration, Statement, Value};

/// Name of the scene declaration
pub const SCENE_DECLARATION: &str = "scene";

/// Assembled scene block and what went into it
#[derive(Debug, Clone)]
pub struct SceneAssembly {
    pub declaration: Declaration,
    /// Name of the camera object used
    pub camera: String,
    /// Mesh objects that got an entity, in scene order
    pub meshes: Vec<String>,
    pub materials: usize,
    pub point_lights: usize,
    /// Lights of kinds the renderer cannot represent
    pub ignored_lights: usize,
}

/// Relative path of a geometry file as referenced from the scene file
pub fn geometry_reference(file_name: &str) -> String {
    format!("./{}/{}", GEOMETRIES_DIR, file_name)
}

/// Check the scene has a camera, returning the first one
pub fn select_camera(scene: &Scene) -> Result<&SceneObject> {
    scene.first_camera().ok_or(Error::MissingCamera)
}

/// Build the scene declaration
pub fn assemble_scene(
    scene: &Scene,
    files: &GeometryFileMap,
    materials: &MaterialDeclarationMap,
) -> Result<SceneAssembly> {
    let camera = select_camera(scene)?;
    let mut block = Construct::new("Scene");

    for (_, decl) in materials.iter() {
        block.push(decl.to_statement());
    }

    let mut meshes = Vec::new();
    for object in scene.meshes() {
        let Some(file) = files.get(&object.name) else {
            debug!(object = %object.name, "No geometry file, entity omitted");
            continue;
        };

        let mut entity = Construct::new("MeshEntity")
            .assign("Mesh", Construct::new("Mesh").arg(geometry_reference(file)));
        if let Some(decl) = materials.get(&object.name) {
            entity = entity.assign("Material", Value::link(&decl.name));
        }
        let entity = with_placement(entity, &object.transform)
            .assign("Scale", Value::quoted(number(object.transform.uniform_scale())));

        block.push(Statement::Add(entity));
        meshes.push(object.name.clone());
    }

    block.push(Statement::Add(camera_entity(camera)));

    let mut point_lights = 0;
    for object in scene.point_lights() {
        let Some(light) = object.as_light() else {
            continue;
        };
        let intensity = light.color.to_array().map(|c| c * light.energy / POWER_DIVISOR);
        let entity = Construct::new("PointLight")
            .assign("Intensity", Value::quoted(hdr(&intensity)))
            .assign("Position", Value::quoted(tuple(&object.transform.position.to_array())));
        block.push(Statement::Add(entity));
        point_lights += 1;
    }

    let ignored_lights = scene.lights().count() - point_lights;
    if ignored_lights > 0 {
        debug!(ignored_lights, "Lights of unsupported kinds ignored");
    }

    info!(
        materials = materials.len(),
        meshes = meshes.len(),
        camera = %camera.name,
        point_lights,
        "Scene assembled"
    );

    Ok(SceneAssembly {
        declaration: Declaration::new(SCENE_DECLARATION, block),
        camera: camera.name.clone(),
        meshes,
        materials: materials.len(),
        point_lights,
        ignored_lights,
    })
}

fn camera_entity(camera: &SceneObject) -> Construct {
    let fov = camera.as_camera().map(|c| round_degrees(c.fov)).unwrap_or_default();
    with_placement(Construct::new("Camera").arg(fov.to_string()), &camera.transform)
}

/// Position and rotation in whole degrees
fn with_placement(construct: Construct, transform: &Transform) -> Construct {
    construct
        .assign("Position", Value::quoted(tuple(&transform.position.to_array())))
        .assign("Rotation", Value::quoted(int_tuple(&transform.rotation_degrees())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;
    use echo_core::{Rgb, Rgba, Vec3};
    use echo_scene::{LightKind, LightObject, MeshObject};
    use std::f64::consts::PI;

    fn camera() -> SceneObject {
        SceneObject::camera("Camera", Transform::IDENTITY, 50.0_f64.to_radians())
    }

    fn assemble_empty(scene: &Scene) -> SceneAssembly {
        assemble_scene(scene, &GeometryFileMap::new(), &MaterialDeclarationMap::new()).unwrap()
    }

    fn lines(assembly: &SceneAssembly) -> Vec<String> {
        assembly.declaration.value.body.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_scene_has_camera_and_lights() {
        let lamp = SceneObject::light(
            "Lamp",
            Transform { position: Vec3::new(0.0, 5.0, 0.0), ..Transform::IDENTITY },
            LightObject { kind: LightKind::Point, color: Rgb::WHITE, energy: 10.0 },
        );
        let scene = Scene::new(vec![camera(), lamp]).unwrap();

        let assembly = assemble_empty(&scene);

        assert_eq!(
            lines(&assembly),
            [
                r#".Add(new Camera("50") {.Position = "0 0 0" .Rotation = "0 0 0"})"#,
                r#".Add(new PointLight {.Intensity = "hdr(1,1,1)" .Position = "0 5 0"})"#,
            ]
        );
        assert!(assembly.meshes.is_empty());
    }

    #[test]
    fn test_mesh_entity_rotation_and_scale() {
        let transform = Transform {
            position: Vec3::new(1.0, -2.5, 3.0),
            rotation: Vec3::new(PI / 2.0, 0.0, PI),
            scale: Vec3::new(2.0, 7.0, 9.0),
        };
        let scene = Scene::new(vec![
            SceneObject::mesh("Cube_1", transform, MeshObject::default()),
            camera(),
        ])
        .unwrap();

        let mut materials = MaterialDeclarationMap::new();
        materials.insert("Cube_1", MaterialKind::Matte { albedo: Rgba::new(1.0, 0.0, 0.0, 1.0) });

        let files = GeometryFileMap::assumed(&scene);
        let assembly = assemble_scene(&scene, &files, &materials).unwrap();
        let lines = lines(&assembly);

        assert_eq!(lines[0], r#":materialCube1 = new Matte {.Albedo = new Pure("hdr(1,0,0,1)")}"#);
        assert_eq!(
            lines[1],
            concat!(
                r#".Add(new MeshEntity {.Mesh = new Mesh("./geometries/Cube_1.ply") "#,
                r#".Material = link :materialCube1 .Position = "1 -2.5 3" "#,
                r#".Rotation = "90 0 180" .Scale = "2"})"#,
            )
        );
    }

    #[test]
    fn test_missing_material_omits_link() {
        let scene = Scene::new(vec![
            SceneObject::mesh("Plain", Transform::IDENTITY, MeshObject::default()),
            camera(),
        ])
        .unwrap();

        let files = GeometryFileMap::assumed(&scene);
        let assembly = assemble_scene(&scene, &files, &MaterialDeclarationMap::new()).unwrap();

        assert!(!lines(&assembly)[0].contains(".Material"));
        assert_eq!(assembly.meshes, ["Plain"]);
    }

    #[test]
    fn test_mesh_without_geometry_file_is_omitted() {
        let scene = Scene::new(vec![
            SceneObject::mesh("Broken", Transform::IDENTITY, MeshObject::default()),
            camera(),
        ])
        .unwrap();

        let assembly = assemble_empty(&scene);

        assert!(assembly.meshes.is_empty());
        assert_eq!(lines(&assembly).len(), 1);
    }

    #[test]
    fn test_missing_camera_is_fatal() {
        let mesh = SceneObject::mesh("A", Transform::IDENTITY, MeshObject::default());
        let scene = Scene::new(vec![mesh]).unwrap();

        let files = GeometryFileMap::assumed(&scene);
        let err = assemble_scene(&scene, &files, &MaterialDeclarationMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingCamera));
    }

    #[test]
    fn test_first_camera_and_ignored_lights() {
        let sun = SceneObject::light(
            "Sun",
            Transform::IDENTITY,
            LightObject { kind: LightKind::Sun, color: Rgb::WHITE, energy: 3.0 },
        );
        let other = SceneObject::camera("Other", Transform::IDENTITY, 1.0);
        let scene = Scene::new(vec![sun, camera(), other]).unwrap();

        let assembly = assemble_empty(&scene);

        assert_eq!(assembly.camera, "Camera");
        assert_eq!(assembly.point_lights, 0);
        assert_eq!(assembly.ignored_lights, 1);
        assert_eq!(lines(&assembly).len(), 1);
    }

    #[test]
    fn test_light_intensity_scaling() {
        let lamp = SceneObject::light(
            "Lamp",
            Transform::IDENTITY,
            LightObject { kind: LightKind::Point, color: Rgb::new(1.0, 0.5, 0.0), energy: 20.0 },
        );
        let scene = Scene::new(vec![camera(), lamp]).unwrap();

        let assembly = assemble_empty(&scene);

        assert!(lines(&assembly)[1].contains(r#".Intensity = "hdr(2,1,0)""#));
    }
}
