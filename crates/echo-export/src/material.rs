//! Material translation
//!
//! Maps the node feeding a mesh's material output onto one of the
//! renderer's material kinds:
//!
//! | Shader node   | Material   | Color emitted            |
//! |---------------|------------|--------------------------|
//! | `BsdfDiffuse` | `Matte`    | `Color`                  |
//! | `Emission`    | `Emissive` | `Color * Strength / 10`  |
//! | `BsdfGlossy`  | `Mirror`   | `Color`                  |
//!
//! Anything else leaves the object without a material.

use std::collections::{HashMap, HashSet};
use std::fmt;

use echo_core::Rgba;
use echo_scene::{MaterialGraph, NodeKind, Scene, SceneObject, ShaderNode};
use tracing::{debug, warn};

use crate::syntax::{hdr, Construct, Declaration, Statement};

/// Divisor mapping host power units onto renderer radiance units
pub const POWER_DIVISOR: f64 = 10.0;

/// Prefix of every material declaration name
pub const MATERIAL_PREFIX: &str = "material";

const COLOR_SOCKET: &str = "Color";
const STRENGTH_SOCKET: &str = "Strength";

/// Renderer material kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Matte { albedo: Rgba },
    Emissive { emission: Rgba },
    Mirror { albedo: Rgba },
}

impl MaterialKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MaterialKind::Matte { .. } => "Matte",
            MaterialKind::Emissive { .. } => "Emissive",
            MaterialKind::Mirror { .. } => "Mirror",
        }
    }

    /// Color carried by the material, already scaled for emissives
    pub fn color(&self) -> Rgba {
        match *self {
            MaterialKind::Matte { albedo } | MaterialKind::Mirror { albedo } => albedo,
            MaterialKind::Emissive { emission } => emission,
        }
    }

    fn to_construct(self) -> Construct {
        Construct::new(self.type_name()).assign(
            "Albedo",
            Construct::new("Pure").arg(hdr(&self.color().to_array())),
        )
    }
}

/// Why an object ended up without a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The mesh has no material graph at all
    NoMaterial,
    /// The graph has no `OutputMaterial` node
    NoOutputNode,
    /// Nothing is linked into the output node
    NothingLinked,
    /// The output link comes from a node missing from the graph
    UnknownNode(String),
    /// The feeding node has no translation
    Unsupported(String),
    /// The feeding node lacks a required input value
    MissingInput { node: String, socket: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMaterial => write!(f, "no material graph"),
            SkipReason::NoOutputNode => write!(f, "no material output node"),
            SkipReason::NothingLinked => write!(f, "nothing linked into material output"),
            SkipReason::UnknownNode(name) => {
                write!(f, "material output linked from unknown node '{}'", name)
            }
            SkipReason::Unsupported(kind) => write!(f, "unsupported shader node '{}'", kind),
            SkipReason::MissingInput { node, socket } => {
                write!(f, "node '{}' has no '{}' value", node, socket)
            }
        }
    }
}

/// Classify a single shader node
pub fn classify(node: &ShaderNode) -> Result<MaterialKind, SkipReason> {
    let color = || {
        node.color(COLOR_SOCKET).ok_or_else(|| SkipReason::MissingInput {
            node: node.name.clone(),
            socket: COLOR_SOCKET.to_string(),
        })
    };

    match &node.kind {
        NodeKind::BsdfDiffuse => Ok(MaterialKind::Matte { albedo: color()? }),
        NodeKind::Emission => {
            let strength = node.scalar(STRENGTH_SOCKET).ok_or_else(|| SkipReason::MissingInput {
                node: node.name.clone(),
                socket: STRENGTH_SOCKET.to_string(),
            })?;
            Ok(MaterialKind::Emissive {
                emission: color()?.scaled(strength / POWER_DIVISOR),
            })
        }
        NodeKind::BsdfGlossy => Ok(MaterialKind::Mirror { albedo: color()? }),
        NodeKind::OutputMaterial => Err(SkipReason::Unsupported(node.kind.to_string())),
        NodeKind::Unsupported(tag) => Err(SkipReason::Unsupported(tag.clone())),
    }
}

/// Resolve the material kind of a whole graph
pub fn resolve(graph: &MaterialGraph) -> Result<MaterialKind, SkipReason> {
    if graph.output_node().is_none() {
        return Err(SkipReason::NoOutputNode);
    }
    let link = graph.output_link().ok_or(SkipReason::NothingLinked)?;
    let node = graph
        .feeding_output()
        .ok_or_else(|| SkipReason::UnknownNode(link.from.clone()))?;
    classify(node)
}

/// Strip spaces and underscores from an object name
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| *c != ' ' && *c != '_').collect()
}

/// True when `name` only holds characters the echo grammar accepts in a
/// declaration name
pub fn is_plain_declaration_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
}

/// A named material declaration
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDeclaration {
    pub name: String,
    pub kind: MaterialKind,
}

impl MaterialDeclaration {
    pub fn to_statement(&self) -> Statement {
        Statement::Declare(Declaration::new(&self.name, self.kind.to_construct()))
    }
}

/// Object name → material declaration, kept in scene order
#[derive(Debug, Clone, Default)]
pub struct MaterialDeclarationMap {
    by_object: HashMap<String, MaterialDeclaration>,
    order: Vec<String>,
    names: HashSet<String>,
}

impl MaterialDeclarationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material for `object`, uniquifying its declaration name.
    ///
    /// The first claimant of a sanitized name keeps it; later ones get
    /// the lowest free numeric suffix starting at 2.
    pub fn insert(&mut self, object: &str, kind: MaterialKind) -> &MaterialDeclaration {
        if self.by_object.contains_key(object) {
            return &self.by_object[object];
        }

        let base = format!("{}{}", MATERIAL_PREFIX, sanitize(object));
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{}{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            warn!(object, declaration = %name, "Material name collision, renamed");
        }
        if !is_plain_declaration_name(&name) {
            warn!(
                object,
                declaration = %name,
                "Material name has characters outside [A-Za-z0-9.], scene file may not parse"
            );
        }

        self.names.insert(name.clone());
        self.order.push(object.to_string());
        self.by_object
            .entry(object.to_string())
            .or_insert(MaterialDeclaration { name, kind })
    }

    pub fn get(&self, object: &str) -> Option<&MaterialDeclaration> {
        self.by_object.get(object)
    }

    /// Declarations in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialDeclaration)> {
        self.order
            .iter()
            .filter_map(|object| self.by_object.get(object).map(|decl| (object.as_str(), decl)))
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }
}

/// Result of translating every mesh of a scene
#[derive(Debug, Clone, Default)]
pub struct MaterialOutcome {
    pub materials: MaterialDeclarationMap,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Translate the material of one object
pub fn translate_object(object: &SceneObject) -> Result<MaterialKind, SkipReason> {
    let graph = object.material().ok_or(SkipReason::NoMaterial)?;
    resolve(graph)
}

/// Translate the materials of all mesh objects in scene order
pub fn translate_scene(scene: &Scene) -> MaterialOutcome {
    let mut outcome = MaterialOutcome::default();

    for object in scene.meshes() {
        match translate_object(object) {
            Ok(kind) => {
                let decl = outcome.materials.insert(&object.name, kind);
                debug!(
                    object = %object.name,
                    declaration = %decl.name,
                    kind = kind.type_name(),
                    "Material translated"
                );
            }
            Err(SkipReason::NoMaterial) => {
                debug!(object = %object.name, "Mesh has no material");
                outcome.skipped.push((object.name.clone(), SkipReason::NoMaterial));
            }
            Err(reason) => {
                warn!(object = %object.name, reason = %reason, "Mesh exported without material");
                outcome.skipped.push((object.name.clone(), reason));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::Transform;
    use echo_scene::{InputValue, MeshObject, NodeLink};
    use proptest::prelude::*;

    fn graph_with(node: ShaderNode) -> MaterialGraph {
        let name = node.name.clone();
        MaterialGraph {
            nodes: vec![ShaderNode::new("Material Output", NodeKind::OutputMaterial), node],
            links: vec![NodeLink::new(name, "Material Output").into_socket("Surface")],
        }
    }

    fn color(r: f64, g: f64, b: f64, a: f64) -> InputValue {
        InputValue::Color(Rgba::new(r, g, b, a))
    }

    #[test]
    fn test_diffuse_to_matte() {
        let node = ShaderNode::new("Diffuse", NodeKind::BsdfDiffuse)
            .with_input("Color", color(1.0, 0.0, 0.0, 1.0));
        let kind = resolve(&graph_with(node)).unwrap();

        assert_eq!(kind, MaterialKind::Matte { albedo: Rgba::new(1.0, 0.0, 0.0, 1.0) });

        let decl = MaterialDeclaration { name: "materialCube1".into(), kind };
        assert_eq!(
            decl.to_statement().to_string(),
            r#":materialCube1 = new Matte {.Albedo = new Pure("hdr(1,0,0,1)")}"#
        );
    }

    #[test]
    fn test_emission_scaling() {
        let node = ShaderNode::new("Emission", NodeKind::Emission)
            .with_input("Color", color(1.0, 1.0, 1.0, 1.0))
            .with_input("Strength", InputValue::Scalar(20.0));
        let kind = resolve(&graph_with(node)).unwrap();

        assert_eq!(kind, MaterialKind::Emissive { emission: Rgba::new(2.0, 2.0, 2.0, 2.0) });
        assert_eq!(
            kind.to_construct().body[0].to_string(),
            r#".Albedo = new Pure("hdr(2,2,2,2)")"#
        );
    }

    #[test]
    fn test_glossy_to_mirror() {
        let node = ShaderNode::new("Glossy", NodeKind::BsdfGlossy)
            .with_input("Color", color(0.5, 0.5, 0.5, 1.0));
        let kind = resolve(&graph_with(node)).unwrap();
        assert_eq!(kind, MaterialKind::Mirror { albedo: Rgba::new(0.5, 0.5, 0.5, 1.0) });
        assert_eq!(kind.type_name(), "Mirror");
    }

    #[test]
    fn test_unsupported_node() {
        let node = ShaderNode::new("Principled", NodeKind::parse("BsdfPrincipled"));
        assert_eq!(
            resolve(&graph_with(node)),
            Err(SkipReason::Unsupported("BsdfPrincipled".into()))
        );
    }

    #[test]
    fn test_missing_output_and_links() {
        let node = ShaderNode::new("Diffuse", NodeKind::BsdfDiffuse)
            .with_input("Color", color(1.0, 1.0, 1.0, 1.0));
        let mut graph = graph_with(node);
        graph.links.clear();
        assert_eq!(resolve(&graph), Err(SkipReason::NothingLinked));

        graph.nodes.remove(0);
        assert_eq!(resolve(&graph), Err(SkipReason::NoOutputNode));
    }

    #[test]
    fn test_link_from_unknown_node() {
        let node = ShaderNode::new("Diffuse", NodeKind::BsdfDiffuse)
            .with_input("Color", color(1.0, 1.0, 1.0, 1.0));
        let mut graph = graph_with(node);
        graph.links[0].from = "Deleted".into();

        let reason = resolve(&graph).unwrap_err();
        assert_eq!(reason, SkipReason::UnknownNode("Deleted".into()));
        assert!(reason.to_string().contains("unknown node 'Deleted'"));
    }

    #[test]
    fn test_missing_strength() {
        let node = ShaderNode::new("Emission", NodeKind::Emission)
            .with_input("Color", color(1.0, 1.0, 1.0, 1.0));
        assert_eq!(
            resolve(&graph_with(node)),
            Err(SkipReason::MissingInput { node: "Emission".into(), socket: "Strength".into() })
        );
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Cube_1"), "Cube1");
        assert_eq!(sanitize("A B"), "AB");
        assert_eq!(sanitize("A_B"), "AB");
    }

    #[test]
    fn test_plain_declaration_name() {
        assert!(is_plain_declaration_name("materialCube1"));
        assert!(is_plain_declaration_name("materialCube.001"));
        assert!(!is_plain_declaration_name(r#"materialCube"}"#));

        let mut map = MaterialDeclarationMap::new();
        let decl = map.insert(r#"Cube"}"#, MaterialKind::Matte { albedo: Rgba::WHITE });
        assert_eq!(decl.name, r#"materialCube"}"#);
    }

    #[test]
    fn test_name_collision_uniquified() {
        let kind = MaterialKind::Matte { albedo: Rgba::WHITE };
        let mut map = MaterialDeclarationMap::new();
        map.insert("A B", kind);
        map.insert("A_B", kind);
        map.insert("AB", kind);

        assert_eq!(map.get("A B").unwrap().name, "materialAB");
        assert_eq!(map.get("A_B").unwrap().name, "materialAB2");
        assert_eq!(map.get("AB").unwrap().name, "materialAB3");
        assert_eq!(
            map.iter().map(|(object, _)| object).collect::<Vec<_>>(),
            ["A B", "A_B", "AB"]
        );
    }

    #[test]
    fn test_translate_scene_skips() {
        let diffuse = ShaderNode::new("Diffuse", NodeKind::BsdfDiffuse)
            .with_input("Color", color(1.0, 0.0, 0.0, 1.0));
        let scene = Scene::new(vec![
            SceneObject::mesh(
                "Cube_1",
                Transform::IDENTITY,
                MeshObject { material: Some(graph_with(diffuse)), geometry: None },
            ),
            SceneObject::mesh("Bare", Transform::IDENTITY, MeshObject::default()),
        ])
        .unwrap();

        let outcome = translate_scene(&scene);

        assert_eq!(outcome.materials.len(), 1);
        assert_eq!(outcome.materials.get("Cube_1").unwrap().name, "materialCube1");
        assert_eq!(outcome.skipped, [("Bare".to_string(), SkipReason::NoMaterial)]);
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_have_no_separators(name in "[A-Za-z0-9 _.]{0,24}") {
            let clean = sanitize(&name);
            prop_assert!(!clean.contains(' ') && !clean.contains('_'));
            prop_assert_eq!(clean.len(), name.chars().filter(|c| *c != ' ' && *c != '_').count());
        }
    }
}
