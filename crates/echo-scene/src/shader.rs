//! Shader node graphs
//!
//! A material is a small directed graph of shader nodes. Links run from
//! a source node into an input socket of a target node. The exporter
//! only ever asks one question of the graph: which node feeds the
//! material output.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use echo_core::Rgba;
use serde::{Deserialize, Serialize};

/// Shader node type tag
///
/// Tags outside the known set are kept verbatim in `Unsupported` so the
/// translator can report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    OutputMaterial,
    BsdfDiffuse,
    Emission,
    BsdfGlossy,
    Unsupported(String),
}

impl NodeKind {
    /// Prefix hosts put in front of shader node identifiers
    const HOST_PREFIX: &'static str = "ShaderNode";

    pub fn parse(tag: &str) -> Self {
        let bare = tag.strip_prefix(Self::HOST_PREFIX).unwrap_or(tag);
        match bare {
            "OutputMaterial" => NodeKind::OutputMaterial,
            "BsdfDiffuse" => NodeKind::BsdfDiffuse,
            "Emission" => NodeKind::Emission,
            "BsdfGlossy" => NodeKind::BsdfGlossy,
            _ => NodeKind::Unsupported(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::OutputMaterial => "OutputMaterial",
            NodeKind::BsdfDiffuse => "BsdfDiffuse",
            NodeKind::Emission => "Emission",
            NodeKind::BsdfGlossy => "BsdfGlossy",
            NodeKind::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::parse(&tag)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unlinked value of a node input socket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Color(Rgba),
    Scalar(f64),
}

/// A single shader node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNode {
    /// Node name, unique within its graph
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputValue>,
}

impl ShaderNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inputs: BTreeMap::new(),
        }
    }

    /// Builder-style input assignment
    pub fn with_input(mut self, socket: impl Into<String>, value: InputValue) -> Self {
        self.inputs.insert(socket.into(), value);
        self
    }

    pub fn color(&self, socket: &str) -> Option<Rgba> {
        match self.inputs.get(socket)? {
            InputValue::Color(c) => Some(*c),
            InputValue::Scalar(_) => None,
        }
    }

    pub fn scalar(&self, socket: &str) -> Option<f64> {
        match self.inputs.get(socket)? {
            InputValue::Scalar(v) => Some(*v),
            InputValue::Color(_) => None,
        }
    }
}

/// Directed edge from `from` into socket `to_socket` of `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_socket: Option<String>,
}

impl NodeLink {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            to_socket: None,
        }
    }

    pub fn into_socket(mut self, socket: impl Into<String>) -> Self {
        self.to_socket = Some(socket.into());
        self
    }
}

/// Material node graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialGraph {
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
    #[serde(default)]
    pub links: Vec<NodeLink>,
}

impl MaterialGraph {
    /// Socket on the output node that carries the surface shader
    pub const SURFACE_SOCKET: &'static str = "Surface";

    pub fn node(&self, name: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// First node of type `OutputMaterial`
    pub fn output_node(&self) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.kind == NodeKind::OutputMaterial)
    }

    /// Adjacency from target node name to its incoming links, in link order
    pub fn incoming(&self) -> HashMap<&str, Vec<&NodeLink>> {
        let mut map: HashMap<&str, Vec<&NodeLink>> = HashMap::new();
        for link in &self.links {
            map.entry(link.to.as_str()).or_default().push(link);
        }
        map
    }

    /// The link carrying the surface shader into the output node.
    ///
    /// A link into the `Surface` socket wins over other sockets; among
    /// equals the first declared link is taken.
    pub fn output_link(&self) -> Option<&NodeLink> {
        let output = self.output_node()?;
        let incoming = self.incoming();
        let links = incoming.get(output.name.as_str())?;

        links
            .iter()
            .find(|l| l.to_socket.as_deref() == Some(Self::SURFACE_SOCKET))
            .or_else(|| links.first())
            .copied()
    }

    /// The node linked directly into the output node.
    ///
    /// Returns `None` when the graph has no output node, nothing is
    /// linked into it, or the link names a node that does not exist.
    pub fn feeding_output(&self) -> Option<&ShaderNode> {
        self.node(&self.output_link()?.from)
    }
}
