//! Evaluation profile
//!
//! User-selected render settings, emitted as the `EvaluationProfile`
//! declaration that follows the scene block. Profiles can be kept in
//! YAML or JSON files:
//!
//! ```yaml
//! evaluator: PathTracedEvaluator
//! pattern: HilbertCurve
//! extend: 16
//! width: 1920
//! height: 1080
//! max_epoch: 20
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use echo_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::syntax::{Construct, Declaration, Value};

/// Name of the profile declaration
pub const PROFILE_DECLARATION: &str = "profile";

/// First epoch is always 1
pub const MIN_EPOCH: u32 = 1;

/// Evaluator used by the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatorKind {
    #[default]
    #[serde(rename = "PathTracedEvaluator", alias = "PathTraced")]
    PathTraced,
    #[serde(rename = "BruteForcedEvaluator", alias = "BruteForced")]
    BruteForced,
    #[serde(rename = "AlbedoEvaluator", alias = "Albedo")]
    Albedo,
    #[serde(rename = "NormalDepthEvaluator", alias = "NormalDepth")]
    NormalDepth,
}

impl EvaluatorKind {
    pub const ALL: [EvaluatorKind; 4] = [
        EvaluatorKind::PathTraced,
        EvaluatorKind::BruteForced,
        EvaluatorKind::Albedo,
        EvaluatorKind::NormalDepth,
    ];

    /// Renderer type constructed for this evaluator
    pub fn type_name(&self) -> &'static str {
        match self {
            EvaluatorKind::PathTraced => "PathTracedEvaluator",
            EvaluatorKind::BruteForced => "BruteForcedEvaluator",
            EvaluatorKind::Albedo => "AlbedoEvaluator",
            EvaluatorKind::NormalDepth => "NormalDepthEvaluator",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = normalize(s);
        let suffixed = format!("{}evaluator", wanted);
        Self::ALL
            .into_iter()
            .find(|k| {
                let name = normalize(k.type_name());
                name == wanted || name == suffixed
            })
            .ok_or_else(|| format!("Unknown evaluator: {}", s))
    }
}

/// Order in which the renderer walks buffer tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    #[serde(alias = "OrderedPattern")]
    Ordered,
    #[serde(alias = "ScrambledPattern")]
    Scrambled,
    #[serde(alias = "SpiralPattern")]
    Spiral,
    #[default]
    #[serde(alias = "HilbertCurvePattern")]
    HilbertCurve,
}

impl PatternKind {
    pub const ALL: [PatternKind; 4] = [
        PatternKind::Ordered,
        PatternKind::Scrambled,
        PatternKind::Spiral,
        PatternKind::HilbertCurve,
    ];

    /// Renderer type constructed for this pattern
    pub fn type_name(&self) -> &'static str {
        match self {
            PatternKind::Ordered => "OrderedPattern",
            PatternKind::Scrambled => "ScrambledPattern",
            PatternKind::Spiral => "SpiralPattern",
            PatternKind::HilbertCurve => "HilbertCurvePattern",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = normalize(s);
        let suffixed = format!("{}pattern", wanted);
        Self::ALL
            .into_iter()
            .find(|k| {
                let name = normalize(k.type_name());
                name == wanted || name == suffixed
            })
            .ok_or_else(|| format!("Unknown pattern: {}", s))
    }
}

/// Lowercase with separators removed, so `hilbert-curve` matches `HilbertCurve`
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Render settings for one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportProfile {
    pub evaluator: EvaluatorKind,
    pub pattern: PatternKind,
    /// Stratified distribution extend
    pub extend: u32,
    /// Render buffer width in pixels
    pub width: u32,
    /// Render buffer height in pixels
    pub height: u32,
    /// Last epoch, inclusive
    pub max_epoch: u32,
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::PathTraced,
            pattern: PatternKind::HilbertCurve,
            extend: 16,
            width: 1920,
            height: 1080,
            max_epoch: 20,
        }
    }
}

impl ExportProfile {
    /// Load a profile file, choosing the format by extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let profile: ExportProfile = match ext.as_str() {
            "json" => serde_json::from_str(&text)
                .map_err(|e| Error::invalid_profile(path.display().to_string(), e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .map_err(|e| Error::invalid_profile(path.display().to_string(), e.to_string()))?,
            other => {
                return Err(Error::UnsupportedFormat {
                    format: format!("profile '.{}'", other),
                })
            }
        };

        debug!(path = %path.display(), ?profile, "Loaded profile");
        profile.validate()?;
        Ok(profile)
    }

    pub fn min_epoch(&self) -> u32 {
        MIN_EPOCH
    }

    /// Range-check the numeric settings
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("extend", self.extend),
            ("width", self.width),
            ("height", self.height),
            ("max_epoch", self.max_epoch),
        ] {
            if value == 0 {
                return Err(Error::invalid_profile(field, "must be a positive integer"));
            }
        }

        if self.max_epoch < MIN_EPOCH {
            return Err(Error::invalid_profile(
                "max_epoch",
                format!("must be at least {}", MIN_EPOCH),
            ));
        }
        Ok(())
    }

    /// Build the `EvaluationProfile` declaration rendering `scene_name`
    pub fn to_declaration(&self, scene_name: &str) -> Declaration {
        let profile = Construct::new("EvaluationProfile")
            .assign("Scene", Value::link(scene_name))
            .assign("Evaluator", Construct::new(self.evaluator.type_name()))
            .assign(
                "Distribution",
                Construct::new("StratifiedDistribution")
                    .assign("Extend", Value::quoted(self.extend.to_string())),
            )
            .assign(
                "Buffer",
                Construct::new("RenderBuffer").arg(format!("{} {}", self.width, self.height)),
            )
            .assign("Pattern", Construct::new(self.pattern.type_name()))
            .assign("MinEpoch", Value::quoted(MIN_EPOCH.to_string()))
            .assign("MaxEpoch", Value::quoted(self.max_epoch.to_string()));

        Declaration::new(PROFILE_DECLARATION, profile)
    }
}
