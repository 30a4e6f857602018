//! The assembled per-document report and module selection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::beats::{Beat, BeatHit};
use crate::config::AnalysisConfig;
use crate::continuity::ContinuityReport;
use crate::dialogue::DialogueReport;
use crate::diversity::DiversityReport;
use crate::emotion::EmotionArc;
use crate::error::MetricsError;
use crate::mechanics::MechanicsReport;
use crate::readability::ReadabilityReport;
use crate::structure::StructureReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Emotion,
    Readability,
    Diversity,
    Mechanics,
    Continuity,
    Dialogue,
    Beats,
    Structure,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::Emotion,
        Module::Readability,
        Module::Diversity,
        Module::Mechanics,
        Module::Continuity,
        Module::Dialogue,
        Module::Beats,
        Module::Structure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Emotion => "emotion",
            Module::Readability => "readability",
            Module::Diversity => "diversity",
            Module::Mechanics => "mechanics",
            Module::Continuity => "continuity",
            Module::Dialogue => "dialogue",
            Module::Beats => "beats",
            Module::Structure => "structure",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or(MetricsError::UnknownModule(name))
    }
}

/// Which modules an analysis runs. Defaults to all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modules(BTreeSet<Module>);

impl Modules {
    pub fn all() -> Self {
        Self(Module::ALL.into_iter().collect())
    }

    /// Exactly `selected`; an empty selection means all.
    pub fn only(selected: impl IntoIterator<Item = Module>) -> Self {
        let set: BTreeSet<Module> = selected.into_iter().collect();
        if set.is_empty() {
            Self::all()
        } else {
            Self(set)
        }
    }

    pub fn contains(&self, module: Module) -> bool {
        self.0.contains(&module)
    }

    pub fn iter(&self) -> impl Iterator<Item = Module> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Modules {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for Modules {
    type Err = MetricsError;

    /// Comma-separated module names, e.g. `emotion,beats`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selected = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Module::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::only(selected))
    }
}

/// Everything computed for one document.
///
/// Built in one step at the end of [`crate::analyze`]; modules that were not
/// requested are `None` and left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub lexicon_version: &'static str,
    pub characters: usize,
    pub config: AnalysisConfig,
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionArc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readability: Option<ReadabilityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity: Option<DiversityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanics: Option<MechanicsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuity: Option<ContinuityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<DialogueReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beats: Option<BTreeMap<Beat, Vec<BeatHit>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureReport>,
}
