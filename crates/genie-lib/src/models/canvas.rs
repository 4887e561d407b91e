// Canvas data models
// Visibility of the artifact canvas and the artifact it currently shows

use serde::{Deserialize, Serialize};

use super::chat::CodeArtifact;
use super::dashboard::AladdinDashboard;

/// Canvas visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasState {
    #[default]
    Closed,
    Open,
    Maximized,
}

impl CanvasState {
    /// True for both `Open` and `Maximized`
    pub fn is_open(&self) -> bool {
        !matches!(self, CanvasState::Closed)
    }
}

impl std::fmt::Display for CanvasState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasState::Closed => write!(f, "closed"),
            CanvasState::Open => write!(f, "open"),
            CanvasState::Maximized => write!(f, "maximized"),
        }
    }
}

impl std::str::FromStr for CanvasState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "closed" => Ok(CanvasState::Closed),
            "open" => Ok(CanvasState::Open),
            "maximized" => Ok(CanvasState::Maximized),
            _ => Err(format!("Invalid canvas state: {}", s)),
        }
    }
}

/// Artifact shown in the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActiveArtifact {
    Dashboard(AladdinDashboard),
    Code(CodeArtifact),
}

impl ActiveArtifact {
    pub fn as_dashboard(&self) -> Option<&AladdinDashboard> {
        match self {
            ActiveArtifact::Dashboard(d) => Some(d),
            ActiveArtifact::Code(_) => None,
        }
    }

    pub fn is_dashboard(&self) -> bool {
        matches!(self, ActiveArtifact::Dashboard(_))
    }

    pub fn is_code(&self) -> bool {
        matches!(self, ActiveArtifact::Code(_))
    }
}

impl From<AladdinDashboard> for ActiveArtifact {
    fn from(dashboard: AladdinDashboard) -> Self {
        ActiveArtifact::Dashboard(dashboard)
    }
}
