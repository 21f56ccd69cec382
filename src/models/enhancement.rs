use serde::{Deserialize, Serialize};

/// Persona section of a PTCF enhancement.
///
/// Sub-fields are optional on purpose: the model is asked for all of them
/// but the agreed contract only requires the four top-level sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaSpec {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub perspective: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub deliverable: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSpec {
    #[serde(default)]
    pub technical_background: Option<String>,
    #[serde(default)]
    pub key_considerations: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatSpec {
    #[serde(default)]
    pub output_style: Option<String>,
    #[serde(default)]
    pub structure: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
}
