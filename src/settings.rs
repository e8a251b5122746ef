use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Export switches. Missing keys in a settings file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Written into the animation header's loop flag.
    pub looped: bool,
    /// Emit material entries for every skeleton material.
    pub export_materials: bool,
    /// Cull redundant keyframes and collapse constant curves.
    pub optimize: bool,
    /// Manifest path of the animation chunk. Defaults to the first skeleton's chunk path.
    pub anm_chunk_path: Option<String>,
    pub show_progress: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            looped: false,
            export_materials: false,
            optimize: true,
            anm_chunk_path: None,
            show_progress: false,
        }
    }
}

impl ExportSettings {
    pub fn from_json_file(filepath: &Path) -> Result<ExportSettings, ExportError> {
        let json = fs::read_to_string(filepath)?;
        Ok(serde_json::from_str(&json)?)
    }
}
