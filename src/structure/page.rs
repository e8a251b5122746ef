use serde::{Deserialize, Serialize};

use crate::error::ExportError;


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub types: String,
    #[serde(rename = "Path")]
    pub path: String,
}

impl Chunk {
    pub fn new(name: impl Into<String>, types: impl Into<String>, path: impl Into<String>) -> Chunk {
        Chunk { name: name.into(), types: types.into(), path: path.into() }
    }

    pub fn null() -> Chunk {
        Chunk::new("", "nuccChunkNull", "")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChunkReference {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Chunk")]
    pub chunk: Chunk,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Files {
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Chunk")]
    pub chunk: Chunk,
}

/// Contents of `_page.json`, describing every chunk an export produced or references.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Page {
    #[serde(rename = "Chunk Maps")]
    pub chunk_maps: Vec<Chunk>,
    #[serde(rename = "Chunk References")]
    pub chunk_references: Vec<ChunkReference>,
    #[serde(rename = "Chunks")]
    pub files: Vec<Files>,
}

impl Page {
    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}
