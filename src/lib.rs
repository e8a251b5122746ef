//! Encodes animated skeletons, cameras and lights of a recorded scene into
//! the big-endian nuccAnm animation chunk and its `_page.json` manifest.

pub mod build_page;
pub mod clump;
pub mod convert;
pub mod coordinate;
pub mod error;
pub mod export;
pub mod mapping;
pub mod optimize;
pub mod scene;
pub mod settings;
pub mod skeleton;
pub mod structure;

pub use error::ExportError;
pub use export::{export, AnmExport};
pub use scene::{FrameSampler, RecordedFrames, SceneDump};
pub use settings::ExportSettings;
