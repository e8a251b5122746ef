use thiserror::Error;

use crate::mapping::ChunkKind;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("'{name}' ({kind}) is not in the index table")]
    Unresolved { name: String, kind: ChunkKind },

    #[error("'{name}' ({kind}) appears more than once in the index table")]
    DuplicateReference { name: String, kind: ChunkKind },

    #[error("bone '{bone}' is animated through unsupported channel '{path}'")]
    UnsupportedChannel { bone: String, path: String },

    #[error("bone '{bone}' channel '{path}' has {found} components, expected {expected}")]
    ChannelWidth { bone: String, path: String, expected: usize, found: usize },

    #[error("skeleton '{0}' has animation data but no action")]
    MissingAction(String),

    #[error("{kind} '{name}' is missing from the sampled scene at frame {frame}")]
    MissingSample { kind: &'static str, name: String, frame: i32 },

    #[error("extra clump '{0}' has no animated base skeleton")]
    MissingBaseClump(String),

    #[error("skeleton '{0}' has neither bones nor models")]
    EmptySkeleton(String),

    #[error("no selected skeleton carries animation data")]
    NoAnimatedSkeletons,

    #[error("scene recording holds no frames")]
    NoRecordedFrames,

    #[error("curve {curve_index} of {entry} has {frames} samples ({bytes} bytes), more than a curve header can describe")]
    CurveTooLarge { entry: String, curve_index: u16, frames: usize, bytes: usize },

    #[error("frame {0} is out of range for a keyframe key")]
    FrameOutOfRange(i32),

    #[error("{what} count {count} does not fit the animation header")]
    CountOverflow { what: &'static str, count: usize },

    #[error(transparent)]
    Binary(#[from] binrw::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
