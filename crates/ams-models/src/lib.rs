//! Wire models for the Media Services REST API.
//!
//! This crate provides Serde-serializable types for:
//! - Transforms and their outputs (presets, codecs, formats)
//! - Jobs, job inputs and job outputs
//! - Assets and container SAS requests
//! - Streaming locators and endpoints
//! - The ARM resource envelope and error body

pub mod asset;
pub mod codec;
pub mod format;
pub mod job;
pub mod preset;
pub mod resource;
pub mod streaming;
pub mod transform;

// Re-export common types
pub use asset::{Asset, AssetContainerPermission, AssetContainerSas, ListContainerSasInput};
pub use codec::{Codec, CopyAudio, CopyVideo, JpgImage, JpgLayer};
pub use format::{FilenameMacro, Format, JpgFormat, Mp4Format};
pub use job::{
    Job, JobError, JobInput, JobInputAsset, JobInputHttp, JobOutput, JobOutputAsset, JobState,
};
pub use preset::{
    BuiltInStandardEncoderPreset, Preset, PresetName, PresetNameParseError, StandardEncoderPreset,
};
pub use resource::{ArmError, ArmErrorResponse, Resource, ResourceRequest};
pub use streaming::{
    ListPathsResponse, StreamingEndpoint, StreamingLocator, StreamingPath,
    PREDEFINED_CLEAR_STREAMING_ONLY,
};
pub use transform::{OnErrorType, Priority, Transform, TransformOutput};
