//! Encoder presets: built-in named presets and custom standard encoder presets.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::codec::Codec;
use crate::format::Format;

/// Preset applied by a transform output.
///
/// Serialized with the `@odata.type` discriminator the service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "@odata.type")]
pub enum Preset {
    /// One of the service's named presets
    #[serde(rename = "#Microsoft.Media.BuiltInStandardEncoderPreset")]
    BuiltInStandardEncoder(BuiltInStandardEncoderPreset),
    /// Custom list of codecs and output formats
    #[serde(rename = "#Microsoft.Media.StandardEncoderPreset")]
    StandardEncoder(StandardEncoderPreset),
    /// Any other preset type, kept verbatim including its `@odata.type`
    #[serde(untagged)]
    Other(Map<String, Value>),
}

impl Preset {
    /// Shorthand for a built-in preset.
    pub fn built_in(name: PresetName) -> Self {
        Preset::BuiltInStandardEncoder(BuiltInStandardEncoderPreset::new(name))
    }

    /// Shorthand for a custom standard encoder preset.
    pub fn standard(codecs: Vec<Codec>, formats: Vec<Format>) -> Self {
        Preset::StandardEncoder(StandardEncoderPreset::new(codecs, formats))
    }

    /// The named preset, if this is a built-in one.
    pub fn preset_name(&self) -> Option<PresetName> {
        match self {
            Preset::BuiltInStandardEncoder(p) => Some(p.preset_name.clone()),
            _ => None,
        }
    }

    /// The custom preset body, if this is a standard encoder preset.
    pub fn as_standard(&self) -> Option<&StandardEncoderPreset> {
        match self {
            Preset::StandardEncoder(p) => Some(p),
            _ => None,
        }
    }
}

/// Built-in encoder preset selected by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuiltInStandardEncoderPreset {
    pub preset_name: PresetName,
}

impl BuiltInStandardEncoderPreset {
    pub fn new(preset_name: PresetName) -> Self {
        Self { preset_name }
    }
}

/// Custom standard encoder preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandardEncoderPreset {
    /// Codecs in output order
    pub codecs: Vec<Codec>,
    /// Output containers/images with their filename patterns
    pub formats: Vec<Format>,
}

impl StandardEncoderPreset {
    pub fn new(codecs: Vec<Codec>, formats: Vec<Format>) -> Self {
        Self { codecs, formats }
    }
}

/// Named presets understood by the service.
///
/// The `Saas*` presets copy the source streams and optionally back-fill
/// GOP-aligned proxy layers. Their behavior is owned by the service.
/// Names this crate does not know are kept as `Other` and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PresetName {
    /// Copy source H.264/AAC into streamable MP4
    SaasCopyCodec,
    /// Copy codec plus a proxy rendition
    SaasProxyCopyCodec,
    /// Single 360p proxy layer aligned to the source GOPs
    SaasSourceAligned360pOnly,
    /// Single 540p proxy layer aligned to the source GOPs
    SaasSourceAligned540pOnly,
    /// Adaptive 540p + 360p set aligned to the source
    SaasSourceAligned540p,
    /// Adaptive 360p + 180p set aligned to the source
    SaasSourceAligned360p,
    AdaptiveStreaming,
    ContentAwareEncoding,
    H265ContentAwareEncoding,
    Other(String),
}

impl PresetName {
    /// All known preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::SaasCopyCodec,
        PresetName::SaasProxyCopyCodec,
        PresetName::SaasSourceAligned360pOnly,
        PresetName::SaasSourceAligned540pOnly,
        PresetName::SaasSourceAligned540p,
        PresetName::SaasSourceAligned360p,
        PresetName::AdaptiveStreaming,
        PresetName::ContentAwareEncoding,
        PresetName::H265ContentAwareEncoding,
    ];

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            PresetName::SaasCopyCodec => "SaasCopyCodec",
            PresetName::SaasProxyCopyCodec => "SaasProxyCopyCodec",
            PresetName::SaasSourceAligned360pOnly => "SaasSourceAligned360pOnly",
            PresetName::SaasSourceAligned540pOnly => "SaasSourceAligned540pOnly",
            PresetName::SaasSourceAligned540p => "SaasSourceAligned540p",
            PresetName::SaasSourceAligned360p => "SaasSourceAligned360p",
            PresetName::AdaptiveStreaming => "AdaptiveStreaming",
            PresetName::ContentAwareEncoding => "ContentAwareEncoding",
            PresetName::H265ContentAwareEncoding => "H265ContentAwareEncoding",
            PresetName::Other(name) => name,
        }
    }

    /// Whether the preset passes source streams through without re-encoding.
    pub fn is_copy_codec(&self) -> bool {
        matches!(
            self,
            PresetName::SaasCopyCodec
                | PresetName::SaasProxyCopyCodec
                | PresetName::SaasSourceAligned360pOnly
                | PresetName::SaasSourceAligned540pOnly
                | PresetName::SaasSourceAligned540p
                | PresetName::SaasSourceAligned360p
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PresetName::Other(_))
    }
}

impl From<String> for PresetName {
    fn from(name: String) -> Self {
        // Lower-camel spellings appear in older samples
        let canonical = match name.as_str() {
            "saasCopyCodec" => "SaasCopyCodec",
            "saasProxyCopyCodec" => "SaasProxyCopyCodec",
            other => other,
        };
        PresetName::ALL
            .iter()
            .find(|known| known.as_str() == canonical)
            .cloned()
            .unwrap_or(PresetName::Other(name))
    }
}

impl From<PresetName> for String {
    fn from(name: PresetName) -> Self {
        match name {
            PresetName::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl JsonSchema for PresetName {
    fn schema_name() -> String {
        "PresetName".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = PresetNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .cloned()
            .ok_or_else(|| PresetNameParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown preset name: {0}")]
pub struct PresetNameParseError(String);
