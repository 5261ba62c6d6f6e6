//! Transform recipes for copy-codec encoding.
//!
//! Each recipe is a fixed, ordered list of transform outputs. Construction
//! is plain object assembly; the service validates percentages, sprite
//! columns and the rest when the transform is created.

use std::fmt;
use std::str::FromStr;

use ams_models::{
    Codec, Format, JpgImage, JpgLayer, OnErrorType, Preset, PresetName, Priority, Transform,
    TransformOutput,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mp4 file name for the stream-copied rendition.
pub const COPY_CODEC_MP4_PATTERN: &str = "CopyCodec-{Basename}{Extension}";

/// Jpg file name for each thumbnail sprite sheet.
pub const SPRITE_JPG_PATTERN: &str = "sprite-{Basename}-{Index}{Extension}";

/// Transform description shared by the copy-codec recipes.
pub const COPY_CODEC_DESCRIPTION: &str =
    "Built in preset using the Saas Copy Codec preset. This copies the source audio and video to an MP4 file.";

/// Available transform recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Recipe {
    /// Built-in copy codec only
    CopyCodec,
    /// Built-in copy codec with a proxy rendition
    CopyCodecWithProxy,
    /// 360p proxy plus a custom copy with a thumbnail sprite
    #[default]
    CopyCodecSpriteProxy,
}

impl Recipe {
    pub const ALL: &'static [Recipe] = &[
        Recipe::CopyCodec,
        Recipe::CopyCodecWithProxy,
        Recipe::CopyCodecSpriteProxy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recipe::CopyCodec => "copy_codec",
            Recipe::CopyCodecWithProxy => "copy_codec_with_proxy",
            Recipe::CopyCodecSpriteProxy => "copy_codec_sprite_proxy",
        }
    }

    /// Transform outputs in submission order.
    pub fn outputs(&self) -> Vec<TransformOutput> {
        match self {
            Recipe::CopyCodec => vec![built_in_output(PresetName::SaasCopyCodec)],
            Recipe::CopyCodecWithProxy => vec![built_in_output(PresetName::SaasProxyCopyCodec)],
            Recipe::CopyCodecSpriteProxy => copy_codec_sprite_proxy_outputs(),
        }
    }

    /// Full transform with description.
    pub fn transform(&self) -> Transform {
        Transform::new(self.outputs()).with_description(self.description())
    }

    pub fn default_transform_name(&self) -> &'static str {
        match self {
            Recipe::CopyCodec => "CopyCodec",
            Recipe::CopyCodecWithProxy => "CopyCodecWithProxy",
            Recipe::CopyCodecSpriteProxy => "CopyCodecWithSpriteAndProxyCustom",
        }
    }

    /// Prefix for the asset, job and locator names of a run.
    pub fn default_name_prefix(&self) -> &'static str {
        match self {
            Recipe::CopyCodec => "encode_copycodec",
            Recipe::CopyCodecWithProxy => "encode_copycodec_proxy",
            Recipe::CopyCodecSpriteProxy => "encode_copycodec_sprite_proxy",
        }
    }

    pub fn description(&self) -> &'static str {
        COPY_CODEC_DESCRIPTION
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Recipe {
    type Err = RecipeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Recipe::ALL
            .iter()
            .find(|recipe| recipe.as_str() == normalized)
            .copied()
            .ok_or_else(|| RecipeParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown recipe: {0} (expected one of copy_codec, copy_codec_with_proxy, copy_codec_sprite_proxy)")]
pub struct RecipeParseError(String);

fn built_in_output(name: PresetName) -> TransformOutput {
    TransformOutput::new(Preset::built_in(name))
        .with_on_error(OnErrorType::StopProcessingJob)
        .with_relative_priority(Priority::Normal)
}

/// Thumbnail sprite: one frame every 5% across the whole source, 10 per row,
/// each scaled to a fifth of the source size.
pub fn sprite_codec() -> JpgImage {
    JpgImage::new("0%")
        .with_step("5%")
        .with_range("100%")
        .with_sprite_column(10)
        .with_layer(JpgLayer::new("20%", "20%", 85))
}

/// Stream copy of audio and video into an Mp4, plus the thumbnail sprite.
pub fn copy_codec_with_sprite_preset() -> Preset {
    Preset::standard(
        vec![Codec::copy_video(), Codec::copy_audio(), sprite_codec().into()],
        vec![
            Format::mp4(COPY_CODEC_MP4_PATTERN),
            Format::jpg(SPRITE_JPG_PATTERN),
        ],
    )
}

/// The two outputs of the sprite-and-proxy recipe: a 360p source-aligned
/// proxy, then the custom copy with sprite.
pub fn copy_codec_sprite_proxy_outputs() -> Vec<TransformOutput> {
    vec![
        built_in_output(PresetName::SaasSourceAligned360pOnly),
        TransformOutput::new(copy_codec_with_sprite_preset())
            .with_on_error(OnErrorType::StopProcessingJob)
            .with_relative_priority(Priority::Normal),
    ]
}
