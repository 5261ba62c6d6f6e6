//! Codec entries of a standard encoder preset.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A codec entry. Order within a preset is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "@odata.type")]
pub enum Codec {
    /// Pass the source video track through untouched
    #[serde(rename = "#Microsoft.Media.CopyVideo")]
    CopyVideo(CopyVideo),
    /// Pass the source audio track through untouched
    #[serde(rename = "#Microsoft.Media.CopyAudio")]
    CopyAudio(CopyAudio),
    /// Thumbnail generator producing JPEG images or sprites
    #[serde(rename = "#Microsoft.Media.JpgImage")]
    JpgImage(JpgImage),
    /// Any other codec (H264Video, AacAudio, ...), kept verbatim
    #[serde(untagged)]
    Other(Map<String, Value>),
}

impl Codec {
    pub fn copy_video() -> Self {
        Codec::CopyVideo(CopyVideo::default())
    }

    pub fn copy_audio() -> Self {
        Codec::CopyAudio(CopyAudio::default())
    }

    /// Short kind name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Codec::CopyVideo(_) => "copy_video",
            Codec::CopyAudio(_) => "copy_audio",
            Codec::JpgImage(_) => "jpg_image",
            Codec::Other(_) => "other",
        }
    }

    pub fn as_jpg_image(&self) -> Option<&JpgImage> {
        match self {
            Codec::JpgImage(image) => Some(image),
            _ => None,
        }
    }
}

impl From<JpgImage> for Codec {
    fn from(image: JpgImage) -> Self {
        Codec::JpgImage(image)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyVideo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyAudio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// JPEG thumbnail generation.
///
/// `start`, `step` and `range` are passed through as given. The service accepts
/// percentages of the source duration ("5%"), frame counts or ISO 8601
/// durations; no validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JpgImage {
    /// Position of the first thumbnail
    pub start: String,

    /// Interval between thumbnails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,

    /// How far into the source to keep generating thumbnails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Number of columns in the sprite grid; setting it turns output into a sprite
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_column: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Output image layers
    #[serde(default)]
    pub layers: Vec<JpgLayer>,
}

impl JpgImage {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            step: None,
            range: None,
            sprite_column: None,
            label: None,
            layers: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_sprite_column(mut self, columns: u32) -> Self {
        self.sprite_column = Some(columns);
        self
    }

    pub fn with_layer(mut self, layer: JpgLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Whether the thumbnails are tiled into a sprite.
    pub fn is_sprite(&self) -> bool {
        self.sprite_column.is_some()
    }
}

/// One JPEG output resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JpgLayer {
    /// Width in pixels or as a percentage of the source ("20%")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    /// Height in pixels or as a percentage of the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    /// JPEG quality, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl JpgLayer {
    pub fn new(width: impl Into<String>, height: impl Into<String>, quality: u8) -> Self {
        Self {
            width: Some(width.into()),
            height: Some(height.into()),
            quality: Some(quality),
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_copy_codecs_serialize_to_bare_discriminator() {
        let codecs = vec![Codec::copy_video(), Codec::copy_audio()];
        let value = serde_json::to_value(&codecs).unwrap();
        assert_eq!(
            value,
            json!([
                {"@odata.type": "#Microsoft.Media.CopyVideo"},
                {"@odata.type": "#Microsoft.Media.CopyAudio"}
            ])
        );
    }

    #[test]
    fn test_jpg_image_wire_format() {
        let image = JpgImage::new("0%")
            .with_step("5%")
            .with_range("100%")
            .with_sprite_column(10)
            .with_layer(JpgLayer::new("20%", "20%", 85));

        let value = serde_json::to_value(Codec::from(image)).unwrap();
        assert_eq!(
            value,
            json!({
                "@odata.type": "#Microsoft.Media.JpgImage",
                "start": "0%",
                "step": "5%",
                "range": "100%",
                "spriteColumn": 10,
                "layers": [{"width": "20%", "height": "20%", "quality": 85}]
            })
        );
    }

    #[test]
    fn test_unmodeled_codec_is_kept_verbatim() {
        let input = json!({
            "@odata.type": "#Microsoft.Media.AacAudio",
            "channels": 2,
            "samplingRate": 48000,
            "bitrate": 128000,
            "profile": "AacLc"
        });
        let codec: Codec = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(codec.kind(), "other");
        assert!(codec.as_jpg_image().is_none());
        assert_eq!(serde_json::to_value(&codec).unwrap(), input);
    }

    #[test]
    fn test_sprite_detection() {
        assert!(!JpgImage::new("0%").is_sprite());
        assert!(JpgImage::new("0%").with_sprite_column(4).is_sprite());
    }
}
