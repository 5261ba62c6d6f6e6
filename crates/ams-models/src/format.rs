//! Output formats and filename patterns.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Output format of a standard encoder preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "@odata.type")]
pub enum Format {
    /// MP4 multiplexer for audio/video tracks
    #[serde(rename = "#Microsoft.Media.Mp4Format")]
    Mp4(Mp4Format),
    /// JPEG images, including sprites
    #[serde(rename = "#Microsoft.Media.JpgFormat")]
    Jpg(JpgFormat),
    /// Any other format (TransportStreamFormat, PngFormat, ...), kept verbatim
    #[serde(untagged)]
    Other(Map<String, Value>),
}

impl Format {
    pub fn mp4(filename_pattern: impl Into<String>) -> Self {
        Format::Mp4(Mp4Format {
            filename_pattern: filename_pattern.into(),
        })
    }

    pub fn jpg(filename_pattern: impl Into<String>) -> Self {
        Format::Jpg(JpgFormat {
            filename_pattern: filename_pattern.into(),
        })
    }

    pub fn filename_pattern(&self) -> &str {
        match self {
            Format::Mp4(f) => &f.filename_pattern,
            Format::Jpg(f) => &f.filename_pattern,
            Format::Other(fields) => fields
                .get("filenamePattern")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        }
    }

    /// Macros referenced by the filename pattern, in order of appearance.
    pub fn macros(&self) -> Vec<FilenameMacro> {
        FilenameMacro::scan(self.filename_pattern())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mp4Format {
    pub filename_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JpgFormat {
    pub filename_pattern: String,
}

/// Placeholders the service substitutes when naming output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilenameMacro {
    Basename,
    Label,
    Bitrate,
    Extension,
    Index,
}

impl FilenameMacro {
    pub const ALL: &'static [FilenameMacro] = &[
        FilenameMacro::Basename,
        FilenameMacro::Label,
        FilenameMacro::Bitrate,
        FilenameMacro::Extension,
        FilenameMacro::Index,
    ];

    /// The placeholder text including braces.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FilenameMacro::Basename => "{Basename}",
            FilenameMacro::Label => "{Label}",
            FilenameMacro::Bitrate => "{Bitrate}",
            FilenameMacro::Extension => "{Extension}",
            FilenameMacro::Index => "{Index}",
        }
    }

    /// Find recognized placeholders in a pattern. Unrecognized `{...}` text is skipped.
    pub fn scan(pattern: &str) -> Vec<FilenameMacro> {
        let mut found = Vec::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            let tail = &rest[open..];
            match FilenameMacro::ALL
                .iter()
                .find(|m| tail.starts_with(m.placeholder()))
            {
                Some(m) => {
                    found.push(*m);
                    rest = &tail[m.placeholder().len()..];
                }
                None => rest = &tail[1..],
            }
        }

        found
    }
}

impl fmt::Display for FilenameMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_wire_format() {
        let formats = vec![
            Format::mp4("CopyCodec-{Basename}{Extension}"),
            Format::jpg("sprite-{Basename}-{Index}{Extension}"),
        ];
        assert_eq!(
            serde_json::to_value(&formats).unwrap(),
            json!([
                {"@odata.type": "#Microsoft.Media.Mp4Format", "filenamePattern": "CopyCodec-{Basename}{Extension}"},
                {"@odata.type": "#Microsoft.Media.JpgFormat", "filenamePattern": "sprite-{Basename}-{Index}{Extension}"}
            ])
        );
    }

    #[test]
    fn test_unmodeled_format_is_kept_verbatim() {
        let input = json!({
            "@odata.type": "#Microsoft.Media.TransportStreamFormat",
            "filenamePattern": "{Basename}_{Bitrate}{Extension}"
        });
        let format: Format = serde_json::from_value(input.clone()).unwrap();
        assert!(matches!(format, Format::Other(_)));
        assert_eq!(format.filename_pattern(), "{Basename}_{Bitrate}{Extension}");
        assert_eq!(
            format.macros(),
            vec![
                FilenameMacro::Basename,
                FilenameMacro::Bitrate,
                FilenameMacro::Extension
            ]
        );
        assert_eq!(serde_json::to_value(&format).unwrap(), input);
    }

    #[test]
    fn test_macro_scan() {
        assert_eq!(
            FilenameMacro::scan("sprite-{Basename}-{Index}{Extension}"),
            vec![
                FilenameMacro::Basename,
                FilenameMacro::Index,
                FilenameMacro::Extension
            ]
        );
        assert_eq!(
            FilenameMacro::scan("{Label}_{Bitrate}{{Nope}"),
            vec![FilenameMacro::Label, FilenameMacro::Bitrate]
        );
        assert!(FilenameMacro::scan("plain.mp4").is_empty());
    }
}
