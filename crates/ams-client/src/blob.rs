//! Blob listing for asset containers.
//!
//! The storage List Blobs operation answers in XML; only the blob names,
//! sizes and the continuation marker are read.

use serde::Deserialize;

use crate::error::AmsResult;

/// A blob in an asset container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    /// Blob name, may contain `/` separated virtual directories
    pub name: String,
    pub content_length: Option<u64>,
}

impl BlobItem {
    /// Last path segment of the blob name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// One page of a List Blobs response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPage {
    pub blobs: Vec<BlobItem>,
    /// Marker for the next page; `None` on the last page
    pub next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    blobs: Blobs,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Blobs {
    #[serde(rename = "Blob", default)]
    items: Vec<BlobEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobEntry {
    name: String,
    #[serde(default)]
    properties: Option<BlobProperties>,
}

#[derive(Debug, Deserialize)]
struct BlobProperties {
    #[serde(rename = "Content-Length", default)]
    content_length: Option<u64>,
}

/// Parse a List Blobs response body.
pub fn parse_list_blobs(xml: &str) -> AmsResult<BlobPage> {
    let results: EnumerationResults = quick_xml::de::from_str(xml)?;

    let blobs = results
        .blobs
        .items
        .into_iter()
        .map(|entry| BlobItem {
            name: entry.name,
            content_length: entry.properties.and_then(|p| p.content_length),
        })
        .collect();

    Ok(BlobPage {
        blobs,
        next_marker: results.next_marker.filter(|m| !m.is_empty()),
    })
}
