use serde::Deserialize;
use serde_json::Value;

use crate::error::VaultError;
use crate::journal::attachments::AttachmentFamily;

/// One `{identifier, md5, type}` record from `photos` or `pdfAttachments`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    pub identifier: String,
    pub md5: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub conditions_description: Option<String>,
    pub temperature_celsius: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub place_name: Option<String>,
    pub locality_name: Option<String>,
    pub administrative_area: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, alias = "uuid")]
    pub identifier: Option<String>,
    pub creation_date: String,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photos: Vec<MediaRef>,
    #[serde(default)]
    pub pdf_attachments: Vec<MediaRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Entry {
    /// Decode one raw record. Failures stay scoped to this entry.
    pub fn from_value(index: usize, raw: &Value) -> Result<Self, VaultError> {
        Self::deserialize(raw).map_err(|err| VaultError::MalformedEntry {
            index,
            reason: err.to_string(),
        })
    }

    pub fn media(&self, family: AttachmentFamily) -> &[MediaRef] {
        match family {
            AttachmentFamily::Photo => &self.photos,
            AttachmentFamily::Pdf => &self.pdf_attachments,
        }
    }

    pub fn label(&self, index: usize) -> String {
        match &self.identifier {
            Some(id) => format!("#{index} ({id})"),
            None => format!("#{index}"),
        }
    }
}

/// Split the export into raw entry records, keeping source order.
pub fn parse_entries(raw: &str) -> Result<Vec<Value>, VaultError> {
    let mut doc: Value =
        serde_json::from_str(raw).map_err(|err| VaultError::InvalidExport(err.to_string()))?;
    match doc.get_mut("entries").map(Value::take) {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(VaultError::InvalidExport(
            "`entries` is not an array".to_string(),
        )),
        None => Err(VaultError::InvalidExport(
            "missing top-level `entries`".to_string(),
        )),
    }
}
