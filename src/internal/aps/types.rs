//! Response schemas for the Data Management endpoints the tools read.
//!
//! Only the fields the tools render are modelled and every one of them is optional: APS omits
//! attributes freely depending on hub type (BIM 360, ACC, personal) and file type.

use serde::Deserialize;
use serde_json::Value;

/// JSON:API envelope. `data` is `None` when the key is missing entirely, which the tools report
/// differently from an empty list.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct JsonApi<T> {
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

impl<T> JsonApi<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data: Some(data) }
    }

    pub fn missing() -> Self {
        Self { data: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hub {
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: HubAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubAttributes {
    pub name: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub extension: HubExtension,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubExtension {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: ProjectAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectAttributes {
    pub name: Option<String>,
    pub status: Option<String>,
}

/// A child of a folder: either a sub-folder (`type == "folders"`) or a file item
/// (`type == "items"`). Top folders use the same shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderEntry {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub attributes: EntryAttributes,
}

impl FolderEntry {
    pub fn is_folder(&self) -> bool {
        self.kind.as_deref() == Some("folders")
    }

    pub fn is_item(&self) -> bool {
        self.kind.as_deref() == Some("items")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.attributes.display_name.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAttributes {
    pub display_name: Option<String>,
    pub file_type: Option<String>,
    pub last_modified_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Version {
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: VersionAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionAttributes {
    pub version_number: Option<Value>,
    pub display_name: Option<String>,
    pub file_type: Option<String>,
    /// Bytes. Usually a number, but some hubs report a string such as `"Unknown"`.
    pub storage_size: Option<Value>,
    pub create_time: Option<String>,
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub extension: VersionExtension,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionExtension {
    #[serde(default)]
    pub data: VersionExtensionData,
}

/// Authoring-tool fields published with Revit models. Values are strings or numbers depending on
/// the publisher, so they are kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionExtensionData {
    pub revit_project_version: Option<Value>,
    pub model_version: Option<Value>,
    pub publish_type: Option<Value>,
    pub process_state: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_data_key_is_distinct_from_empty() {
        let missing: JsonApi<Hub> = serde_json::from_value(json!({"jsonapi": {"version": "1.0"}})).unwrap();
        assert!(missing.data.is_none());

        let empty: JsonApi<Hub> = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(empty.data.map(|d| d.len()), Some(0));
    }

    #[test]
    fn test_folder_entry_kinds() {
        let contents: JsonApi<FolderEntry> = serde_json::from_value(json!({
            "data": [
                {"type": "folders", "id": "urn:f", "attributes": {"displayName": "Plans"}},
                {"type": "items", "id": "urn:i", "attributes": {
                    "displayName": "Tower.rvt",
                    "fileType": "rvt",
                    "lastModifiedTime": "2024-03-01T10:00:00.000Z"
                }}
            ]
        }))
        .unwrap();
        let data = contents.data.unwrap();
        assert!(data[0].is_folder());
        assert_eq!(data[0].display_name(), Some("Plans"));
        assert!(data[1].is_item());
        assert_eq!(data[1].attributes.file_type.as_deref(), Some("rvt"));
    }

    #[test]
    fn test_version_tolerates_loose_field_types() {
        let version: Version = serde_json::from_value(json!({
            "id": "urn:adsk.wipprod:fs.file:vf.abc?version=2",
            "attributes": {
                "versionNumber": 2,
                "storageSize": "Unknown",
                "extension": {"data": {"revitProjectVersion": 2024, "modelVersion": "17"}}
            }
        }))
        .unwrap();
        assert_eq!(version.attributes.version_number, Some(json!(2)));
        assert_eq!(version.attributes.storage_size, Some(json!("Unknown")));
        assert_eq!(
            version.attributes.extension.data.revit_project_version,
            Some(json!(2024))
        );
        assert!(version.attributes.extension.data.publish_type.is_none());
    }
}
