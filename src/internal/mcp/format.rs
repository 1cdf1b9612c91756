//! Plain-text summaries returned by the tools.
//!
//! Every renderer masks the identifiers it prints, which is also how identifiers get registered
//! for later reverse lookup.

use serde_json::Value;

use crate::internal::{
    aps::{FolderEntry, Hub, Project, Version},
    mask::{EntityKind, MaskRegistry},
};

/// Separator between summary blocks.
pub const BLOCK_SEPARATOR: &str = "\n---\n";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
}

/// Renders a loosely typed JSON attribute: strings without quotes, numbers and booleans as-is.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `"<x.xx> MB"` for a positive numeric byte count, `"Unknown size"` for anything else.
pub fn format_size(storage_size: Option<&Value>) -> String {
    match storage_size.and_then(Value::as_f64) {
        Some(bytes) if bytes > 0.0 => format!("{:.2} MB", bytes / BYTES_PER_MB),
        _ => "Unknown size".to_string(),
    }
}

pub fn format_hub(masks: &mut MaskRegistry, hub: &Hub) -> String {
    let masked_id = masks.mask_opt(EntityKind::Hub, hub.id.as_deref());
    let attributes = &hub.attributes;
    format!(
        "\nID: {}\nName: {}\nType: {}\nRegion: {}\n",
        masked_id,
        or_unknown(attributes.name.as_deref()),
        or_unknown(attributes.extension.kind.as_deref()),
        or_unknown(attributes.region.as_deref()),
    )
}

pub fn format_project(masks: &mut MaskRegistry, project: &Project) -> String {
    let masked_id = masks.mask_opt(EntityKind::Project, project.id.as_deref());
    format!(
        "\nID: {}\nName: {}\nStatus: {}\n",
        masked_id,
        or_unknown(project.attributes.name.as_deref()),
        or_unknown(project.attributes.status.as_deref()),
    )
}

/// Renders a folder child. Folders are masked as folders, everything else as items.
pub fn format_entry(masks: &mut MaskRegistry, entry: &FolderEntry) -> String {
    let kind = if entry.is_folder() {
        EntityKind::Folder
    } else {
        EntityKind::Item
    };
    let masked_id = masks.mask_opt(kind, entry.id.as_deref());
    let attributes = &entry.attributes;
    format!(
        "\nID: {}\nType: {}\nName: {}\nFile Type: {}\nLast Modified: {}\n",
        masked_id,
        or_unknown(entry.kind.as_deref()),
        or_unknown(attributes.display_name.as_deref()),
        attributes.file_type.as_deref().unwrap_or("N/A"),
        or_unknown(attributes.last_modified_time.as_deref()),
    )
}

pub fn format_version(masks: &mut MaskRegistry, version: &Version) -> String {
    let masked_id = masks.mask_opt(EntityKind::Version, version.id.as_deref());
    let attributes = &version.attributes;
    let number = attributes
        .version_number
        .as_ref()
        .map(value_text)
        .unwrap_or_else(|| "Unknown".to_string());

    let mut lines = vec![
        format!("Version {number} (ID: {masked_id})"),
        format!("File: {}", or_unknown(attributes.display_name.as_deref())),
        format!("Type: {}", or_unknown(attributes.file_type.as_deref())),
        format!("Size: {}", format_size(attributes.storage_size.as_ref())),
    ];

    let created = attributes.create_time.as_deref();
    if let Some(created) = created {
        lines.push(format!("Created: {created}"));
    }
    if let Some(modified) = attributes.last_modified_time.as_deref()
        && Some(modified) != created
    {
        lines.push(format!("Modified: {modified}"));
    }

    let extension = &attributes.extension.data;
    let optional = [
        ("Revit Version", &extension.revit_project_version),
        ("Model Version", &extension.model_version),
        ("Publish Type", &extension.publish_type),
        ("Process State", &extension.process_state),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {}", value_text(value)));
        }
    }

    lines.join("\n")
}
