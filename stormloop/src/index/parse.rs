//! Wire format of the index resource.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::IndexError;
use crate::model::{BoundingBox, OverlayRef, SnapshotDescriptor};

/// One index entry as it appears on the wire.
///
/// Fields other than the four known ones are kept in `extra`; any of them
/// holding an object with a `file` key is an overlay reference.
#[derive(Debug, Deserialize)]
struct RawIndexEntry {
    timestamp: i64,
    date: String,
    trajectory_files: Vec<String>,
    #[serde(default)]
    report_file: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawOverlay {
    file: String,
    bbox: [f64; 4],
}

/// Parses an index body into descriptors sorted ascending by timestamp.
///
/// The sort is stable, so entries sharing a timestamp keep their relative
/// order.
///
/// ```
/// use stormloop::index::parse_index;
///
/// let body = br#"[
///     {"timestamp": 2, "date": "b", "trajectory_files": ["t2.json"], "report_file": null},
///     {"timestamp": 1, "date": "a", "trajectory_files": ["t1.json"], "report_file": "r1.json",
///      "satellite_ir108": {"file": "ir/1.png", "bbox": [40, -30, 70, -5]}}
/// ]"#;
///
/// let descriptors = parse_index(body).unwrap();
/// assert_eq!(descriptors[0].timestamp, 1);
/// assert_eq!(descriptors[0].overlay_refs[0].name, "satellite_ir108");
/// ```
pub fn parse_index(body: &[u8]) -> Result<Vec<SnapshotDescriptor>, IndexError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| IndexError::Malformed(format!("invalid JSON: {}", e)))?;

    let Value::Array(entries) = value else {
        return Err(IndexError::Malformed("expected a JSON array".to_string()));
    };

    if entries.is_empty() {
        return Err(IndexError::Malformed("index contains no snapshots".to_string()));
    }

    let mut descriptors = entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| to_descriptor(position, entry))
        .collect::<Result<Vec<_>, _>>()?;

    descriptors.sort_by_key(|d| d.timestamp);
    Ok(descriptors)
}

fn to_descriptor(position: usize, entry: Value) -> Result<SnapshotDescriptor, IndexError> {
    let raw: RawIndexEntry = serde_json::from_value(entry)
        .map_err(|e| IndexError::Malformed(format!("entry {}: {}", position, e)))?;

    let mut overlay_refs = Vec::new();
    for (name, value) in raw.extra {
        let is_overlay = value
            .as_object()
            .is_some_and(|object| object.contains_key("file"));
        if !is_overlay {
            continue;
        }

        let overlay: RawOverlay = serde_json::from_value(value).map_err(|e| {
            IndexError::Malformed(format!("entry {} overlay '{}': {}", position, name, e))
        })?;
        let bbox = BoundingBox::from_array(overlay.bbox).ok_or_else(|| {
            IndexError::Malformed(format!(
                "entry {} overlay '{}': invalid bbox {:?}",
                position, name, overlay.bbox
            ))
        })?;

        overlay_refs.push(OverlayRef {
            name,
            file: overlay.file,
            bbox,
        });
    }
    overlay_refs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(SnapshotDescriptor {
        timestamp: raw.timestamp,
        display_date: raw.date,
        trajectory_refs: raw.trajectory_files,
        report_ref: raw.report_file,
        overlay_refs,
    })
}
