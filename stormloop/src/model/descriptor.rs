//! Snapshot descriptors as listed in the index resource.

use chrono::{DateTime, Utc};

/// Geographic extent of a raster overlay: `[minLon, minLat, maxLon, maxLat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Build a bounding box from the index's `[minLon, minLat, maxLon, maxLat]`
    /// array. Returns `None` for non-finite values or inverted corners.
    pub fn from_array(bbox: [f64; 4]) -> Option<Self> {
        let [min_lon, min_lat, max_lon, max_lat] = bbox;
        if !bbox.iter().all(|v| v.is_finite()) || min_lon > max_lon || min_lat > max_lat {
            return None;
        }
        Some(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Corners as `[[minLat, minLon], [maxLat, maxLon]]`, the order map layers
    /// expect for image bounds.
    pub fn to_lat_lon_bounds(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }
}

/// A named raster overlay referenced by a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRef {
    /// Index field the overlay was listed under (e.g. `satellite_ir108`).
    pub name: String,
    /// Path of the raster image, relative to the data base URL.
    pub file: String,
    pub bbox: BoundingBox,
}

/// One entry of the snapshot index. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDescriptor {
    /// Seconds since the Unix epoch; unique key of the snapshot.
    pub timestamp: i64,
    pub display_date: String,
    /// Trajectory document paths, in display order.
    pub trajectory_refs: Vec<String>,
    pub report_ref: Option<String>,
    /// Overlays sorted by name.
    pub overlay_refs: Vec<OverlayRef>,
}

impl SnapshotDescriptor {
    /// Observation instant of the snapshot, or `None` if the timestamp is
    /// outside chrono's representable range.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
    }

    /// Looks up an overlay by its index field name.
    pub fn overlay(&self, name: &str) -> Option<&OverlayRef> {
        self.overlay_refs.iter().find(|o| o.name == name)
    }
}
