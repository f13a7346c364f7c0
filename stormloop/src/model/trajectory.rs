//! Trajectory documents: observed and forecast positions of one system.

use serde::Deserialize;

/// Top-level shape of a trajectory file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrajectoryDocument {
    pub cyclone_trajectory: Trajectory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trajectory {
    #[serde(default)]
    pub cyclone_name: String,
    #[serde(default)]
    pub reference_time: String,
    pub features: Vec<Feature>,
}

impl Trajectory {
    /// Features tagged with the given data type, in document order.
    pub fn features_of(&self, data_type: DataType) -> impl Iterator<Item = &Feature> {
        self.features
            .iter()
            .filter(move |f| f.properties.data_type == data_type)
    }

    /// The most recent analysis point (last in document order).
    pub fn latest_analysis(&self) -> Option<&Feature> {
        self.features_of(DataType::Analysis).last()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[lon, lat]`
    Point { coordinates: [f64; 2] },
    /// Rings of `[lon, lat]` positions.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Analysis,
    Forecast,
    UncertaintyCone,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureProperties {
    pub data_type: DataType,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub cyclone_data: Option<CycloneData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CycloneData {
    #[serde(default)]
    pub development: String,
    #[serde(default)]
    pub minimum_pressure: Option<f64>,
    #[serde(default)]
    pub maximum_wind: Option<MaximumWind>,
    #[serde(default, rename = "Dvorak")]
    pub dvorak: Option<Dvorak>,
}

/// Sustained wind and gusts, in knots.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MaximumWind {
    pub wind_speed_kt: f64,
    pub wind_speed_gust_kt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Dvorak {
    #[serde(rename = "final_T_number")]
    pub final_t_number: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "cyclone_trajectory": {
            "cyclone_name": "BELAL",
            "reference_time": "2024-01-15T06:00:00Z",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [55.1, -20.9]},
                 "properties": {"data_type": "analysis", "time": "2024-01-15T00:00:00Z",
                    "cyclone_data": {"development": "tropical cyclone", "minimum_pressure": 975,
                        "maximum_wind": {"wind_speed_kt": 70, "wind_speed_gust_kt": 100},
                        "Dvorak": {"final_T_number": 4.5}}}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [55.4, -21.2]},
                 "properties": {"data_type": "analysis", "time": "2024-01-15T06:00:00Z"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [56.0, -22.0]},
                 "properties": {"data_type": "forecast", "time": "2024-01-16T06:00:00Z"}},
                {"type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[55.0, -21.0], [56.0, -21.0], [56.0, -22.0], [55.0, -21.0]]]},
                 "properties": {"data_type": "uncertainty_cone", "time": "2024-01-16T06:00:00Z"}}
            ]
        }
    }"#;

    #[test]
    fn test_parses_all_feature_kinds() {
        let doc: TrajectoryDocument = serde_json::from_str(SAMPLE).unwrap();
        let trajectory = &doc.cyclone_trajectory;

        assert_eq!(trajectory.cyclone_name, "BELAL");
        assert_eq!(trajectory.features.len(), 4);
        assert_eq!(trajectory.features_of(DataType::Analysis).count(), 2);
        assert_eq!(trajectory.features_of(DataType::Forecast).count(), 1);
        assert!(matches!(
            trajectory.features[3].geometry,
            Geometry::Polygon { .. }
        ));
    }

    #[test]
    fn test_cyclone_data_fields() {
        let doc: TrajectoryDocument = serde_json::from_str(SAMPLE).unwrap();
        let data = doc.cyclone_trajectory.features[0]
            .properties
            .cyclone_data
            .as_ref()
            .unwrap();

        assert_eq!(data.minimum_pressure, Some(975.0));
        assert_eq!(data.maximum_wind.unwrap().wind_speed_gust_kt, 100.0);
        assert_eq!(data.dvorak.unwrap().final_t_number, 4.5);
    }

    #[test]
    fn test_latest_analysis_is_last_in_order() {
        let doc: TrajectoryDocument = serde_json::from_str(SAMPLE).unwrap();
        let latest = doc.cyclone_trajectory.latest_analysis().unwrap();
        assert_eq!(latest.properties.time, "2024-01-15T06:00:00Z");
    }

    #[test]
    fn test_unknown_data_type_is_rejected() {
        let json = r#"{"cyclone_trajectory": {"features": [
            {"geometry": {"type": "Point", "coordinates": [0, 0]},
             "properties": {"data_type": "hindcast"}}]}}"#;
        assert!(serde_json::from_str::<TrajectoryDocument>(json).is_err());
    }
}
