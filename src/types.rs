use geo::MultiPolygon;
use serde::Serialize;

/// A boundary feature as read from the GeoJSON, before its description is parsed.
#[derive(Debug, Clone)]
pub struct RawSubzone {
    pub index: usize,
    pub description: String,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRecord {
    pub subzone: String,
    pub population: u64,
}

#[derive(Debug, Clone)]
pub struct Subzone {
    pub subzone_name: String,
    pub planning_area: String, // title-cased
    pub region: String,        // title-cased
    pub population: u64,       // 0 when no record matched
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubzoneInfo {
    pub subzone_name: String,
    pub planning_area: String,
    pub region: String,
    pub population: u64,
}

impl From<&Subzone> for SubzoneInfo {
    fn from(subzone: &Subzone) -> Self {
        Self {
            subzone_name: subzone.subzone_name.clone(),
            planning_area: subzone.planning_area.clone(),
            region: subzone.region.clone(),
            population: subzone.population,
        }
    }
}
