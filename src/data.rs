use crate::config::InputConfig;
use crate::types::{PopulationRecord, RawSubzone};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::GeoJson;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PopulationColumns {
    pub subzone: String,
    pub population: String,
}

impl PopulationColumns {
    pub fn from_config(input: &InputConfig) -> Self {
        Self {
            subzone: input.subzone_column.clone(),
            population: input.population_column.clone(),
        }
    }
}

pub async fn load_inputs(input: &InputConfig) -> Result<(Vec<RawSubzone>, Vec<PopulationRecord>)> {
    info!(
        boundaries = ?input.boundaries,
        population = ?input.population_csv,
        "Loading data..."
    );

    let boundaries_path = input.boundaries.clone();
    let description_property = input.description_property.clone();
    let boundaries = tokio::task::spawn_blocking(move || {
        load_boundaries(&boundaries_path, &description_property)
    });

    let population_path = input.population_csv.clone();
    let columns = PopulationColumns::from_config(input);
    let population = tokio::task::spawn_blocking(move || load_population(&population_path, &columns));

    let (subzones, records) = tokio::try_join!(joined(boundaries), joined(population))?;

    info!(
        features = subzones.len(),
        records = records.len(),
        "Loaded boundaries and population table"
    );

    Ok((subzones, records))
}

async fn joined<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await.context("Loader task did not complete")?
}

pub fn load_boundaries(path: &Path, description_property: &str) -> Result<Vec<RawSubzone>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    parse_boundaries(BufReader::new(file), description_property)
        .with_context(|| format!("Failed to load boundaries from {:?}", path))
}

pub fn parse_boundaries<R: Read>(reader: R, description_property: &str) -> Result<Vec<RawSubzone>> {
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut subzones = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let description = match feature
            .properties
            .as_ref()
            .and_then(|props| props.get(description_property))
        {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => {
                return Err(anyhow!(
                    "Feature {} has no string '{}' property",
                    index,
                    description_property
                ))
            }
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let geometry: geo::Geometry<f64> = geom.value.try_into()
                    .map_err(|e| anyhow!("Feature {}: failed to convert geometry: {:?}", index, e))?;

                match geometry {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => {
                        warn!("Skipping feature {}: geometry is not a polygon", index);
                        continue;
                    }
                }
            }
            None => {
                warn!("Skipping feature {}: no geometry", index);
                continue;
            }
        };

        subzones.push(RawSubzone {
            index,
            description,
            geometry,
        });
    }

    Ok(subzones)
}

pub fn load_population(path: &Path, columns: &PopulationColumns) -> Result<Vec<PopulationRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    parse_population(file, columns)
        .with_context(|| format!("Failed to load population table from {:?}", path))
}

pub fn parse_population<R: Read>(reader: R, columns: &PopulationColumns) -> Result<Vec<PopulationRecord>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let subzone_idx = headers.iter().position(|h| h == columns.subzone)
        .ok_or_else(|| anyhow!("Column '{}' not found in CSV", columns.subzone))?;
    let population_idx = headers.iter().position(|h| h == columns.population)
        .ok_or_else(|| anyhow!("Column '{}' not found in CSV", columns.population))?;

    let mut records = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let subzone = record.get(subzone_idx).unwrap_or("").trim().to_string();
        if subzone.is_empty() {
            continue;
        }

        let raw = record.get(population_idx).unwrap_or("");
        let population = parse_population_value(raw)
            .ok_or_else(|| anyhow!("Row {}: population '{}' for '{}' is not a count", row + 1, raw, subzone))?;

        records.push(PopulationRecord { subzone, population });
    }

    Ok(records)
}

/// Parses a population cell. `-` and blank are the table's nil markers and count as 0;
/// thousands separators are accepted.
pub fn parse_population_value(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Some(0);
    }
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}
