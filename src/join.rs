use crate::description::SubzoneAttributes;
use crate::types::{PopulationRecord, RawSubzone, Subzone};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;

    for c in s.chars().flat_map(char::to_lowercase) {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }

    out
}

fn join_key(name: &str) -> String {
    name.trim().to_uppercase()
}

pub struct PopulationIndex {
    by_name: HashMap<String, u64>,
}

impl PopulationIndex {
    pub fn new(records: &[PopulationRecord]) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for record in records {
            // first record for a name wins
            by_name.entry(join_key(&record.subzone)).or_insert(record.population);
        }
        Self { by_name }
    }

    pub fn lookup(&self, subzone_name: &str) -> Option<u64> {
        self.by_name.get(&join_key(subzone_name)).copied()
    }
}

pub fn join_features(raw: Vec<RawSubzone>, records: &[PopulationRecord]) -> Result<Vec<Subzone>> {
    info!("Joining {} features against {} population records...", raw.len(), records.len());

    let index = PopulationIndex::new(records);

    let joined: Vec<(Subzone, bool)> = raw
        .into_par_iter()
        .map(|feature| -> Result<(Subzone, bool)> {
            let attrs = SubzoneAttributes::from_description(&feature.description)
                .with_context(|| format!("Feature {} has an invalid description", feature.index))?;

            let matched = index.lookup(&attrs.subzone_name);

            Ok((
                Subzone {
                    planning_area: title_case(&attrs.planning_area),
                    region: title_case(&attrs.region),
                    subzone_name: attrs.subzone_name,
                    population: matched.unwrap_or(0),
                    geometry: feature.geometry,
                },
                matched.is_some(),
            ))
        })
        .collect::<Result<_>>()?;

    let unmatched: Vec<&str> = joined
        .iter()
        .filter(|(_, matched)| !matched)
        .map(|(s, _)| s.subzone_name.as_str())
        .collect();

    if !unmatched.is_empty() {
        warn!(
            count = unmatched.len(),
            "Subzones without a population record, drawn as zero: {}",
            unmatched.join(", ")
        );
    }
    info!(matched = joined.len() - unmatched.len(), "Join complete");

    Ok(joined.into_iter().map(|(s, _)| s).collect())
}
