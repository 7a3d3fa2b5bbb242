use std::collections::HashSet;

use _model::{classify, Coordinate, NatureTag, OsmId, Poi, Tags, NATURE_TAGS};
use serde::Serialize;
use tracing::{debug, info};

use crate::{cluster, overpass::QueryError};

/// Anything that can answer "which tagged points lie within `radius` metres
/// of `centre` and carry one of `filters`".
pub trait TagSource {
    fn nearby(
        &self,
        centre: Coordinate,
        radius: f64,
        filters: &[NatureTag],
    ) -> Result<Vec<Poi>, QueryError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: OsmId,
    pub name: String,
    pub category: Option<&'static str>,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub tags: Tags,
}

/// Drops every point sharing exact coordinates with an earlier one.
pub fn dedup_locations(pois: Vec<Poi>) -> Vec<Poi> {
    let mut seen = HashSet::new();
    pois.into_iter()
        .filter(|x| seen.insert(x.coordinate.key()))
        .collect()
}

pub fn run(pois: Vec<Poi>, threshold: f64) -> Vec<Entry> {
    let raw = pois.len();
    let pois = dedup_locations(pois);
    debug!(raw, unique = pois.len(), "deduplicated locations");

    let mut representatives = cluster::group(pois, threshold);
    representatives.sort_by(|a, b| sort_name(a).cmp(sort_name(b)));

    representatives
        .into_iter()
        .map(|x| Entry {
            id: x.id,
            name: sort_name(&x).to_string(),
            category: classify(&x.tags),
            coordinate: x.coordinate,
            tags: x.tags,
        })
        .collect()
}

fn sort_name(poi: &Poi) -> &str {
    poi.name().unwrap_or("Unnamed")
}

/// Fetches nature points around `centre` and reduces them to a sorted report.
///
/// A failed query is returned as is; nothing here retries.
pub fn search(
    source: &impl TagSource,
    centre: Coordinate,
    radius: f64,
    threshold: f64,
) -> Result<Vec<Entry>, QueryError> {
    let pois = source.nearby(centre, radius, &NATURE_TAGS)?;
    info!(found = pois.len(), radius, "fetched points of interest");
    Ok(run(pois, threshold))
}
