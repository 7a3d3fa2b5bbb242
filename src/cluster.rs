//! Greedy chaining of nearby points into clusters.
//!
//! Points are taken in input order. Each one joins the first cluster holding
//! any member within the threshold, so a cluster can stretch well past the
//! threshold through a chain of close neighbours. The result depends on input
//! order.

use std::collections::HashSet;

use _model::Poi;
use tracing::debug;

// metres
pub const DEFAULT_THRESHOLD: f64 = 50.0;

pub fn cluster(pois: Vec<Poi>, threshold: f64) -> Vec<Vec<Poi>> {
    let mut clusters: Vec<Vec<Poi>> = Vec::new();

    for poi in pois {
        let nearby = clusters.iter_mut().find(|cluster| {
            cluster
                .iter()
                .any(|x| poi.coordinate.distance(&x.coordinate) <= threshold)
        });

        match nearby {
            Some(cluster) => cluster.push(poi),
            None => clusters.push(vec![poi]),
        }
    }

    clusters
}

/// The member with the most tags, ties going to the larger name. Missing
/// names compare as empty; full ties keep the earliest member.
pub fn select_representative(cluster: &[Poi]) -> Option<&Poi> {
    let mut best: Option<&Poi> = None;
    for x in cluster {
        best = match best {
            Some(b) if rank(x) <= rank(b) => Some(b),
            _ => Some(x),
        };
    }
    best
}

fn rank(poi: &Poi) -> (usize, &str) {
    (poi.tag_count(), poi.name().unwrap_or_default())
}

/// Clusters `pois` and keeps one named representative per cluster.
///
/// A representative without a name, or with a name already taken by an
/// earlier cluster, is dropped rather than merged.
pub fn group(pois: Vec<Poi>, threshold: f64) -> Vec<Poi> {
    let input = pois.len();
    let clusters = cluster(pois, threshold);
    debug!(input, clusters = clusters.len(), threshold, "clustered points");

    let mut seen = HashSet::new();
    let mut output = Vec::new();
    for cluster in &clusters {
        let Some(poi) = select_representative(cluster) else {
            continue;
        };

        match poi.name() {
            Some(name) if !name.is_empty() => {
                if seen.insert(name.to_string()) {
                    output.push(poi.clone());
                } else {
                    debug!(name, id = %poi.id, "dropping representative with repeated name");
                }
            }
            _ => debug!(id = %poi.id, "dropping unnamed representative"),
        }
    }

    output
}
