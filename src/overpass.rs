use std::{
    collections::BTreeMap,
    fs,
    io::{self, BufReader},
    path::Path,
};

use _model::{Coordinate, NatureTag, OsmId, Poi};
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use ureq::Agent;

use crate::{pipeline::TagSource, utils::spinner};

pub const DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("overpass request failed: {0}")]
    Request(#[from] Box<ureq::Error>),
    #[error("failed to read overpass response: {0}")]
    Read(#[from] io::Error),
    #[error("malformed overpass response: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct Overpass {
    agent: Agent,
    url: String,
}

impl Overpass {
    pub fn new(agent: Agent, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn query(&self, q: &str) -> Result<Vec<Poi>, QueryError> {
        let payload = format!("[out:json][timeout:25]; {q}");
        debug!(url = %self.url, "querying overpass");
        let response = self
            .agent
            .post(&self.url)
            .send_form(&[("data", &payload)])
            .map_err(Box::new)?;

        // large radii return bodies past into_string's 10 MB cap
        let response: OverpassResponse =
            serde_json::from_reader(BufReader::new(response.into_reader())).map_err(|e| {
                if e.is_io() {
                    QueryError::Read(e.into())
                } else {
                    QueryError::Malformed(e)
                }
            })?;
        Ok(refine(response))
    }
}

impl TagSource for Overpass {
    fn nearby(
        &self,
        centre: Coordinate,
        radius: f64,
        filters: &[NatureTag],
    ) -> Result<Vec<Poi>, QueryError> {
        let progress = spinner("Searching for points of interest...");
        let result = self.query(&around(centre, radius, filters));
        progress.finish_and_clear();
        result
    }
}

/// Union of every filter within `radius` metres of `centre`, with way and
/// relation centres.
pub fn around(centre: Coordinate, radius: f64, filters: &[NatureTag]) -> String {
    let (lat, lon) = (centre.lat(), centre.lon());
    let clauses = filters
        .iter()
        .map(|x| {
            format!(
                r#"  nwr["{}"="{}"](around:{radius},{lat},{lon});"#,
                x.key, x.value
            )
        })
        .join("\n");
    format!("(\n{clauses}\n);\nout tags center;")
}

/// Reads a saved Overpass JSON response.
pub fn load(path: &Path) -> Result<Vec<Poi>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse(&contents)?)
}

/// Named, well-formed elements of a response. Anything else is skipped.
pub fn parse(json: &str) -> Result<Vec<Poi>, QueryError> {
    Ok(refine(serde_json::from_str(json)?))
}

fn refine(response: OverpassResponse) -> Vec<Poi> {
    response
        .elements
        .into_iter()
        .filter_map(|x| x.refine())
        .filter(|x| {
            let named = x.name().is_some();
            if !named {
                debug!(id = %x.id, "skipping unnamed element");
            }
            named
        })
        .collect()
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawElement {
    Node {
        id: u64,
        lat: Option<f64>,
        lon: Option<f64>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

impl RawElement {
    fn refine(self) -> Option<Poi> {
        let (id, position, tags) = match self {
            Self::Node { id, lat, lon, tags } => (OsmId::Node(id), lat.zip(lon), tags),
            Self::Way { id, center, tags } => (OsmId::Way(id), center.map(|x| x.refine()), tags),
            Self::Relation { id, center, tags } => {
                (OsmId::Relation(id), center.map(|x| x.refine()), tags)
            }
        };

        let Some((lat, lon)) = position else {
            warn!(%id, "skipping element without a position");
            return None;
        };
        if tags.is_empty() {
            warn!(%id, "skipping element without tags");
            return None;
        }

        match Coordinate::new(lat, lon) {
            Ok(coordinate) => Some(Poi {
                id,
                coordinate,
                tags,
            }),
            Err(e) => {
                warn!(%id, "skipping element: {e}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

impl RawPosition {
    fn refine(self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, Read, Write},
        net::TcpListener,
        thread,
        time::Duration,
    };

    use _model::NATURE_TAGS;

    use super::*;
    use crate::utils;

    // answers a single POST with `body`
    fn serve_once(body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/interpreter", listener.local_addr().unwrap());
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(x) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    length = x.trim().parse().unwrap();
                }
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut request = vec![0; length];
            reader.read_exact(&mut request).unwrap();

            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(body.as_bytes()).unwrap();
        });
        url
    }

    fn overpass(url: String) -> Overpass {
        Overpass::new(utils::agent(Duration::from_secs(30)), url)
    }

    #[test]
    fn query_large_response() {
        let count = 130_000;
        let elements = (0..count)
            .map(|i| {
                format!(
                    r#"{{"type":"node","id":{i},"lat":1.0,"lon":2.0,"tags":{{"name":"Spring {i}","natural":"spring"}}}}"#
                )
            })
            .join(",");
        let body = format!(r#"{{"elements":[{elements}]}}"#);
        assert!(body.len() > 10 * 1024 * 1024);

        let pois = overpass(serve_once(body)).query("x").unwrap();
        assert_eq!(pois.len(), count);
        assert_eq!(pois[count - 1].id, OsmId::Node(count as u64 - 1));
    }

    #[test]
    fn query_malformed_response() {
        let url = serve_once("<html>too many requests</html>".to_string());
        assert!(matches!(
            overpass(url).query("x"),
            Err(QueryError::Malformed(_))
        ));
    }

    const RESPONSE: &str = r#"{
        "version": 0.6,
        "generator": "Overpass API",
        "elements": [
            {
                "type": "node",
                "id": 101,
                "lat": 42.2801,
                "lon": -83.7430,
                "tags": {"natural": "spring", "name": "Cold Spring"}
            },
            {
                "type": "node",
                "id": 102,
                "lat": 42.2802,
                "lon": -83.7431,
                "tags": {"natural": "rock"}
            },
            {
                "type": "way",
                "id": 201,
                "center": {"lat": 42.2790, "lon": -83.7380},
                "tags": {"leisure": "park", "name": "West Park"}
            },
            {
                "type": "way",
                "id": 202,
                "tags": {"leisure": "park", "name": "Nowhere Park"}
            },
            {
                "type": "relation",
                "id": 301,
                "center": {"lat": 42.3000, "lon": -83.7000},
                "tags": {"boundary": "protected_area", "name": "Barton Nature Area"}
            },
            {
                "type": "relation",
                "id": 302,
                "center": {"lat": 91.0, "lon": -83.7000},
                "tags": {"water": "lake", "name": "Broken Lake"}
            },
            {
                "type": "node",
                "id": 103,
                "lat": 42.2,
                "lon": -83.7
            }
        ]
    }"#;

    #[test]
    fn parse_response() {
        let pois = parse(RESPONSE).unwrap();
        let ids: Vec<_> = pois.iter().map(|x| x.id).collect();
        assert_eq!(
            ids,
            [OsmId::Node(101), OsmId::Way(201), OsmId::Relation(301)]
        );
        assert_eq!(pois[1].coordinate.lat(), 42.2790);
        assert_eq!(pois[1].coordinate.lon(), -83.7380);
        assert_eq!(pois[2].name(), Some("Barton Nature Area"));
    }

    #[test]
    fn parse_empty() {
        assert!(parse(r#"{"elements": []}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_malformed() {
        assert!(matches!(
            parse(r#"<html>rate limited</html>"#),
            Err(QueryError::Malformed(_))
        ));
        assert!(matches!(
            parse(r#"{"remark": "runtime error"}"#),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn query_text() {
        let centre = Coordinate::new(42.28, -83.74).unwrap();
        let q = around(centre, 1609.0, &NATURE_TAGS[..2]);
        assert_eq!(
            q,
            "(\n  nwr[\"leisure\"=\"park\"](around:1609,42.28,-83.74);\n  nwr[\"natural\"=\"wood\"](around:1609,42.28,-83.74);\n);\nout tags center;"
        );
    }

    #[test]
    fn query_covers_every_tag() {
        let centre = Coordinate::new(0.0, 0.0).unwrap();
        let q = around(centre, 500.0, &NATURE_TAGS);
        assert_eq!(q.matches("nwr[").count(), NATURE_TAGS.len());
        assert!(q.contains(r#"nwr["boundary"="national_park"](around:500,0,0);"#));
    }
}
