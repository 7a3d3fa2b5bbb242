use _model::Coordinate;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

pub const DEFAULT_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub address: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

pub struct Nominatim {
    agent: Agent,
    url: String,
}

impl Nominatim {
    pub fn new(agent: Agent, url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            agent,
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Best match for a free-text address, if any.
    pub fn search(&self, address: &str) -> Result<Option<Location>> {
        let places: Vec<Place> = self
            .agent
            .get(&format!("{}/search", self.url))
            .query("q", address)
            .query("format", "jsonv2")
            .query("limit", "1")
            .call()?
            .into_json()
            .context("failed to parse nominatim search response")?;

        places.into_iter().next().map(Place::refine).transpose()
    }

    pub fn reverse(&self, coordinate: Coordinate) -> Result<Option<Location>> {
        let response: Reverse = self
            .agent
            .get(&format!("{}/reverse", self.url))
            .query("lat", &coordinate.lat().to_string())
            .query("lon", &coordinate.lon().to_string())
            .query("format", "jsonv2")
            .call()?
            .into_json()
            .context("failed to parse nominatim reverse response")?;

        match response {
            Reverse::Found(x) => x.refine().map(Some),
            Reverse::Missing { error } => {
                debug!(%error, "nothing found by reverse geocoding");
                Ok(None)
            }
        }
    }
}

// nominatim sends coordinates as strings
#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

impl Place {
    fn refine(self) -> Result<Location> {
        let lat = self.lat.parse().context("invalid latitude")?;
        let lon = self.lon.parse().context("invalid longitude")?;
        Ok(Location {
            address: self.display_name,
            coordinate: Coordinate::new(lat, lon)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reverse {
    Found(Place),
    Missing { error: String },
}
