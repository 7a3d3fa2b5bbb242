use _model::Coordinate;
use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::{info, warn};
use ureq::Agent;

use crate::nominatim::{Location, Nominatim};

const ATTEMPTS: u32 = 3;

/// Approximate location of this machine's public IP address.
pub fn by_ip(agent: &Agent, nominatim: &Nominatim) -> Result<Location> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match lookup(agent, nominatim) {
            Ok(x) => return Ok(x),
            Err(e) if attempt < ATTEMPTS && is_transport(&e) => {
                warn!(attempt, "location lookup failed, retrying: {e:#}");
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_transport(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<ureq::Error>(), Some(ureq::Error::Transport(_)))
}

fn lookup(agent: &Agent, nominatim: &Nominatim) -> Result<Location> {
    let ip: Ipify = agent
        .get("https://api.ipify.org")
        .query("format", "json")
        .call()?
        .into_json()?;
    info!(ip = %ip.ip, "found public address");

    let geo: IpApi = agent
        .get(&format!("http://ip-api.com/json/{}", ip.ip))
        .call()?
        .into_json()?;
    let coordinate = geo.coordinate()?;
    info!(lat = coordinate.lat(), lon = coordinate.lon(), "located address");

    Ok(nominatim.reverse(coordinate)?.unwrap_or_else(|| Location {
        address: format!("{}, {}", coordinate.lat(), coordinate.lon()),
        coordinate,
    }))
}

#[derive(Deserialize)]
struct Ipify {
    ip: String,
}

#[derive(Deserialize)]
struct IpApi {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApi {
    fn coordinate(&self) -> Result<Coordinate> {
        match (self.status.as_str(), self.lat, self.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)?),
            _ => bail!(
                "ip lookup failed: {}",
                self.message.as_deref().unwrap_or(&self.status)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_api_success() {
        let geo: IpApi = serde_json::from_str(
            r#"{"status": "success", "country": "United States", "lat": 42.2776, "lon": -83.7409, "query": "198.51.100.1"}"#,
        )
        .unwrap();
        let coordinate = geo.coordinate().unwrap();
        assert_eq!((coordinate.lat(), coordinate.lon()), (42.2776, -83.7409));
    }

    #[test]
    fn ip_api_failure() {
        let geo: IpApi = serde_json::from_str(
            r#"{"status": "fail", "message": "private range", "query": "10.0.0.1"}"#,
        )
        .unwrap();
        let err = geo.coordinate().unwrap_err();
        assert_eq!(err.to_string(), "ip lookup failed: private range");
    }

    #[test]
    fn only_transport_errors_retry() {
        assert!(!is_transport(&anyhow::anyhow!("nope")));

        // nothing listens on port 1
        let agent = crate::utils::agent(std::time::Duration::from_secs(5));
        let refused = agent.get("http://127.0.0.1:1").call().unwrap_err();
        assert!(is_transport(&refused.into()));
    }
}
