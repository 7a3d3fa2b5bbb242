use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinate: {lat}, {lon}")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A WGS84 position in degrees. Always finite and within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(InvalidCoordinate { lat, lon });
        }

        // fold -0.0 into 0.0 so equal positions compare equal bitwise
        Ok(Self {
            lat: lat + 0.0,
            lon: lon + 0.0,
        })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn point(&self) -> Point {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance in metres.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.point().haversine_distance(&other.point())
    }

    /// Exact identity of the position, for deduplicating by coordinates.
    pub fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

/// Great-circle distance in metres between two `(lat, lon)` pairs.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> Result<f64, InvalidCoordinate> {
    let a = Coordinate::new(a.0, a.1)?;
    let b = Coordinate::new(b.0, b.1)?;
    Ok(a.distance(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn identity() {
        assert_eq!(distance((42.28, -83.74), (42.28, -83.74)).unwrap(), 0.0);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            ((0.0, 0.0), (0.0, 0.0001)),
            ((42.2808, -83.743), (42.2776, -83.7382)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
            ((89.9, 179.9), (-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            let ab = distance(a, b).unwrap();
            let ba = distance(b, a).unwrap();
            assert!(close(ab, ba, 1e-6), "{ab} != {ba}");
        }
    }

    #[test]
    fn known_distances() {
        // 0.0001 degrees of longitude on the equator
        assert!(close(distance((0.0, 0.0), (0.0, 0.0001)).unwrap(), 11.12, 0.01));
        // one degree of latitude
        assert!(close(distance((0.0, 0.0), (1.0, 0.0)).unwrap(), 111_195.0, 5.0));
        // Sydney to London
        let d = distance((-33.8688, 151.2093), (51.5074, -0.1278)).unwrap();
        assert!(close(d, 16_994_000.0, 10_000.0), "{d}");
    }

    #[test]
    fn rejects_invalid() {
        assert!(distance((f64::NAN, 0.0), (0.0, 0.0)).is_err());
        assert!(distance((0.0, 0.0), (0.0, f64::INFINITY)).is_err());
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn negative_zero() {
        let a = Coordinate::new(-0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, -0.0).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"lat": 1.5, "lon": 2.5}"#).unwrap();
        assert_eq!((ok.lat(), ok.lon()), (1.5, 2.5));
        assert!(serde_json::from_str::<Coordinate>(r#"{"lat": 100.0, "lon": 0.0}"#).is_err());
    }
}
