//! Distance and projection helpers on geographic coordinates.
//!
//! Great-circle distance and the direct geodesic problem are delegated to
//! `geo`; the small-offset and bounding-box conversions use a flat-earth
//! approximation that is only meant for distances of a few hundred metres.

use geo::{Destination, Distance, Geodesic, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Mean Earth radius used by the flat-earth conversions.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude under the spherical approximation.
pub const METERS_PER_DEGREE: f64 = EARTH_MEAN_RADIUS_M * std::f64::consts::PI / 180.0;

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    fn from_point(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

/// Haversine distance in metres.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// Solves the direct geodesic problem on the WGS84 ellipsoid. `bearing_deg`
/// is measured clockwise from north.
pub fn destination(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m == 0.0 {
        return origin;
    }
    GeoPoint::from_point(Geodesic.destination(origin.to_point(), bearing_deg, distance_m))
}

/// Shifts a point by a local east/north offset in metres.
pub fn offset_flat(origin: GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    let dlat = (north_m / EARTH_MEAN_RADIUS_M).to_degrees();
    let dlon = (east_m / (EARTH_MEAN_RADIUS_M * origin.lat.to_radians().cos())).to_degrees();
    GeoPoint {
        lat: origin.lat + dlat,
        lon: origin.lon + dlon,
    }
}

pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Longitude span of `meters` at the given latitude. Grows without bound
/// towards the poles, which only makes queries over-inclusive.
pub fn meters_to_lon_degrees(meters: f64, at_lat: f64) -> f64 {
    let cos_lat = at_lat.to_radians().cos().abs().max(1e-9);
    meters / (METERS_PER_DEGREE * cos_lat)
}

/// Axis-aligned box in degrees, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Builds a region from two opposite corners in any order. Degenerate
    /// or non-finite corners are rejected.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Result<Self, ConfigError> {
        let finite = [a.lat, a.lon, b.lat, b.lon].iter().all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::MalformedRegion(
                "corner coordinates must be finite".into(),
            ));
        }
        let region = Self {
            min_lat: a.lat.min(b.lat),
            min_lon: a.lon.min(b.lon),
            max_lat: a.lat.max(b.lat),
            max_lon: a.lon.max(b.lon),
        };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_lat >= self.max_lat {
            return Err(ConfigError::MalformedRegion(format!(
                "min latitude {} is not below max latitude {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon {
            return Err(ConfigError::MalformedRegion(format!(
                "min longitude {} is not below max longitude {}",
                self.min_lon, self.max_lon
            )));
        }
        Ok(())
    }

    /// Box that contains every point within `radius_m` of `center`.
    pub fn around(center: GeoPoint, radius_m: f64) -> Self {
        let dlat = meters_to_lat_degrees(radius_m);
        let dlon = meters_to_lon_degrees(radius_m, center.lat);
        Self {
            min_lat: center.lat - dlat,
            min_lon: center.lon - dlon,
            max_lat: center.lat + dlat,
            max_lon: center.lon + dlon,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}
