//! Coordinates, distances and the location payload sent to the server.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(Error::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin() * EARTH_RADIUS_KM
}

/// Distance when both ends are known.
pub fn distance_between(a: Option<Coordinates>, b: Option<Coordinates>) -> Option<f64> {
    Some(distance_km(a?, b?))
}

/// Sorts nearest first. Items without a distance go last, keeping their
/// relative order.
pub fn sort_by_distance<T, F>(items: &mut [T], distance: F)
where
    F: Fn(&T) -> Option<f64>,
{
    items.sort_by(|a, b| match (distance(a), distance(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Body of the location update request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for LocationUpdate {
    fn from(c: Coordinates) -> Self {
        Self {
            lat: c.lat,
            lng: c.lng,
        }
    }
}

impl LocationUpdate {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
}

pub trait LocationProvider {
    fn current_position(&self) -> std::result::Result<Coordinates, GeoError>;
}

/// Provider answering with a fixed position, or with no position at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocation(pub Option<Coordinates>);

impl LocationProvider for StaticLocation {
    fn current_position(&self) -> std::result::Result<Coordinates, GeoError> {
        self.0.ok_or(GeoError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn at(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn validates_ranges() {
        assert!(Coordinates::new(90.0, -180.0).is_ok());
        assert_matches!(
            Coordinates::new(90.5, 0.0),
            Err(Error::InvalidCoordinates { .. })
        );
        assert_matches!(
            Coordinates::new(0.0, 181.0),
            Err(Error::InvalidCoordinates { .. })
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn haversine_distances() {
        let berlin = at(52.52, 13.405);
        assert_eq!(distance_km(berlin, berlin), 0.0);

        let one_degree = distance_km(at(0.0, 0.0), at(1.0, 0.0));
        assert!((one_degree - 111.195).abs() < 0.01, "{one_degree}");

        let paris = at(48.8566, 2.3522);
        let d = distance_km(berlin, paris);
        assert!((d - 878.0).abs() < 5.0, "{d}");
        assert!((distance_km(paris, berlin) - d).abs() < 1e-9);
    }

    #[test]
    fn missing_locations_have_no_distance() {
        assert_eq!(distance_between(None, Some(at(1.0, 1.0))), None);
        assert!(distance_between(Some(at(1.0, 1.0)), Some(at(1.0, 1.0))).is_some());
    }

    #[test]
    fn nearest_first_unknown_last() {
        let mut items = vec![("far", Some(9.0)), ("unknown", None), ("near", Some(1.5))];
        sort_by_distance(&mut items, |item| item.1);
        let names: Vec<_> = items.iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["near", "far", "unknown"]);
    }

    #[test]
    fn location_payload_shape() {
        let json = LocationUpdate::from(at(52.5, 13.25)).to_json().unwrap();
        assert_eq!(json, r#"{"lat":52.5,"lng":13.25}"#);
    }

    #[test]
    fn static_provider() {
        assert_eq!(
            StaticLocation(None).current_position(),
            Err(GeoError::Unsupported)
        );
        let here = at(1.0, 2.0);
        assert_eq!(StaticLocation(Some(here)).current_position(), Ok(here));
    }
}
