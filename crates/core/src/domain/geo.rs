// Geolocation - great-circle distance and nearest-shop ranking

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::user::UserId;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl Coordinate {
    /// Build a validated coordinate (lat in [-90, 90], long in [-180, 180])
    pub fn new(lat: f64, long: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::ValidationError(format!(
                "latitude out of range: {}",
                lat
            )));
        }
        if !long.is_finite() || !(-180.0..=180.0).contains(&long) {
            return Err(DomainError::ValidationError(format!(
                "longitude out of range: {}",
                long
            )));
        }
        Ok(Self { lat, long })
    }
}

/// Haversine distance between two coordinates, in kilometres
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.long - a.long).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A shop candidate with known coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopLocation {
    pub id: UserId,
    pub name: String,
    pub address: Option<String>,
    pub location: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedShop {
    pub shop: ShopLocation,
    pub distance_km: f64,
}

/// Rank shops by distance from `origin`, nearest first, ties by id.
///
/// A missing origin is `LocationUnavailable`; it is never treated as (0, 0).
pub fn rank_shops(
    origin: Option<Coordinate>,
    candidates: impl IntoIterator<Item = ShopLocation>,
) -> Result<Vec<RankedShop>> {
    let origin = origin.ok_or(DomainError::LocationUnavailable)?;

    let mut ranked: Vec<RankedShop> = candidates
        .into_iter()
        .map(|shop| RankedShop {
            distance_km: haversine_km(origin, shop.location),
            shop,
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.shop.id.cmp(&b.shop.id))
    });
    Ok(ranked)
}
