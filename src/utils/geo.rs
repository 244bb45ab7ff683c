use crate::types::Location;

/// Mean Earth radius used by Elasticsearch's `arc` distance.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometers (haversine).
pub(crate) fn distance_km(a: &Location, b: &Location) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Distance string in the engine's unit syntax, e.g. `1.5km`.
pub(crate) fn format_km(km: f64) -> String {
    format!("{km}km")
}
