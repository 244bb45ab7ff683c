use serde::Deserialize;

use crate::core::error::Error;
use crate::types::Location;

#[derive(Deserialize)]
pub(crate) struct LoginData {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) range: Option<String>,
}

impl SearchParams {
    /// Search centre; both coordinates must be finite.
    pub(crate) fn center(&self) -> Result<Location, Error> {
        for (name, value) in [("lat", self.lat), ("lon", self.lon)] {
            if !value.is_finite() {
                return Err(Error::MalformedRequest(format!("invalid {name}: {value}")));
            }
        }

        Ok(Location {
            lat: self.lat,
            lon: self.lon,
        })
    }

    /// Search radius in kilometers; an absent or blank `range` yields `None`.
    pub(crate) fn range_km(&self) -> Result<Option<f64>, Error> {
        let range = match self.range.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(range) => range,
        };

        match range.parse::<f64>() {
            Ok(km) if km.is_finite() && km > 0.0 => Ok(Some(km)),
            _ => Err(Error::MalformedRequest(format!("invalid range: {range}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rejects_non_finite() {
        let mut params = params(None);
        params.lat = 10.0;
        params.lon = 20.0;
        assert_eq!(
            params.center().unwrap(),
            Location {
                lat: 10.0,
                lon: 20.0
            }
        );

        params.lat = f64::NAN;
        assert!(params.center().is_err());

        params.lat = 0.0;
        params.lon = f64::INFINITY;
        assert!(params.center().is_err());
    }

    fn params(range: Option<&str>) -> SearchParams {
        SearchParams {
            lat: 0.0,
            lon: 0.0,
            range: range.map(String::from),
        }
    }

    #[test]
    fn test_range_km() {
        assert_eq!(params(None).range_km().unwrap(), None);
        assert_eq!(params(Some("")).range_km().unwrap(), None);
        assert_eq!(params(Some("1")).range_km().unwrap(), Some(1.0));
        assert_eq!(params(Some("2.5")).range_km().unwrap(), Some(2.5));
    }

    #[test]
    fn test_range_km_rejects_invalid() {
        assert!(params(Some("0")).range_km().is_err());
        assert!(params(Some("-3")).range_km().is_err());
        assert!(params(Some("NaN")).range_km().is_err());
        assert!(params(Some("10km")).range_km().is_err());
    }
}
