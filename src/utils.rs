use serde::Serialize;

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Cache key covering both coordinates.
    pub fn cache_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Cache key for lookups that also depend on a search radius.
    pub fn cache_key_with_radius(&self, radius_km: f64) -> String {
        format!("{},{}", self.cache_key(), radius_km)
    }
}

/// Round to specified decimal places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let multiplier = 10_f64.powi(decimals as i32);
    (value * multiplier).round() / multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert!(validate_coordinates(-90.5, 0.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_cache_keys_cover_every_parameter() {
        let malibu = Coordinates::new(34.0195, -118.6814).unwrap();
        let nyc = Coordinates::new(40.7128, -74.0060).unwrap();

        assert_eq!(malibu.cache_key(), "34.0195,-118.6814");
        assert_ne!(malibu.cache_key(), nyc.cache_key());
        assert_eq!(malibu.cache_key_with_radius(50.0), "34.0195,-118.6814,50");
        assert_ne!(
            malibu.cache_key_with_radius(50.0),
            malibu.cache_key_with_radius(25.0)
        );
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(18.456, 1), 18.5);
        assert_eq!(round_to_decimals(-2.04, 1), -2.0);
    }
}
