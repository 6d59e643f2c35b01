const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let (lat1, lon1) = (from.lat.to_radians(), from.lng.to_radians());
    let (lat2, lon2) = (to.lat.to_radians(), to.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero_distance() {
        let p = Coordinates::new(19.076, 72.8777);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn mumbai_to_pune_is_about_120_km() {
        let mumbai = Coordinates::new(19.0760, 72.8777);
        let pune = Coordinates::new(18.5204, 73.8567);
        let d = haversine_km(mumbai, pune);
        assert!((d - 120.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates::new(12.9716, 77.5946);
        let b = Coordinates::new(28.7041, 77.1025);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn missing_half_of_a_pair_is_none() {
        assert!(Coordinates::from_parts(Some(1.0), None).is_none());
        assert!(Coordinates::from_parts(Some(f64::NAN), Some(1.0)).is_none());
        assert_eq!(round_to(1.23456, 2), 1.23);
    }
}
