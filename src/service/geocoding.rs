// service/geocoding.rs
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::error::ServiceError;
use crate::{
    config::Config,
    utils::geo::{round_to, Coordinates},
};

/// Address lookup and road distance. Ola Maps in production.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    async fn geocode(&self, location: &str, pincode: &str) -> Result<Option<Coordinates>, ServiceError>;

    async fn road_distance_km(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Option<f64>, ServiceError>;
}

pub fn geocode_query(location: &str, pincode: &str) -> String {
    format!("{}, {}, India", location.trim(), pincode.trim())
}

/// Geocodes a location, logging and swallowing provider failures.
pub async fn locate(geo: &dyn GeoProvider, location: &str, pincode: &str) -> Option<Coordinates> {
    match geo.geocode(location, pincode).await {
        Ok(coordinates) => coordinates,
        Err(e) => {
            tracing::warn!("Geocoding failed for {}, {}: {}", location, pincode, e);
            None
        }
    }
}

pub struct OlaMapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OlaMapsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.ola_maps_base_url.trim_end_matches('/').to_string(),
            api_key: config.ola_maps_api_key.clone(),
        }
    }

    fn ensure_configured(&self) -> Result<(), ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::ExternalApi("OLA_MAPS_API_KEY is not set".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GeoProvider for OlaMapsClient {
    async fn geocode(&self, location: &str, pincode: &str) -> Result<Option<Coordinates>, ServiceError> {
        self.ensure_configured()?;
        let address = geocode_query(location, pincode);

        let response = self
            .http
            .get(format!("{}/places/v1/geocode", self.base_url))
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .query(&[
                ("address", address.as_str()),
                ("language", "en"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Ola Maps geocode failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalApi(format!(
                "Ola Maps geocode returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Ola Maps geocode body: {}", e)))?;

        let coordinates = extract_geocode(&body);
        if coordinates.is_none() {
            tracing::warn!("No geocoding results for {}", address);
        }
        Ok(coordinates)
    }

    async fn road_distance_km(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Option<f64>, ServiceError> {
        self.ensure_configured()?;

        let response = self
            .http
            .post(format!("{}/routing/v1/directions", self.base_url))
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .query(&[
                ("origin", format!("{},{}", origin.lat, origin.lng)),
                ("destination", format!("{},{}", destination.lat, destination.lng)),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Ola Maps directions failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalApi(format!(
                "Ola Maps directions returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Ola Maps directions body: {}", e)))?;

        Ok(extract_road_distance_km(&body))
    }
}

/// `geocodingResults[0].geometry.location`
pub fn extract_geocode(body: &Value) -> Option<Coordinates> {
    let location = body
        .get("geocodingResults")?
        .get(0)?
        .get("geometry")?
        .get("location")?;

    let lat = location.get("lat")?.as_f64()?;
    let lng = location.get("lng")?.as_f64()?;
    Some(Coordinates::new(lat, lng))
}

/// `routes[0].legs[0].distance` is in metres.
pub fn extract_road_distance_km(body: &Value) -> Option<f64> {
    let metres = body
        .get("routes")?
        .get(0)?
        .get("legs")?
        .get(0)?
        .get("distance")?
        .as_f64()?;

    Some(round_to(metres / 1000.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_first_geocoding_result() {
        let body = json!({
            "geocodingResults": [
                { "geometry": { "location": { "lat": 18.5204, "lng": 73.8567 } } },
                { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
            ],
            "status": "ok"
        });
        assert_eq!(extract_geocode(&body), Some(Coordinates::new(18.5204, 73.8567)));
    }

    #[test]
    fn empty_geocoding_results_are_none() {
        assert_eq!(extract_geocode(&json!({ "geocodingResults": [] })), None);
        assert_eq!(extract_geocode(&json!({})), None);
    }

    #[test]
    fn road_distance_is_km_to_two_places() {
        let body = json!({ "routes": [ { "legs": [ { "distance": 12346 } ] } ] });
        assert_eq!(extract_road_distance_km(&body), Some(12.35));
    }

    #[test]
    fn query_appends_country() {
        assert_eq!(geocode_query(" Baner, Pune ", "411045"), "Baner, Pune, 411045, India");
    }
}
