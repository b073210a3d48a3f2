//! Open-Meteo geocoding and daily forecast client

use std::time::Instant;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{ForecastClient, GeocodeClient};
use crate::Result;
use crate::config::WeatherConfig;
use crate::date_resolver::MAX_OFFSET;
use crate::error::ForecastChatError;
use crate::http::build_client;
use crate::models::{ForecastDay, ResolvedLocation};

const DAILY_VARIABLES: &str = "temperature_2m_max,precipitation_sum,precipitation_hours,precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max";

/// Client for the keyless Open-Meteo APIs
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    forecast_base_url: String,
    geocoding_base_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds, config.max_retries)?;
        Ok(Self::with_client(client, config))
    }

    /// Use an already configured HTTP client
    #[must_use]
    pub fn with_client(client: ClientWithMiddleware, config: &WeatherConfig) -> Self {
        Self {
            client,
            forecast_base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
            geocoding_base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("{} request failed: {}", what, e);
            ForecastChatError::forecast_unavailable(format!("{what} request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} request returned status {}", what, status);
            return Err(ForecastChatError::forecast_unavailable(format!(
                "{what} request failed with status: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            ForecastChatError::forecast_unavailable(format!("Invalid {what} response: {e}"))
        })
    }
}

#[async_trait]
impl GeocodeClient for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn lookup(&self, name: &str) -> Result<Option<ResolvedLocation>> {
        let start_time = Instant::now();
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(name)
        );

        let response: openmeteo::GeocodingResponse = self.get_json(&url, "Geocoding").await?;

        let Some(result) = response.results.unwrap_or_default().into_iter().next() else {
            warn!("No results found for location '{}'", name);
            return Ok(None);
        };

        let location: ResolvedLocation = result.into();
        info!(
            "Geocoded '{}' to {} ({}) in {:.3}s",
            name,
            location,
            location.format_coordinates(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(Some(location))
    }
}

#[async_trait]
impl ForecastClient for OpenMeteoClient {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn fetch(
        &self,
        location: &ResolvedLocation,
        today: NaiveDate,
    ) -> Result<Vec<ForecastDay>> {
        let start_time = Instant::now();
        let end_date = today
            .checked_add_days(Days::new(MAX_OFFSET.into()))
            .ok_or_else(|| ForecastChatError::forecast_unavailable("Forecast window overflows"))?;

        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily={}&timezone={}&start_date={}&end_date={}",
            self.forecast_base_url,
            location.latitude,
            location.longitude,
            DAILY_VARIABLES,
            urlencoding::encode(&self.timezone),
            today.format("%Y-%m-%d"),
            end_date.format("%Y-%m-%d"),
        );

        let response: openmeteo::ForecastResponse = self.get_json(&url, "Forecast").await?;
        let daily = response.daily.ok_or_else(|| {
            ForecastChatError::forecast_unavailable("Forecast response has no daily series")
        })?;

        let days = daily.into_days(today)?;
        info!(
            "Fetched {} forecast days for {} in {:.3}s",
            days.len(),
            location,
            start_time.elapsed().as_secs_f64()
        );
        debug!("Forecast offsets: {:?}", days.iter().map(|d| d.offset).collect::<Vec<_>>());

        Ok(days)
    }
}

/// `OpenMeteo` API response structures and conversion utilities
mod openmeteo {
    use chrono::NaiveDate;
    use serde::Deserialize;

    use crate::Result;
    use crate::date_resolver::MAX_OFFSET;
    use crate::error::ForecastChatError;
    use crate::models::{ForecastDay, ResolvedLocation};

    /// Daily forecast response from `OpenMeteo` API
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub daily: Option<DailyData>,
    }

    /// Daily weather series from `OpenMeteo`, one entry per date in `time`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Option<Vec<Option<f64>>>,
        pub precipitation_sum: Option<Vec<Option<f64>>>,
        pub precipitation_hours: Option<Vec<Option<f64>>>,
        #[serde(rename = "precipitation_probability_max")]
        pub precipitation_probability: Option<Vec<Option<f64>>>,
        #[serde(rename = "wind_speed_10m_max")]
        pub wind_speed_max: Option<Vec<Option<f64>>>,
        #[serde(rename = "wind_gusts_10m_max")]
        pub wind_gusts_max: Option<Vec<Option<f64>>>,
    }

    fn value_at(series: Option<&Vec<Option<f64>>>, index: usize, name: &str) -> Result<f64> {
        series
            .and_then(|values| values.get(index).copied().flatten())
            .ok_or_else(|| {
                ForecastChatError::forecast_unavailable(format!(
                    "Missing {name} value in forecast series"
                ))
            })
    }

    impl DailyData {
        /// Convert to forecast days inside the window starting at `today`.
        /// All values but the precipitation probability are rounded.
        pub fn into_days(self, today: NaiveDate) -> Result<Vec<ForecastDay>> {
            let mut days = Vec::with_capacity(self.time.len());

            for (i, time) in self.time.iter().enumerate() {
                let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|e| {
                    ForecastChatError::forecast_unavailable(format!(
                        "Invalid forecast date '{time}': {e}"
                    ))
                })?;

                let Some(offset) = u8::try_from((date - today).num_days())
                    .ok()
                    .filter(|offset| *offset <= MAX_OFFSET)
                else {
                    continue;
                };

                days.push(ForecastDay {
                    offset,
                    date,
                    temperature_high: value_at(self.temperature_max.as_ref(), i, "temperature")?
                        .round(),
                    precipitation_probability: value_at(
                        self.precipitation_probability.as_ref(),
                        i,
                        "precipitation probability",
                    )?,
                    precipitation_sum: value_at(self.precipitation_sum.as_ref(), i, "precipitation")?
                        .round(),
                    precipitation_hours: value_at(
                        self.precipitation_hours.as_ref(),
                        i,
                        "precipitation hours",
                    )?
                    .round(),
                    wind_speed: value_at(self.wind_speed_max.as_ref(), i, "wind speed")?.round(),
                    wind_gust: value_at(self.wind_gusts_max.as_ref(), i, "wind gust")?.round(),
                });
            }

            days.sort_by_key(|day| day.offset);
            Ok(days)
        }
    }

    /// Geocoding response from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
        pub admin1: Option<String>,
    }

    impl From<GeocodingResult> for ResolvedLocation {
        fn from(result: GeocodingResult) -> Self {
            let mut location = ResolvedLocation::new(result.name, result.latitude, result.longitude);
            location.country = result.country;
            location.region = result.admin1;
            location
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        let config = WeatherConfig {
            forecast_base_url: server.uri(),
            geocoding_base_url: server.uri(),
            ..WeatherConfig::default()
        };
        OpenMeteoClient::with_client(build_client(5, 0).unwrap(), &config)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn daily_body() -> serde_json::Value {
        json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "daily": {
                "time": ["2026-10-19", "2026-10-20", "2026-10-21", "2026-10-22",
                         "2026-10-23", "2026-10-24", "2026-10-25"],
                "temperature_2m_max": [13.6, 14.2, 12.0, 11.4, 10.9, 12.5, 13.1],
                "precipitation_sum": [0.0, 2.4, 0.0, 0.3, 5.6, 0.0, 0.0],
                "precipitation_hours": [0.0, 3.2, 0.0, 1.0, 6.5, 0.0, 0.0],
                "precipitation_probability_max": [5, 35, 10, 20, 80, 0, 3],
                "wind_speed_10m_max": [11.6, 12.3, 9.8, 15.0, 22.4, 8.1, 7.7],
                "wind_gusts_10m_max": [25.2, 27.4, 20.0, 31.9, 45.0, 17.3, 16.0]
            }
        })
    }

    #[tokio::test]
    async fn test_lookup_returns_best_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", "Paris"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "id": 2988507,
                    "name": "Paris",
                    "latitude": 48.85341,
                    "longitude": 2.3488,
                    "country": "France",
                    "admin1": "Île-de-France",
                    "timezone": "Europe/Paris"
                }]
            })))
            .mount(&server)
            .await;

        let location = client_for(&server).lookup("Paris").await.unwrap().unwrap();
        assert_eq!(location.name, "Paris");
        assert_eq!(location.country.as_deref(), Some("France"));
        assert_eq!(location.region.as_deref(), Some("Île-de-France"));
        assert_eq!(location.latitude, 48.85341);
    }

    #[tokio::test]
    async fn test_lookup_without_results_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "generationtime_ms": 0.5
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).lookup("Qzxlflorp").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_lookup_outage_is_forecast_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("Paris").await.unwrap_err();
        assert!(matches!(err, ForecastChatError::ForecastUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rounds_values_and_assigns_offsets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("start_date", "2026-10-19"))
            .and(query_param("end_date", "2026-10-25"))
            .and(query_param("timezone", "Europe/Berlin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body()))
            .mount(&server)
            .await;

        let berlin = ResolvedLocation::new("Berlin", 52.52437, 13.41053);
        let days = client_for(&server).fetch(&berlin, today()).await.unwrap();

        assert_eq!(days.len(), 7);
        assert_eq!(days.iter().map(|d| d.offset).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5, 6]);

        let tuesday = &days[1];
        assert_eq!(tuesday.date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert_eq!(tuesday.weekday_name(), "Tuesday");
        assert_eq!(tuesday.temperature_high, 14.0);
        assert_eq!(tuesday.precipitation_sum, 2.0);
        assert_eq!(tuesday.precipitation_hours, 3.0);
        assert_eq!(tuesday.precipitation_probability, 35.0);
        assert_eq!(tuesday.wind_speed, 12.0);
        assert_eq!(tuesday.wind_gust, 27.0);
    }

    #[tokio::test]
    async fn test_fetch_short_series_keeps_returned_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2026-10-19", "2026-10-20"],
                    "temperature_2m_max": [13.6, 14.2],
                    "precipitation_sum": [0.0, 2.4],
                    "precipitation_hours": [0.0, 3.2],
                    "precipitation_probability_max": [5, 35],
                    "wind_speed_10m_max": [11.6, 12.3],
                    "wind_gusts_10m_max": [25.2, 27.4]
                }
            })))
            .mount(&server)
            .await;

        let berlin = ResolvedLocation::new("Berlin", 52.52437, 13.41053);
        let days = client_for(&server).fetch(&berlin, today()).await.unwrap();
        assert_eq!(days.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_missing_series_is_forecast_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2026-10-19"],
                    "temperature_2m_max": [13.6]
                }
            })))
            .mount(&server)
            .await;

        let berlin = ResolvedLocation::new("Berlin", 52.52437, 13.41053);
        let err = client_for(&server).fetch(&berlin, today()).await.unwrap_err();
        assert!(matches!(err, ForecastChatError::ForecastUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_forecast_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let berlin = ResolvedLocation::new("Berlin", 52.52437, 13.41053);
        let err = client_for(&server).fetch(&berlin, today()).await.unwrap_err();
        assert!(matches!(err, ForecastChatError::ForecastUnavailable { .. }));
    }
}
