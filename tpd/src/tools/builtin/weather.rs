//! get_weather tool - forecast lookup via OpenWeather

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::tools::{Tool, ToolResult};

/// Fetch the weather forecast for a place
pub struct GetWeatherTool {
    client: reqwest::Client,
}

impl GetWeatherTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for GetWeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GeoHit {
    name: String,
    lat: f64,
    lon: f64,
    country: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt_txt: String,
    main: SlotMain,
    #[serde(default)]
    weather: Vec<SlotWeather>,
    #[serde(default)]
    wind: Option<SlotWind>,
}

#[derive(Debug, Deserialize)]
struct SlotMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct SlotWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct SlotWind {
    speed: f64,
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Get the weather forecast for a place: daily minimum and maximum temperatures, conditions, \
         and wind speed for the next five days. Requires OPENWEATHER_API_KEY."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "place": {
                    "type": "string",
                    "description": "City, town, or locality name"
                }
            },
            "required": ["place"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let place = match input["place"].as_str() {
            Some(p) => p,
            None => return ToolResult::error("place is required"),
        };

        let api_key = match std::env::var("OPENWEATHER_API_KEY") {
            Ok(k) => k,
            Err(_) => return ToolResult::error("No weather API configured. Set OPENWEATHER_API_KEY."),
        };

        // Resolve the place to coordinates first
        let geo_response = match self
            .client
            .get("https://api.openweathermap.org/geo/1.0/direct")
            .query(&[("q", place), ("limit", "1"), ("appid", &api_key)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Geocoding request failed: {e}")),
        };

        if !geo_response.status().is_success() {
            return ToolResult::error(format!("Geocoding error: {}", geo_response.status()));
        }

        let hits: Vec<GeoHit> = match geo_response.json().await {
            Ok(h) => h,
            Err(e) => return ToolResult::error(format!("Failed to parse geocoding response: {e}")),
        };

        let Some(hit) = hits.into_iter().next() else {
            return ToolResult::error(format!("No location found for '{place}'"));
        };

        let forecast_response = match self
            .client
            .get("https://api.openweathermap.org/data/2.5/forecast")
            .query(&[
                ("lat", hit.lat.to_string()),
                ("lon", hit.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Forecast request failed: {e}")),
        };

        if !forecast_response.status().is_success() {
            return ToolResult::error(format!("Forecast error: {}", forecast_response.status()));
        }

        let forecast: ForecastResponse = match forecast_response.json().await {
            Ok(f) => f,
            Err(e) => return ToolResult::error(format!("Failed to parse forecast: {e}")),
        };

        let location = match hit.state {
            Some(state) => format!("{}, {}, {}", hit.name, state, hit.country),
            None => format!("{}, {}", hit.name, hit.country),
        };

        ToolResult::success(format!(
            "Forecast for {location}:\n{}",
            summarize_forecast(&forecast.list)
        ))
    }
}

/// Collapse 3-hourly slots into one line per day
fn summarize_forecast(slots: &[ForecastSlot]) -> String {
    let mut days: BTreeMap<&str, (f64, f64, f64, &str)> = BTreeMap::new();

    for slot in slots {
        let Some(date) = slot.dt_txt.get(..10) else { continue };
        let condition = slot.weather.first().map(|w| w.description.as_str()).unwrap_or("");
        let wind = slot.wind.as_ref().map(|w| w.speed).unwrap_or(0.0);

        days.entry(date)
            .and_modify(|(min, max, max_wind, cond)| {
                *min = min.min(slot.main.temp_min);
                *max = max.max(slot.main.temp_max);
                *max_wind = max_wind.max(wind);
                // Midday slot gives the most representative condition
                if slot.dt_txt.contains("12:00:00") {
                    *cond = condition;
                }
            })
            .or_insert((slot.main.temp_min, slot.main.temp_max, wind, condition));
    }

    days.iter()
        .map(|(date, (min, max, wind, cond))| {
            format!("{date}: {min:.1}C to {max:.1}C, {cond}, wind up to {wind:.1} m/s")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(dt_txt: &str, min: f64, max: f64, desc: &str, wind: f64) -> ForecastSlot {
        ForecastSlot {
            dt_txt: dt_txt.to_string(),
            main: SlotMain {
                temp_min: min,
                temp_max: max,
            },
            weather: vec![SlotWeather {
                description: desc.to_string(),
            }],
            wind: Some(SlotWind { speed: wind }),
        }
    }

    #[tokio::test]
    async fn test_missing_place() {
        let tool = GetWeatherTool::new();
        let result = tool.execute(serde_json::json!({})).await;

        assert!(result.is_error);
        assert!(result.content.contains("place is required"));
    }

    #[test]
    fn test_summarize_groups_by_day() {
        let slots = vec![
            slot("2025-06-01 09:00:00", 18.0, 22.0, "overcast clouds", 3.0),
            slot("2025-06-01 12:00:00", 20.0, 27.5, "light rain", 5.5),
            slot("2025-06-02 12:00:00", 17.0, 24.0, "clear sky", 2.0),
        ];

        let summary = summarize_forecast(&slots);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2025-06-01: 18.0C to 27.5C"));
        assert!(lines[0].contains("light rain"));
        assert!(lines[0].contains("5.5 m/s"));
        assert!(lines[1].starts_with("2025-06-02"));
    }
}
