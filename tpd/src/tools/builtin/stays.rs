//! Guest-stay tools backed by the Booking.com RapidAPI
//!
//! Three stages mirror how the stay-search agent works through a booking:
//! resolve the place to a destination id, search available stays for the
//! dates, then pull guest reviews for a shortlisted property. Search results
//! deliberately omit review scores so the review analysis step cannot be
//! skipped.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write as _;

use crate::tools::{Tool, ToolResult};

const BASE_URL: &str = "https://booking-com.p.rapidapi.com/v1";
const RAPID_HOST: &str = "booking-com.p.rapidapi.com";

fn api_key() -> Result<String, ToolResult> {
    std::env::var("RAPID_BOOKING_API_KEY")
        .map_err(|_| ToolResult::error("No booking API configured. Set RAPID_BOOKING_API_KEY."))
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Resolve a place name to bookable destinations
pub struct FindStayLocationsTool {
    client: reqwest::Client,
}

impl FindStayLocationsTool {
    pub fn new() -> Self {
        Self { client: http_client() }
    }
}

impl Default for FindStayLocationsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct StayLocation {
    dest_id: String,
    dest_type: String,
    #[serde(default)]
    label: String,
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    nr_hotels: u64,
}

#[async_trait]
impl Tool for FindStayLocationsTool {
    fn name(&self) -> &'static str {
        "find_stay_locations"
    }

    fn description(&self) -> &'static str {
        "Fetch locations with names similar to the given place name. Returns the destination id \
         along with other information about each matching location; the destination id is needed \
         to search for available stays."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "place": {
                    "type": "string",
                    "description": "The name of the place to search for locations"
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

        let key = match api_key() {
            Ok(k) => k,
            Err(e) => return e,
        };

        let response = match self
            .client
            .get(format!("{BASE_URL}/hotels/locations"))
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", RAPID_HOST)
            .query(&[("name", place), ("locale", "en-gb")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Location request failed: {e}")),
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return ToolResult::error(format!("Booking API error {status}: {text}"));
        }

        let locations: Vec<StayLocation> = match response.json().await {
            Ok(l) => l,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
        };

        if locations.is_empty() {
            return ToolResult::success(format!("No bookable locations found for '{place}'"));
        }

        let lines: Vec<String> = locations
            .iter()
            .enumerate()
            .map(|(i, loc)| {
                let label = if loc.label.is_empty() {
                    format!("{}, {}, {}", loc.name, loc.region, loc.country)
                } else {
                    loc.label.clone()
                };
                format!(
                    "{}. {} ({})\n   dest_id: {}, stays available: {}",
                    i + 1,
                    label,
                    loc.dest_type,
                    loc.dest_id,
                    loc.nr_hotels
                )
            })
            .collect();

        ToolResult::success(lines.join("\n"))
    }
}

/// Search available stays for specific dates
pub struct SearchStaysTool {
    client: reqwest::Client,
}

impl SearchStaysTool {
    pub fn new() -> Self {
        Self { client: http_client() }
    }
}

impl Default for SearchStaysTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct StaySearchResponse {
    #[serde(default)]
    result: Vec<StayHit>,
}

#[derive(Debug, Deserialize)]
struct StayHit {
    hotel_id: i64,
    hotel_name: String,
    #[serde(default)]
    url: String,
    min_total_price: f64,
    #[serde(default)]
    currency_code: String,
    #[serde(rename = "class", default)]
    hotel_class: f64,
    #[serde(default)]
    city_trans: String,
    #[serde(default)]
    accommodation_type_name: String,
    #[serde(default)]
    distance_to_cc_formatted: Option<String>,
    #[serde(default)]
    is_free_cancellable: i64,
    #[serde(default)]
    hotel_include_breakfast: i64,
}

#[async_trait]
impl Tool for SearchStaysTool {
    fn name(&self) -> &'static str {
        "search_stays"
    }

    fn description(&self) -> &'static str {
        "Fetch available stays for specified dates and parameters. Needs the destination id from \
         find_stay_locations. Returns name, price, class, and link per stay; reviews must be \
         fetched separately."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "destination_id": {
                    "type": "string",
                    "description": "Internal id of the destination from find_stay_locations"
                },
                "dest_type": {
                    "type": "string",
                    "description": "Type of destination: city, region, landmark, district, hotel, country, airport, latlong (default: city)"
                },
                "check_in_date": {
                    "type": "string",
                    "description": "Check-in date for the stay in YYYY-MM-DD format"
                },
                "check_out_date": {
                    "type": "string",
                    "description": "Check-out date for the stay in YYYY-MM-DD format"
                },
                "adults": {
                    "type": "integer",
                    "description": "Number of adult occupants (default: 1)"
                },
                "children": {
                    "type": "integer",
                    "description": "Number of child occupants (default: 1)"
                },
                "rooms": {
                    "type": "integer",
                    "description": "Number of rooms preferred in total (default: 1)"
                },
                "max_results": {
                    "type": "integer",
                    "description": "The maximum number of stays to find in one go (default: 5)"
                }
            },
            "required": ["destination_id", "check_in_date", "check_out_date"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let destination_id = match input["destination_id"].as_str() {
            Some(d) => d,
            None => return ToolResult::error("destination_id is required"),
        };
        let check_in = match parse_date(&input, "check_in_date") {
            Ok(d) => d,
            Err(e) => return e,
        };
        let check_out = match parse_date(&input, "check_out_date") {
            Ok(d) => d,
            Err(e) => return e,
        };

        if check_out <= check_in {
            return ToolResult::error(
                "Check-out date should be after check-in date. Without checking in, check-out is not allowed.",
            );
        }

        let dest_type = input["dest_type"].as_str().unwrap_or("city");
        let adults = input["adults"].as_u64().unwrap_or(1).to_string();
        let children = input["children"].as_u64().unwrap_or(1).to_string();
        let rooms = input["rooms"].as_u64().unwrap_or(1).to_string();
        let max_results = input["max_results"].as_u64().unwrap_or(5) as usize;

        let key = match api_key() {
            Ok(k) => k,
            Err(e) => return e,
        };

        let response = match self
            .client
            .get(format!("{BASE_URL}/hotels/search"))
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", RAPID_HOST)
            .query(&[
                ("adults_number", adults.as_str()),
                ("children_number", children.as_str()),
                ("units", "metric"),
                ("page_number", "0"),
                ("checkin_date", &check_in.to_string()),
                ("checkout_date", &check_out.to_string()),
                ("categories_filter_ids", "class::2,class::4,free_cancellation::1"),
                ("children_ages", "5,0"),
                ("dest_type", dest_type),
                ("dest_id", destination_id),
                ("order_by", "popularity"),
                ("include_adjacency", "true"),
                ("room_number", rooms.as_str()),
                ("filter_by_currency", "INR"),
                ("locale", "en-gb"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Stay search failed: {e}")),
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return ToolResult::error(format!("Booking API error {status}: {text}"));
        }

        let search: StaySearchResponse = match response.json().await {
            Ok(s) => s,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
        };

        if search.result.is_empty() {
            return ToolResult::success("No stays available for those dates");
        }

        let nights = (check_out - check_in).num_days().max(1);
        let mut output = String::new();
        for (i, stay) in search.result.iter().take(max_results).enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}, class {}) in {}",
                i + 1,
                stay.hotel_name,
                stay.accommodation_type_name,
                stay.hotel_class,
                stay.city_trans
            );
            let _ = writeln!(
                output,
                "   hotel_id: {}, total: {} {:.0} ({:.0} per night)",
                stay.hotel_id,
                stay.currency_code,
                stay.min_total_price,
                stay.min_total_price / nights as f64
            );
            if let Some(ref distance) = stay.distance_to_cc_formatted {
                let _ = writeln!(output, "   distance to centre: {distance}");
            }
            let _ = writeln!(
                output,
                "   free cancellation: {}, breakfast included: {}",
                stay.is_free_cancellable == 1,
                stay.hotel_include_breakfast == 1
            );
            let _ = writeln!(output, "   link: {}", stay.url);
        }

        ToolResult::success(output)
    }
}

fn parse_date(input: &Value, field: &str) -> Result<NaiveDate, ToolResult> {
    let raw = input[field]
        .as_str()
        .ok_or_else(|| ToolResult::error(format!("{field} is required")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ToolResult::error(format!("{field} must be a date in YYYY-MM-DD format, got '{raw}'")))
}

/// Fetch guest reviews for a stay
pub struct StayReviewsTool {
    client: reqwest::Client,
}

impl StayReviewsTool {
    pub fn new() -> Self {
        Self { client: http_client() }
    }
}

impl Default for StayReviewsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    result: Vec<StayReview>,
}

#[derive(Debug, Deserialize)]
struct StayReview {
    #[serde(default)]
    title: String,
    #[serde(default)]
    pros: Option<String>,
    #[serde(default)]
    cons: Option<String>,
    #[serde(default)]
    average_score: f64,
    #[serde(default)]
    travel_purpose: String,
    #[serde(default)]
    date: String,
}

#[async_trait]
impl Tool for StayReviewsTool {
    fn name(&self) -> &'static str {
        "fetch_stay_reviews"
    }

    fn description(&self) -> &'static str {
        "Fetch recent guest reviews for a given hotel id: review titles, pros, cons, and scores. \
         Use this before recommending any stay."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "hotel_id": {
                    "type": "string",
                    "description": "The id of the hotel to fetch reviews for"
                }
            },
            "required": ["hotel_id"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let hotel_id = match &input["hotel_id"] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return ToolResult::error("hotel_id is required"),
        };

        let key = match api_key() {
            Ok(k) => k,
            Err(e) => return e,
        };

        let response = match self
            .client
            .get(format!("{BASE_URL}/hotels/reviews"))
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", RAPID_HOST)
            .query(&[
                ("customer_type", "solo_traveller,review_category_group_of_friends"),
                ("locale", "en-gb"),
                ("language_filter", "en-gb,de,fr"),
                ("page_number", "0"),
                ("sort_type", "SORT_MOST_RELEVANT"),
                ("hotel_id", &hotel_id),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Review request failed: {e}")),
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return ToolResult::error(format!("Booking API error {status}: {text}"));
        }

        let reviews: ReviewsResponse = match response.json().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {e}")),
        };

        if reviews.result.is_empty() {
            return ToolResult::success("No reviews found for this stay");
        }

        let mut output = String::new();
        for review in reviews.result.iter().take(10) {
            let _ = writeln!(
                output,
                "[{:.1}/10] {} ({}, {})",
                review.average_score, review.title, review.travel_purpose, review.date
            );
            if let Some(ref pros) = review.pros
                && !pros.is_empty()
            {
                let _ = writeln!(output, "   pros: {pros}");
            }
            if let Some(ref cons) = review.cons
                && !cons.is_empty()
            {
                let _ = writeln!(output, "   cons: {cons}");
            }
        }

        ToolResult::success(output)
    }
}
