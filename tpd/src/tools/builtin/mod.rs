//! Built-in travel tools
//!
//! Web research, weather, mapping, and guest-stay lookups. Each tool reads
//! its API credentials from the environment at call time, so a missing key
//! degrades that one capability instead of failing startup.

mod fetch_page;
mod places;
mod search_web;
mod stays;
mod weather;

pub use fetch_page::FetchPageTool;
pub use places::SearchPlacesTool;
pub use search_web::SearchWebTool;
pub use stays::{FindStayLocationsTool, SearchStaysTool, StayReviewsTool};
pub use weather::GetWeatherTool;
