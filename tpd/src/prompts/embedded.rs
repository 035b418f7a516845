//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Intent classification prompt
pub const INFER_INTENT: &str = include_str!("../../prompts/infer-intent.pmt");

/// Requirement gathering system prompt
pub const GATHER_REQUIREMENTS: &str = include_str!("../../prompts/gather-requirements.pmt");

/// Requirement gathering human turn
pub const GATHER_INFO: &str = include_str!("../../prompts/gather-info.pmt");

/// Strict extraction prompt (dates, location, budget, traveller rules)
pub const EXTRACT_REQUIREMENTS: &str = include_str!("../../prompts/extract-requirements.pmt");

/// General assistant prompt
pub const GENERAL: &str = include_str!("../../prompts/general.pmt");

/// Tool capability classification prompt
pub const TOOL_CLASSIFICATION: &str = include_str!("../../prompts/tool-classification.pmt");

/// Destination web search prompt
pub const WEB_SEARCH: &str = include_str!("../../prompts/web-search.pmt");

/// Place name extraction prompt
pub const EXTRACT_PLACES: &str = include_str!("../../prompts/extract-places.pmt");

/// Destination profile prompt
pub const INVESTIGATE_PLACE: &str = include_str!("../../prompts/investigate-place.pmt");

/// Stay search agent prompt
pub const SEARCH_STAYS: &str = include_str!("../../prompts/search-stays.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "infer-intent" => Some(INFER_INTENT),
        "gather-requirements" => Some(GATHER_REQUIREMENTS),
        "gather-info" => Some(GATHER_INFO),
        "extract-requirements" => Some(EXTRACT_REQUIREMENTS),
        "general" => Some(GENERAL),
        "tool-classification" => Some(TOOL_CLASSIFICATION),
        "web-search" => Some(WEB_SEARCH),
        "extract-places" => Some(EXTRACT_PLACES),
        "investigate-place" => Some(INVESTIGATE_PLACE),
        "search-stays" => Some(SEARCH_STAYS),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
