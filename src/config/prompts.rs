//! Built-in page content
//!
//! These defaults reproduce the stock SmartTour India page. Any of them can be
//! replaced from a site file (see [`super::site`]).

/// System prompt placed at index 0 of every conversation
pub const SYSTEM_PROMPT: &str =
    "You are a helpful tourism guide for all regions of India. Reply in a friendly, informative tone.";

/// Cohere model used for every reply
pub const MODEL: &str = "command-nightly";

/// Sampling temperature sent with every request
pub const TEMPERATURE: f32 = 0.7;

pub const TITLE: &str = "🧭 SmartTour India (Cohere)";
pub const SUBTITLE: &str = "Your intelligent travel guide across India 🇮🇳";
pub const WELCOME: &str = "🙏 Welcome to SmartTour India!";
pub const INTRO: &str = "Ask about destinations, weather, food, culture, or travel tips across India.";

/// Quick suggestions as (button label, prompt)
pub const SUGGESTIONS: &[(&str, &str)] = &[
    ("🏝️ Beaches", "Suggest beach destinations in India"),
    ("🏔️ Hill Stations", "What are some beautiful hill stations in India?"),
    ("🏛️ Historical Places", "List some top historical places to visit in India"),
    ("📸 Instagram Spots", "Which places in India are best for Instagram-worthy photos?"),
    ("🎉 Cultural Festivals", "Tell me about famous cultural festivals in India"),
    ("🎁 Surprise Me!", "Tell me about an underrated tourist destination in India"),
];

/// Destination types offered by the filter selector
pub const FILTER_OPTIONS: &[&str] = &[
    "Beaches",
    "Hill Stations",
    "Heritage Sites",
    "Wildlife",
    "Spiritual",
    "Adventure",
];

pub const ITINERARY_PROMPT: &str = "Plan a 3-day itinerary for a trip to India";

/// Pending input produced by picking a destination type
pub fn filter_prompt(option: &str) -> String {
    format!("Show me the best {} in India", option.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_prompt_lowercases_type() {
        assert_eq!(filter_prompt("Beaches"), "Show me the best beaches in India");
        assert_eq!(
            filter_prompt("Hill Stations"),
            "Show me the best hill stations in India"
        );
    }

    #[test]
    fn test_builtin_counts() {
        assert_eq!(SUGGESTIONS.len(), 6);
        assert_eq!(FILTER_OPTIONS.len(), 6);
    }
}
