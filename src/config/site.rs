//! Site configuration loaded from TOML files
//!
//! A site file customises what the page says and which model answers. Every
//! section is optional; anything left out falls back to the built-in
//! SmartTour India content in [`super::prompts`].
//!
//! ```toml
//! [llm]
//! model = "command-r"
//! temperature = 0.5
//!
//! [page]
//! title = "SmartTour Kerala"
//!
//! [[suggestions]]
//! label = "🌴 Backwaters"
//! prompt = "Plan a houseboat trip in Alleppey"
//!
//! [filters]
//! options = ["Beaches", "Wildlife"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::prompts;
use super::ConfigError;

/// Root site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Chat model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Page copy
    #[serde(default)]
    pub page: PageConfig,

    /// Quick suggestion buttons
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<Suggestion>,

    /// Destination type selector
    #[serde(default)]
    pub filters: FilterConfig,

    /// Custom itinerary button
    #[serde(default)]
    pub itinerary: ItineraryConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            page: PageConfig::default(),
            suggestions: default_suggestions(),
            filters: FilterConfig::default(),
            itinerary: ItineraryConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.system_prompt.trim().is_empty() {
            return Err(ConfigError::Validation("llm.system_prompt is empty".into()));
        }
        if !(0.0..=5.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature {} is out of range",
                self.llm.temperature
            )));
        }
        if let Some(s) = self.suggestions.iter().find(|s| s.prompt.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "suggestion '{}' has an empty prompt",
                s.label
            )));
        }
        Ok(())
    }
}

/// Chat model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Prompt placed at the head of every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_model() -> String {
    prompts::MODEL.to_string()
}

fn default_temperature() -> f32 {
    prompts::TEMPERATURE
}

fn default_system_prompt() -> String {
    prompts::SYSTEM_PROMPT.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Headline copy shown above the chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    #[serde(default = "default_welcome")]
    pub welcome: String,

    #[serde(default = "default_intro")]
    pub intro: String,
}

fn default_title() -> String {
    prompts::TITLE.to_string()
}

fn default_subtitle() -> String {
    prompts::SUBTITLE.to_string()
}

fn default_welcome() -> String {
    prompts::WELCOME.to_string()
}

fn default_intro() -> String {
    prompts::INTRO.to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            welcome: default_welcome(),
            intro: default_intro(),
        }
    }
}

/// A predefined question injected with one click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Button text in the grid layout
    pub label: String,

    /// Text placed in the input box
    pub prompt: String,
}

fn default_suggestions() -> Vec<Suggestion> {
    prompts::SUGGESTIONS
        .iter()
        .map(|(label, prompt)| Suggestion {
            label: label.to_string(),
            prompt: prompt.to_string(),
        })
        .collect()
}

/// Destination type filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_filter_options")]
    pub options: Vec<String>,
}

fn default_filter_options() -> Vec<String> {
    prompts::FILTER_OPTIONS.iter().map(|o| o.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            options: default_filter_options(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryConfig {
    #[serde(default = "default_itinerary_prompt")]
    pub prompt: String,
}

fn default_itinerary_prompt() -> String {
    prompts::ITINERARY_PROMPT.to_string()
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            prompt: default_itinerary_prompt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[llm]
model = "command-r"
temperature = 0.3

[page]
title = "SmartTour Kerala"

[[suggestions]]
label = "🌴 Backwaters"
prompt = "Plan a houseboat trip in Alleppey"

[filters]
options = ["Beaches", "Wildlife"]
"#;

    #[test]
    fn test_parse_config() {
        let config = SiteConfig::from_str(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.llm.model, "command-r");
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.llm.system_prompt, prompts::SYSTEM_PROMPT);
        assert_eq!(config.page.title, "SmartTour Kerala");
        assert_eq!(config.page.subtitle, prompts::SUBTITLE);
        assert_eq!(config.suggestions.len(), 1);
        assert_eq!(config.suggestions[0].prompt, "Plan a houseboat trip in Alleppey");
        assert_eq!(config.filters.options, vec!["Beaches", "Wildlife"]);
        assert_eq!(config.itinerary.prompt, prompts::ITINERARY_PROMPT);
    }

    #[test]
    fn test_empty_config_uses_builtin_page() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.llm.model, "command-nightly");
        assert_eq!(config.suggestions.len(), 6);
        assert_eq!(config.suggestions[0].prompt, "Suggest beach destinations in India");
        assert_eq!(config.filters.options.len(), 6);
    }

    #[test]
    fn test_default_matches_empty_file() {
        let parsed = SiteConfig::from_str("").unwrap();
        let default = SiteConfig::default();
        assert_eq!(parsed.llm.model, default.llm.model);
        assert_eq!(parsed.page.title, default.page.title);
        assert_eq!(parsed.suggestions, default.suggestions);
        assert_eq!(parsed.filters.options, default.filters.options);
    }

    #[test]
    fn test_rejects_blank_system_prompt() {
        let err = SiteConfig::from_str("[llm]\nsystem_prompt = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SiteConfig::from_str("[llm\nmodel = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
