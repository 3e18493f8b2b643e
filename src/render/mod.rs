//! HTML rendering for the chat page
//!
//! Templates are compiled into the binary. Their names end in `.html`, so
//! minijinja escapes every interpolated value; model replies and user input
//! are never emitted as raw markup.

use minijinja::{context, Environment};

use crate::core::View;

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("page.html", include_str!("templates/page.html"))?;
        env.add_template("error.html", include_str!("templates/error.html"))?;
        Ok(Self { env })
    }

    /// Render the chat page. `width_reported` is false until the viewport
    /// script has reported a width for this session.
    pub fn page(&self, view: &View, width_reported: bool) -> Result<String, minijinja::Error> {
        self.env
            .get_template("page.html")?
            .render(context! { view, width_reported })
    }

    pub fn error(&self, message: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("error.html")?
            .render(context! { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::conversation::SidebarEntry;
    use crate::core::{SuggestionButton, SuggestionLayout, TranscriptPair};

    fn view() -> View {
        View {
            title: "🧭 SmartTour India (Cohere)".into(),
            subtitle: "sub".into(),
            welcome: "welcome".into(),
            intro: "intro".into(),
            layout: SuggestionLayout::Grid,
            suggestion_rows: vec![vec![SuggestionButton {
                index: 0,
                text: "🏝️ Beaches".into(),
            }]],
            filter_options: SiteConfig::default().filters.options,
            pending_input: "Show me the best beaches in India".into(),
            transcript: vec![
                TranscriptPair {
                    index: 0,
                    user: "Newest question".into(),
                    assistant: "Newest answer".into(),
                },
                TranscriptPair {
                    index: 1,
                    user: "Oldest question".into(),
                    assistant: "<b>bold</b> & more".into(),
                },
            ],
            sidebar: vec![SidebarEntry {
                glyph: "👤",
                summary: "Oldest question...".into(),
            }],
        }
    }

    #[test]
    fn test_page_contains_transcript_in_order() {
        let html = PageRenderer::new().unwrap().page(&view(), true).unwrap();
        let newest = html.find("Newest question").unwrap();
        let oldest = html.find("Oldest question</div>").unwrap();
        assert!(newest < oldest);
        assert!(html.contains("🤖 SmartTour: Newest answer"));
        assert!(html.contains("👤 Oldest question..."));
        assert!(html.contains(r#"value="Show me the best beaches in India""#));
        assert!(html.contains("Heritage Sites"));
        assert!(!html.contains("window.location.replace"));
    }

    #[test]
    fn test_page_escapes_model_output() {
        let html = PageRenderer::new().unwrap().page(&view(), true).unwrap();
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold&lt;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_width_script_redirects_until_width_reported() {
        let html = PageRenderer::new().unwrap().page(&view(), false).unwrap();
        assert!(html.contains("window.location.replace"));
    }

    #[test]
    fn test_error_page() {
        let html = PageRenderer::new().unwrap().error("Rate limited").unwrap();
        assert!(html.contains("Rate limited"));
        assert!(html.contains(r#"href="/""#));
    }
}
