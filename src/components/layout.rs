//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Critical theme initialization script that runs in <head> to prevent flash of wrong theme.
/// Must be inline (not external) to execute before body renders.
const THEME_INIT_SCRIPT: &str = r#"(function() {
    var theme = localStorage.getItem('theme');
    if (theme) {
        document.documentElement.setAttribute('data-theme', theme);
    } else if (window.matchMedia('(prefers-color-scheme: dark)').matches) {
        document.documentElement.setAttribute('data-theme', 'dark');
    }
})();"#;

/// Base page layout builder.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "IU" } };
/// let page = BaseLayout::new("IU").with_script("/static/js/lazy-sources.js").render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    search: Option<&'a str>,
    scripts: Vec<&'a str>,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            search: None,
            scripts: Vec::new(),
        }
    }

    /// Prefill the header search box.
    #[must_use]
    pub fn with_search(mut self, query: &'a str) -> Self {
        self.search = Some(query);
        self
    }

    /// Append a page-specific script.
    #[must_use]
    pub fn with_script(mut self, src: &'a str) -> Self {
        self.scripts.push(src);
        self
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content will be placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" data-theme="light" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - EHCO" }
                    link rel="stylesheet" href="/static/css/style.css";
                    // Inline critical script to prevent theme flicker
                    script { (PreEscaped(THEME_INIT_SCRIPT)) }
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                    script src="/static/js/theme.js" {}
                    @for src in &self.scripts {
                        script src=(src) {}
                    }
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/" {
                                strong class="site-logo" { "EHCO" }
                            }
                        }
                    }
                    ul {
                        li {
                            form method="get" action="/" role="search" class="header-search" {
                                input type="search" name="search"
                                    placeholder="Search public figures"
                                    value=[self.search];
                            }
                        }
                        li { a href="/" { "All Figures" } }
                        li {
                            button
                                id="theme-toggle"
                                class="theme-toggle"
                                title="Toggle dark mode"
                                aria-label="Toggle dark mode" { "🌓" }
                        }
                    }
                }
            }
        }
    }

    /// Render the page footer.
    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small {
                    "EHCO | Verified news, timelines and profiles of Korean public figures"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_layout_basic_structure() {
        let content = html! { h1 { "Test Content" } };
        let page = BaseLayout::new("Test Page").render(content);
        let html = page.into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en" data-theme="light">"#));
        assert!(html.contains("<title>Test Page - EHCO</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/static/css/style.css">"#));
        assert!(html.contains("<h1>Test Content</h1>"));
        assert!(html.contains(r#"<main class="container">"#));
        assert!(html.contains("localStorage.getItem('theme')"));
    }

    #[test]
    fn test_base_layout_search_prefill() {
        let html = BaseLayout::new("Search")
            .with_search("iu & friends")
            .render(html! {})
            .into_string();
        assert!(html.contains(r#"name="search""#));
        assert!(html.contains(r#"value="iu &amp; friends""#));

        let html = BaseLayout::new("Plain").render(html! {}).into_string();
        assert!(!html.contains("value="));
    }

    #[test]
    fn test_base_layout_page_scripts() {
        let html = BaseLayout::new("Scripts")
            .with_script("/static/js/lazy-sources.js")
            .render(html! {})
            .into_string();
        assert!(html.contains(r#"<script src="/static/js/theme.js">"#));
        assert!(html.contains(r#"<script src="/static/js/lazy-sources.js">"#));
    }
}
