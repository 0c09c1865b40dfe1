//! Pagination component for the figure browse page.
//!
//! Renders previous, page numbers around the current page, and next links.
//! Page numbers in URLs are 1-based.

use maud::{html, Markup, Render};
use urlencoding::encode;

/// Pagination component for navigating through multi-page content.
///
/// Automatically hides if there's only 1 page.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Current page number (0-indexed internally, displayed as 1-indexed)
    pub current_page: usize,
    pub total_pages: usize,
    /// Base URL for page links (query params will be appended)
    pub base_url: String,
    /// Search query to preserve in links
    pub search: Option<String>,
    /// Occupation filters to preserve in links, one `category` param each
    pub categories: Vec<String>,
}

impl Pagination {
    /// Create a new pagination component.
    ///
    /// # Arguments
    /// * `current_page` - Current page number (0-indexed)
    /// * `total_pages` - Total number of pages
    /// * `base_url` - Base URL for page links
    #[must_use]
    pub fn new(current_page: usize, total_pages: usize, base_url: &str) -> Self {
        Self {
            current_page,
            total_pages,
            base_url: base_url.to_string(),
            search: None,
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search.filter(|s| !s.is_empty()).map(String::from);
        self
    }

    #[must_use]
    pub fn with_categories<S: AsRef<str>>(mut self, categories: &[S]) -> Self {
        self.categories = categories.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Build URL for a 0-indexed page with all filters preserved.
    fn build_url(&self, page_num: usize) -> String {
        let mut params = Vec::new();

        if let Some(ref search) = self.search {
            params.push(format!("search={}", encode(search)));
        }

        for category in &self.categories {
            params.push(format!("category={}", encode(category)));
        }

        if page_num > 0 {
            params.push(format!("page={}", page_num + 1));
        }

        if params.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}?{}", self.base_url, params.join("&"))
        }
    }

    /// Check if pagination should be displayed.
    #[must_use]
    pub fn should_display(&self) -> bool {
        self.total_pages > 1
    }
}

impl Render for Pagination {
    fn render(&self) -> Markup {
        if !self.should_display() {
            return html! {};
        }

        let current = self.current_page.min(self.total_pages - 1);
        let total = self.total_pages;

        let start = current.saturating_sub(2);
        let end = (current + 3).min(total);

        html! {
            nav class="pagination" aria-label="Pagination" {
                @if current > 0 {
                    a href=(self.build_url(current - 1)) rel="prev" { "\u{00ab} Previous" }
                } @else {
                    span class="disabled" { "\u{00ab} Previous" }
                }

                @if start > 0 {
                    a href=(self.build_url(0)) { "1" }
                    @if start > 1 {
                        span { "..." }
                    }
                }

                @for page_num in start..end {
                    @if page_num == current {
                        span class="current" aria-current="page" { (page_num + 1) }
                    } @else {
                        a href=(self.build_url(page_num)) { (page_num + 1) }
                    }
                }

                @if end < total {
                    @if end < total - 1 {
                        span { "..." }
                    }
                    a href=(self.build_url(total - 1)) { (total) }
                }

                @if current + 1 < total {
                    a href=(self.build_url(current + 1)) rel="next" { "Next \u{00bb}" }
                } @else {
                    span class="disabled" { "Next \u{00bb}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_page_param() {
        let pagination = Pagination::new(0, 10, "/");
        assert_eq!(pagination.build_url(0), "/");
        assert_eq!(pagination.build_url(1), "/?page=2");
    }

    #[test]
    fn test_build_url_preserves_filters() {
        let pagination = Pagination::new(0, 10, "/")
            .with_search(Some("new jeans"))
            .with_categories(&["Singer", "Actor"]);

        assert_eq!(
            pagination.build_url(2),
            "/?search=new%20jeans&category=Singer&category=Actor&page=3"
        );
    }

    #[test]
    fn test_empty_search_is_dropped() {
        let pagination = Pagination::new(0, 3, "/").with_search(Some(""));
        assert!(pagination.search.is_none());
    }

    #[test]
    fn test_render_single_page_empty() {
        let html = Pagination::new(0, 1, "/").render().into_string();
        assert!(html.is_empty());
    }

    #[test]
    fn test_render_first_page() {
        let html = Pagination::new(0, 10, "/").render().into_string();

        assert!(html.contains(r#"<span class="disabled">« Previous</span>"#));
        assert!(html.contains(r#"<span class="current" aria-current="page">1</span>"#));
        assert!(html.contains(r#"href="/?page=2" rel="next""#));
        assert!(html.contains(">10<"));
    }

    #[test]
    fn test_render_middle_page() {
        let html = Pagination::new(5, 10, "/").render().into_string();

        assert!(html.contains(">1<"));
        assert!(html.contains("..."));
        for label in [">4<", ">5<", ">6<", ">7<", ">8<", ">10<"] {
            assert!(html.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_render_last_page() {
        let html = Pagination::new(9, 10, "/").render().into_string();

        assert!(html.contains(r#"href="/?page=9" rel="prev""#));
        assert!(html.contains(r#"<span class="disabled">Next »</span>"#));
    }

    #[test]
    fn test_out_of_range_page_clamps() {
        let html = Pagination::new(40, 3, "/").render().into_string();
        assert!(html.contains(r#"<span class="current" aria-current="page">3</span>"#));
    }
}
