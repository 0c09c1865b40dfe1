use maud::{html, Markup};

use crate::components::BaseLayout;

#[must_use]
pub fn render_not_found_page(message: &str) -> Markup {
    let content = html! {
        section class="not-found" {
            h1 { "Not Found" }
            p { (message) }
            p { a href="/" { "Browse all public figures" } }
        }
    };
    BaseLayout::new("Not Found").render(content)
}
