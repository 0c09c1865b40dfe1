//! Maud HTML components for the web UI.
//!
//! - `layout`: Base page layout and navigation
//! - `alert`: Alert banners
//! - `card`: Figure cards, grids and source articles
//! - `pagination`: Page navigation controls
//! - `tabs`: Category tabs and year chips
//! - `timeline`: Curated events and legacy wiki sections

pub mod alert;
pub mod card;
pub mod layout;
pub mod pagination;
pub mod tabs;
pub mod timeline;

pub use alert::{Alert, AlertVariant};
pub use card::{figure_href, ArticleCard, EmptyState, FigureCard, FigureGrid};
pub use layout::BaseLayout;
pub use pagination::Pagination;
pub use tabs::{Tab, TabGroup, TabStyle};
pub use timeline::{EventCard, EventSources, LegacySectionView};

/// Re-export maud for convenience
pub use maud::{html, Markup, PreEscaped, DOCTYPE};
