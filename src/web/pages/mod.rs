//! Full page implementations using maud templates.
//!
//! Each page module exports a render function that produces the complete HTML.

pub mod figure;
pub mod home;
pub mod not_found;

pub use figure::{render_figure_page, FigurePageParams, TimelineSection};
pub use home::{render_home_page, HomePageParams};
pub use not_found::render_not_found_page;
