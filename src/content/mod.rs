//! Timeline content: the versioned payload, its ordering rules and the
//! navigation state derived from it.

pub mod categories;
pub mod dates;
mod model;
pub mod navigator;
pub mod normalize;
pub mod sources;

pub use model::*;
