//! EHCO library.
//!
//! Verified news, timelines and profiles for Korean public figures: a
//! server-rendered site over a local document store, with the timeline
//! logic (versioned payloads, partial-date ordering, source collection,
//! category navigation and lazy article loading) in [`content`] and
//! [`articles`].

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod articles;
pub mod client;
pub mod components;
pub mod config;
pub mod content;
pub mod db;
pub mod web;
